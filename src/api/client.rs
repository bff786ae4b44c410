use crate::error::AppError;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde_json::json;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::endpoints::*;
use super::models::*;

const MAX_RETRIES: u32 = 3;

pub struct StatsApiClient {
    stratz_token: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl StatsApiClient {
    pub fn new(stratz_token: String) -> Self {
        // Shared by every upstream host.
        let per_second = NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN);
        StatsApiClient {
            stratz_token,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    fn wait_for_slot(&self) {
        while self.rate_limiter.check().is_err() {
            thread::sleep(Duration::from_millis(50));
        }
    }

    fn execute_request<F>(&self, url: &str, send: F) -> Result<String, AppError>
    where
        F: Fn() -> Result<ureq::Response, ureq::Error>,
    {
        let mut retry_count = 0;

        loop {
            self.wait_for_slot();
            debug!(url, attempt = retry_count + 1, "sending request");

            match send() {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited);
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(url, wait_ms, "rate limited, backing off before retry");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(AppError::ApiError(format!("{} returned HTTP {}", url, code)));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }

    pub fn get_stratz_matchups(&self, hero_id: u16) -> Result<StratzMatchupResponse, AppError> {
        let request = json!({
            "operationName": "GetHeroMatchUps",
            "query": HERO_MATCHUPS_QUERY,
            "variables": { "heroId": hero_id, "matchLimit": 0 },
        });
        let auth = format!("Bearer {}", self.stratz_token);

        let body = self.execute_request(STRATZ_GRAPHQL_ENDPOINT, || {
            ureq::post(STRATZ_GRAPHQL_ENDPOINT)
                .set("Content-Type", "application/json")
                .set("Authorization", &auth)
                .set("User-Agent", STRATZ_USER_AGENT)
                .send_json(&request)
        })?;

        let response: StratzMatchupResponse = serde_json::from_str(&body)?;
        if let Some(err) = response.errors.first() {
            return Err(AppError::ApiError(format!("Stratz: {}", err.message)));
        }
        Ok(response)
    }

    pub fn get_dotabuff_counters_page(&self, slug: &str) -> Result<String, AppError> {
        let url = dotabuff_counters_url(slug);
        self.execute_request(&url, || {
            ureq::get(&url)
                .set("User-Agent", BROWSER_USER_AGENT)
                .call()
        })
    }

    pub fn get_dotabuff_match_page(&self, player_id: u64, page: u32) -> Result<String, AppError> {
        let url = dotabuff_match_page_url(player_id, page);
        self.execute_request(&url, || {
            ureq::get(&url)
                .set("User-Agent", BROWSER_USER_AGENT)
                .call()
        })
        .map_err(|e| match e {
            AppError::ApiError(msg) if msg.ends_with("HTTP 404") => {
                AppError::PlayerNotFound(player_id.to_string())
            }
            other => other,
        })
    }
}
