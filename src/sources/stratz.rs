use super::MatchupSource;
use crate::analysis::matchup::MatchupRecord;
use crate::api::client::StatsApiClient;
use crate::api::models::StratzMatchupResponse;
use crate::cache::{partitions, Store};
use crate::error::{AppError, Result};
use crate::heroes;
use crate::rate_limit::RequestLog;
use std::cell::{Ref, RefCell};
use tracing::warn;

pub const SOURCE_TAG: &str = "stratz";

pub struct StratzSource<'a> {
    client: &'a StatsApiClient,
    store: &'a Store,
    request_log: RefCell<RequestLog>,
}

impl<'a> StratzSource<'a> {
    pub fn new(client: &'a StatsApiClient, store: &'a Store, request_log: RequestLog) -> Self {
        StratzSource {
            client,
            store,
            request_log: RefCell::new(request_log),
        }
    }

    pub fn request_log(&self) -> Ref<'_, RequestLog> {
        self.request_log.borrow()
    }

    fn fetch(&self, hero: &str, ds: &str) -> Result<StratzMatchupResponse> {
        let hero_id = heroes::hero_id(hero).ok_or_else(|| AppError::UnknownHero(hero.to_string()))?;
        let partition = partitions::stratz_raw(ds, &heroes::slug(hero));

        self.store.cached_json(&partition, ds, || {
            let mut log = self.request_log.borrow_mut();
            if !log.can_make_request() {
                return Err(AppError::RateLimited);
            }
            warn!(hero, "running expensive Stratz matchup query");
            let response = self.client.get_stratz_matchups(hero_id)?;
            log.record_request();
            log.save()?;
            Ok(response)
        })
    }
}

impl MatchupSource for StratzSource<'_> {
    fn tag(&self) -> &'static str {
        SOURCE_TAG
    }

    fn counters(&self, hero: &str, ds: &str) -> Result<Vec<MatchupRecord>> {
        let partition = partitions::source_table(SOURCE_TAG, ds, &heroes::slug(hero));
        self.store.cached_derived(&partition, || {
            let response = self.fetch(hero, ds)?;
            counter_records(hero, &response)
        })
    }
}

/// Stratz reports synergy from the target's side, so disadvantage is its negation.
pub fn counter_records(hero: &str, response: &StratzMatchupResponse) -> Result<Vec<MatchupRecord>> {
    let advantage = response
        .data
        .as_ref()
        .and_then(|d| d.hero_stats.hero_vs_hero_matchup.advantage.first())
        .ok_or_else(|| {
            AppError::ParseError(format!("Stratz response for {} has no advantage block", hero))
        })?;

    let mut records = Vec::with_capacity(advantage.vs.len());
    for entry in &advantage.vs {
        let Some(counter_hero) = heroes::hero_name(entry.hero_id2) else {
            warn!(hero, hero_id = entry.hero_id2, "skipping Stratz row for unknown hero id");
            continue;
        };
        if entry.match_count == 0 {
            warn!(hero, counter_hero, "skipping Stratz row with no matches");
            continue;
        }

        let win_percent = entry.win_count as f64 / entry.match_count as f64 * 100.0;
        records.push(MatchupRecord::new(
            hero,
            counter_hero,
            -entry.synergy,
            win_percent,
            entry.match_count,
            SOURCE_TAG,
        ));
    }

    Ok(records)
}
