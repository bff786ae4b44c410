use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Stratz free-tier quotas.
const MAX_REQUESTS_PER_DAY: u32 = 10_000;
const MAX_REQUESTS_PER_HOUR: u32 = 2_000;

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLog {
    pub api: String,
    pub requests_today: u32,
    pub requests_this_hour: u32,
    pub last_request: DateTime<Utc>,
    pub day_reset: DateTime<Utc>,
    pub hour_reset: DateTime<Utc>,
    #[serde(skip)]
    path: PathBuf,
}

impl RequestLog {
    pub fn new(api: &str, path: PathBuf) -> Self {
        let now = Utc::now();
        RequestLog {
            api: api.to_string(),
            requests_today: 0,
            requests_this_hour: 0,
            last_request: now,
            day_reset: now + Duration::days(1),
            hour_reset: now + Duration::hours(1),
            path,
        }
    }

    pub fn default_path(api: &str) -> PathBuf {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".draftdiff");

        let _ = fs::create_dir_all(&dir);

        dir.join(format!("{}.ratelimit.json", api))
    }

    pub fn load(api: &str) -> Result<Self, AppError> {
        Self::load_from(api, &Self::default_path(api))
    }

    pub fn load_from(api: &str, path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let mut log: RequestLog = serde_json::from_str(&content).map_err(|e| {
                    AppError::JsonError(format!("Failed to parse rate limit log: {}", e))
                })?;
                log.path = path.to_path_buf();

                let now = Utc::now();
                if now > log.day_reset {
                    log.requests_today = 0;
                    log.day_reset = now + Duration::days(1);
                }
                if now > log.hour_reset {
                    log.requests_this_hour = 0;
                    log.hour_reset = now + Duration::hours(1);
                }

                Ok(log)
            }
            Err(_) => Ok(RequestLog::new(api, path.to_path_buf())),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize rate limit log: {}", e))
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn can_make_request(&self) -> bool {
        self.requests_today < MAX_REQUESTS_PER_DAY
            && self.requests_this_hour < MAX_REQUESTS_PER_HOUR
    }

    pub fn record_request(&mut self) {
        self.requests_today += 1;
        self.requests_this_hour += 1;
        self.last_request = Utc::now();
    }

    pub fn get_remaining(&self) -> u32 {
        MAX_REQUESTS_PER_DAY
            .saturating_sub(self.requests_today)
            .min(MAX_REQUESTS_PER_HOUR.saturating_sub(self.requests_this_hour))
    }

    pub fn get_reset_time(&self) -> DateTime<Utc> {
        self.day_reset.min(self.hour_reset)
    }

    pub fn display_status(&self) {
        let remaining = self.get_remaining();
        let time_until_reset = self.get_reset_time().signed_duration_since(Utc::now());

        println!("\n📊 API Usage ({})", self.api);
        println!("   Daily:  {}/{} requests", self.requests_today, MAX_REQUESTS_PER_DAY);
        println!("   Hourly: {}/{} requests", self.requests_this_hour, MAX_REQUESTS_PER_HOUR);
        println!("   Remaining: {} requests", remaining);
        println!(
            "   Reset in: {}h {}m\n",
            time_until_reset.num_hours(),
            time_until_reset.num_minutes() % 60
        );
    }
}
