use crate::error::{AppError, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Today's partition date (UTC), `YYYY-MM-DD`.
pub fn current_ds() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Partition layout under the data directory.
pub mod partitions {
    use std::fmt::Display;

    pub fn stratz_raw(ds: &str, hero_slug: &str) -> String {
        format!("stratz/matchups/ds={}/hero={}", ds, hero_slug)
    }

    pub fn dotabuff_raw(ds: &str, hero_slug: &str) -> String {
        format!("dotabuff/matchups/ds={}/hero={}", ds, hero_slug)
    }

    pub fn source_table(source: &str, ds: &str, hero_slug: &str) -> String {
        format!("{}/matchups-table/ds={}/hero={}", source, ds, hero_slug)
    }

    pub fn player_match_page(ds: &str, player_id: u64, days: u32, page: u32) -> String {
        format!("dotabuff/ds={}/player_id={}/days={}/page-{}", ds, player_id, days, page)
    }

    pub fn player_stats(ds: &str, player_id: u64, days: u32) -> String {
        format!("dotabuff/player_stats-table/ds={}/player_id={}/days={}", ds, player_id, days)
    }

    pub fn player_counters(ds: &str, player_id: u64, days: u32) -> String {
        format!("output/player_counters/ds={}/player_id={}/days={}", ds, player_id, days)
    }

    /// One partition per divisor policy.
    pub fn player_weighted(ds: &str, player_id: u64, days: u32, divisor: impl Display) -> String {
        format!(
            "output/player_counters_weighted/ds={}/player_id={}/days={}/divisor={}",
            ds, player_id, days, divisor
        )
    }

    pub fn counters_output(ds: &str) -> String {
        format!("output/counter/ds={}", ds)
    }
}

/// Local partitioned store. Each partition holds one `data.<ext>` payload.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    pub fn payload_path(&self, partition: &str, ext: &str) -> PathBuf {
        self.root.join(partition).join(format!("data.{}", ext))
    }

    pub fn exists(&self, partition: &str, ext: &str) -> bool {
        self.payload_path(partition, ext).is_file()
    }

    pub fn read_text(&self, partition: &str, ext: &str) -> Result<String> {
        Ok(fs::read_to_string(self.payload_path(partition, ext))?)
    }

    pub fn write_text(&self, partition: &str, ext: &str, text: &str) -> Result<()> {
        let path = self.payload_path(partition, ext);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        Ok(())
    }

    pub fn read_json<T: DeserializeOwned>(&self, partition: &str) -> Result<T> {
        let content = self.read_text(partition, "json")?;
        serde_json::from_str(&content).map_err(|e| {
            AppError::JsonError(format!("Failed to parse cached {}: {}", partition, e))
        })
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, partition: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.write_text(partition, "json", &json)
    }

    /// Stored JSON for `partition`, fetching it live when absent. Live
    /// fetches are only allowed for today's `ds`.
    pub fn cached_json<T, F>(&self, partition: &str, ds: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if self.exists(partition, "json") {
            info!(partition, "loaded cached data");
            return self.read_json(partition);
        }
        ensure_live(ds)?;
        let value = fetch()?;
        self.write_json(partition, &value)?;
        Ok(value)
    }

    pub fn cached_text<F>(&self, partition: &str, ext: &str, ds: &str, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        if self.exists(partition, ext) {
            info!(partition, "loaded cached data");
            return self.read_text(partition, ext);
        }
        ensure_live(ds)?;
        let text = fetch()?;
        self.write_text(partition, ext, &text)?;
        Ok(text)
    }

    /// Stored JSON for `partition`, built from other stored data when absent.
    pub fn cached_derived<T, F>(&self, partition: &str, build: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if self.exists(partition, "json") {
            info!(partition, "loaded cached table");
            return self.read_json(partition);
        }
        info!(partition, "building table");
        let value = build()?;
        self.write_json(partition, &value)?;
        Ok(value)
    }
}

fn ensure_live(ds: &str) -> Result<()> {
    if ds != current_ds() {
        return Err(AppError::StaleScrape { ds: ds.to_string() });
    }
    Ok(())
}
