use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// One source's view of how `counter_hero` fares against `hero`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub hero: String,
    pub counter_hero: String,
    /// The target hero's own sample, repeated on every source row.
    #[serde(default)]
    pub num_matches: Option<u64>,
    #[serde(default)]
    pub num_wins: Option<u64>,
    pub target_disadvantage: f64,
    pub target_winrate_vs_counter: f64,
    pub counter_vs_target_matches_played: u64,
    pub source: String,
}

impl MatchupRecord {
    pub fn new(
        hero: impl Into<String>,
        counter_hero: impl Into<String>,
        target_disadvantage: f64,
        target_winrate_vs_counter: f64,
        counter_vs_target_matches_played: u64,
        source: impl Into<String>,
    ) -> Self {
        MatchupRecord {
            hero: hero.into(),
            counter_hero: counter_hero.into(),
            num_matches: None,
            num_wins: None,
            target_disadvantage,
            target_winrate_vs_counter,
            counter_vs_target_matches_played,
            source: source.into(),
        }
    }

    pub fn with_player_sample(mut self, num_matches: u64, num_wins: u64) -> Self {
        self.num_matches = Some(num_matches);
        self.num_wins = Some(num_wins);
        self
    }

    /// Blank identifiers and non-finite statistics count as missing.
    pub fn validate(&self, row: usize) -> Result<()> {
        let missing = |field| Err(AppError::MissingField { row, field });

        if self.hero.trim().is_empty() {
            return missing("hero");
        }
        if self.counter_hero.trim().is_empty() {
            return missing("counter_hero");
        }
        if !self.target_disadvantage.is_finite() {
            return missing("target_disadvantage");
        }
        if !self.target_winrate_vs_counter.is_finite() {
            return missing("target_winrate_vs_counter");
        }
        if self.source.trim().is_empty() {
            return missing("source");
        }
        Ok(())
    }
}

/// A matchup row as read back from a flat file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatchupRow {
    pub hero: Option<String>,
    pub counter_hero: Option<String>,
    pub num_matches: Option<u64>,
    pub num_wins: Option<u64>,
    pub target_disadvantage: Option<f64>,
    pub target_winrate_vs_counter: Option<f64>,
    pub counter_vs_target_matches_played: Option<u64>,
    pub source: Option<String>,
}

impl RawMatchupRow {
    pub fn into_record(self, row: usize) -> Result<MatchupRecord> {
        fn required<T>(value: Option<T>, row: usize, field: &'static str) -> Result<T> {
            value.ok_or(AppError::MissingField { row, field })
        }

        let record = MatchupRecord {
            hero: required(self.hero, row, "hero")?,
            counter_hero: required(self.counter_hero, row, "counter_hero")?,
            num_matches: self.num_matches,
            num_wins: self.num_wins,
            target_disadvantage: required(self.target_disadvantage, row, "target_disadvantage")?,
            target_winrate_vs_counter: required(
                self.target_winrate_vs_counter,
                row,
                "target_winrate_vs_counter",
            )?,
            counter_vs_target_matches_played: required(
                self.counter_vs_target_matches_played,
                row,
                "counter_vs_target_matches_played",
            )?,
            source: required(self.source, row, "source")?,
        };
        record.validate(row)?;
        Ok(record)
    }
}

/// Blended estimate for one (hero, counter_hero) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMatchup {
    pub hero: String,
    pub counter_hero: String,
    pub player_num_matches: Option<u64>,
    pub player_win_rate: Option<f64>,
    pub weighted_disadvantage: f64,
    pub weighted_win_percent: f64,
    pub num_sources: usize,
    pub total_head_to_head_matches: Option<u64>,
}
