use crate::analysis::matchup::MatchupRecord;
use crate::analysis::player_stats::PlayerHeroStats;
use crate::error::Result;

pub mod dotabuff;
pub mod dotabuff_matches;
pub mod stratz;

/// An upstream provider of per-hero counter statistics.
pub trait MatchupSource {
    /// Value written to `MatchupRecord::source`.
    fn tag(&self) -> &'static str;

    /// Counter rows for `hero` as of the date partition `ds`.
    fn counters(&self, hero: &str, ds: &str) -> Result<Vec<MatchupRecord>>;
}

/// A player's recent matches, folded per hero, role and lane.
pub trait PlayerHistory {
    fn hero_stats(&self, player_id: u64, days: u32, ds: &str) -> Result<Vec<PlayerHeroStats>>;
}
