pub mod aggregator;
pub mod matchup;
pub mod player_counters;
pub mod player_stats;
