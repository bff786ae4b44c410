use super::matchup::MatchupRecord;
use super::player_stats::PlayerHeroStats;
use crate::error::{AppError, Result};
use std::collections::BTreeMap;

/// Counter rows for each target hero, as produced by one source.
pub type CounterTables = BTreeMap<String, Vec<MatchupRecord>>;

/// Joins a player's hero sample onto every source's counter rows for the
/// heroes that player actually played. A hero played in several roles or
/// lanes contributes one copy of each table per stats row.
pub fn build_player_counters(
    player_stats: &[PlayerHeroStats],
    sources: &[(&str, &CounterTables)],
) -> Result<Vec<MatchupRecord>> {
    let mut combined = Vec::new();

    for stats in player_stats {
        for (tag, tables) in sources {
            let table = tables.get(&stats.hero).ok_or_else(|| {
                AppError::UnknownHero(format!("{} (no {} counters)", stats.hero, tag))
            })?;

            combined.extend(table.iter().map(|row| MatchupRecord {
                hero: stats.hero.clone(),
                ..row.clone()
            }
            .with_player_sample(stats.num_matches, stats.num_wins)));
        }
    }

    Ok(combined)
}
