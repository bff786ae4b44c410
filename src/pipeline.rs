// Cached end-to-end runs: fetch source tables, blend them, persist the result.

use crate::analysis::aggregator::{aggregate, aggregate_global, PlayerSampleDivisor};
use crate::analysis::matchup::{AggregatedMatchup, MatchupRecord};
use crate::analysis::player_counters::{build_player_counters, CounterTables};
use crate::analysis::player_stats::PlayerHeroStats;
use crate::cache::{partitions, Store};
use crate::error::Result;
use crate::heroes;
use crate::sources::{MatchupSource, PlayerHistory};
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use tracing::info;

pub struct PlayerReport {
    pub account_id: u64,
    pub hero_stats: Vec<PlayerHeroStats>,
    pub counters: Vec<AggregatedMatchup>,
}

/// Blends every source's counters for every hero in the catalogue.
pub fn run_counters(
    store: &Store,
    sources: &[&dyn MatchupSource],
    ds: &str,
    progress: &ProgressBar,
) -> Result<Vec<AggregatedMatchup>> {
    store.cached_derived(&partitions::counters_output(ds), || {
        let mut per_hero: BTreeMap<String, Vec<MatchupRecord>> = BTreeMap::new();
        progress.set_length(heroes::all_heroes().count() as u64);

        for hero in heroes::all_heroes() {
            progress.set_message(hero.to_string());
            let table = per_hero.entry(hero.to_string()).or_default();
            for source in sources {
                table.extend(source.counters(hero, ds)?);
            }
            progress.inc(1);
        }
        progress.finish_with_message("counter tables ready");

        let rows = aggregate_global(&per_hero)?;
        info!(heroes = per_hero.len(), rows = rows.len(), "blended counter tables");
        Ok(rows)
    })
}

/// Blends counters for the heroes `account_id` played in the last `days`.
/// Cached per divisor policy.
pub fn run_player(
    store: &Store,
    sources: &[&dyn MatchupSource],
    history: &dyn PlayerHistory,
    account_id: u64,
    days: u32,
    ds: &str,
    divisor: PlayerSampleDivisor,
    progress: &ProgressBar,
) -> Result<PlayerReport> {
    let hero_stats = history.hero_stats(account_id, days, ds)?;

    let counters = store.cached_derived(
        &partitions::player_weighted(ds, account_id, days, divisor),
        || {
            progress.set_length(hero_stats.len() as u64);

            let mut tables: Vec<CounterTables> = vec![CounterTables::new(); sources.len()];
            for stats in &hero_stats {
                progress.set_message(stats.hero.clone());
                for (source, source_tables) in sources.iter().zip(tables.iter_mut()) {
                    if !source_tables.contains_key(&stats.hero) {
                        source_tables.insert(stats.hero.clone(), source.counters(&stats.hero, ds)?);
                    }
                }
                progress.inc(1);
            }
            progress.finish_with_message("player counter tables ready");

            let tagged: Vec<(&str, &CounterTables)> = sources
                .iter()
                .map(|s| s.tag())
                .zip(tables.iter())
                .collect();
            let combined = build_player_counters(&hero_stats, &tagged)?;
            store.write_json(&partitions::player_counters(ds, account_id, days), &combined)?;

            let rows = aggregate(&combined, divisor)?;
            info!(account_id, heroes = hero_stats.len(), rows = rows.len(), "blended player counters");
            Ok(rows)
        },
    )?;

    Ok(PlayerReport {
        account_id,
        hero_stats,
        counters,
    })
}
