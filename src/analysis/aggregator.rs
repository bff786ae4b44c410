use super::matchup::{AggregatedMatchup, MatchupRecord};
use crate::error::{AppError, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// How the repeated per-source player sample is de-duplicated.
///
/// Every source row of a group carries the same `num_matches`/`num_wins`
/// for the target hero, so the group sum has to be divided back down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerSampleDivisor {
    /// Divide by the number of distinct sources in the group.
    #[default]
    SourceCount,
    /// Always divide by two; groups without exactly two sources are rejected.
    FixedPair,
}

impl fmt::Display for PlayerSampleDivisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSampleDivisor::SourceCount => f.write_str("sources"),
            PlayerSampleDivisor::FixedPair => f.write_str("pair"),
        }
    }
}

impl FromStr for PlayerSampleDivisor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sources" | "source-count" => Ok(PlayerSampleDivisor::SourceCount),
            "pair" | "fixed-pair" => Ok(PlayerSampleDivisor::FixedPair),
            other => Err(AppError::ConfigError(format!(
                "unknown player sample divisor `{}` (expected `sources` or `pair`)",
                other
            ))),
        }
    }
}

struct Blend {
    weighted_disadvantage: f64,
    weighted_win_percent: f64,
    num_sources: usize,
    total_weight: u64,
}

/// Blend every (hero, counter_hero) pair across sources, weighting each
/// source row by its head-to-head match count.
///
/// Output is sorted by hero, then counter hero.
pub fn aggregate(
    records: &[MatchupRecord],
    divisor: PlayerSampleDivisor,
) -> Result<Vec<AggregatedMatchup>> {
    validate_all(records, 0)?;

    let mut groups: BTreeMap<(&str, &str), Vec<&MatchupRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.hero.as_str(), record.counter_hero.as_str()))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((hero, counter_hero), group)| {
            let blend = blend(hero, counter_hero, &group)?;
            let (player_num_matches, player_win_rate) =
                player_sample(hero, counter_hero, &group, blend.num_sources, divisor)?;

            Ok(AggregatedMatchup {
                hero: hero.to_string(),
                counter_hero: counter_hero.to_string(),
                player_num_matches,
                player_win_rate,
                weighted_disadvantage: blend.weighted_disadvantage,
                weighted_win_percent: blend.weighted_win_percent,
                num_sources: blend.num_sources,
                total_head_to_head_matches: None,
            })
        })
        .collect()
}

/// Blend per-hero tables where the map key is the target hero. Groups are
/// keyed by counter hero only and carry the head-to-head total.
pub fn aggregate_global(
    per_hero_tables: &BTreeMap<String, Vec<MatchupRecord>>,
) -> Result<Vec<AggregatedMatchup>> {
    let mut output = Vec::new();
    let mut row_offset = 0;

    for (hero, table) in per_hero_tables {
        validate_all(table, row_offset)?;
        row_offset += table.len();

        let mut groups: BTreeMap<&str, Vec<&MatchupRecord>> = BTreeMap::new();
        for record in table {
            groups
                .entry(record.counter_hero.as_str())
                .or_default()
                .push(record);
        }

        for (counter_hero, group) in groups {
            let blend = blend(hero, counter_hero, &group)?;
            output.push(AggregatedMatchup {
                hero: hero.clone(),
                counter_hero: counter_hero.to_string(),
                player_num_matches: None,
                player_win_rate: None,
                weighted_disadvantage: blend.weighted_disadvantage,
                weighted_win_percent: blend.weighted_win_percent,
                num_sources: blend.num_sources,
                total_head_to_head_matches: Some(blend.total_weight),
            });
        }
    }

    Ok(output)
}

fn validate_all(records: &[MatchupRecord], row_offset: usize) -> Result<()> {
    records
        .iter()
        .enumerate()
        .try_for_each(|(idx, record)| record.validate(row_offset + idx))
}

fn blend(hero: &str, counter_hero: &str, group: &[&MatchupRecord]) -> Result<Blend> {
    // Fixed summation order so the result does not depend on input row order.
    let mut members = group.to_vec();
    members.sort_by(|a, b| canonical_order(a, b));

    let total_weight: u64 = members
        .iter()
        .map(|r| r.counter_vs_target_matches_played)
        .sum();
    if total_weight == 0 {
        return Err(AppError::ZeroWeight {
            hero: hero.to_string(),
            counter_hero: counter_hero.to_string(),
        });
    }

    let weight = total_weight as f64;
    let weighted_disadvantage = members
        .iter()
        .map(|r| r.target_disadvantage * r.counter_vs_target_matches_played as f64)
        .sum::<f64>()
        / weight;
    let weighted_win_percent = members
        .iter()
        .map(|r| r.target_winrate_vs_counter * r.counter_vs_target_matches_played as f64)
        .sum::<f64>()
        / weight;

    let num_sources = members
        .iter()
        .map(|r| r.source.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    Ok(Blend {
        weighted_disadvantage,
        weighted_win_percent,
        num_sources,
        total_weight,
    })
}

fn canonical_order(a: &MatchupRecord, b: &MatchupRecord) -> Ordering {
    a.source
        .cmp(&b.source)
        .then(a.counter_vs_target_matches_played.cmp(&b.counter_vs_target_matches_played))
        .then(a.target_disadvantage.total_cmp(&b.target_disadvantage))
        .then(a.target_winrate_vs_counter.total_cmp(&b.target_winrate_vs_counter))
}

fn player_sample(
    hero: &str,
    counter_hero: &str,
    group: &[&MatchupRecord],
    num_sources: usize,
    divisor: PlayerSampleDivisor,
) -> Result<(Option<u64>, Option<f64>)> {
    let matches: Option<u64> = group.iter().map(|r| r.num_matches).sum();
    let wins: Option<u64> = group.iter().map(|r| r.num_wins).sum();
    let (Some(matches), Some(wins)) = (matches, wins) else {
        return Ok((None, None));
    };

    let divisor = match divisor {
        PlayerSampleDivisor::SourceCount => num_sources as f64,
        PlayerSampleDivisor::FixedPair => {
            if num_sources != 2 {
                return Err(AppError::ImbalancedSourceCount {
                    hero: hero.to_string(),
                    counter_hero: counter_hero.to_string(),
                    num_sources,
                });
            }
            2.0
        }
    };

    let player_num_matches = (matches as f64 / divisor).floor() as u64;
    if player_num_matches == 0 {
        return Err(AppError::EmptyPlayerSample {
            hero: hero.to_string(),
            counter_hero: counter_hero.to_string(),
        });
    }
    let player_win_rate = (wins as f64 / divisor) / player_num_matches as f64;

    Ok((Some(player_num_matches), Some(player_win_rate)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn record(counter: &str, dis: f64, wr: f64, matches: u64, source: &str) -> MatchupRecord {
        MatchupRecord::new("bloodseeker", counter, dis, wr, matches, source)
    }

    fn worked_example() -> Vec<MatchupRecord> {
        vec![
            record("medusa", 5.0105, 44.6005, 22771, "dotabuff").with_player_sample(1, 1),
            record("medusa", 5.964, 44.4417651314203, 4147, "stratz").with_player_sample(1, 1),
            record("abaddon", 1.1627, 45.4581, 27434, "dotabuff").with_player_sample(1, 1),
            record("abaddon", 1.658, 45.3179867342957, 5126, "stratz").with_player_sample(1, 1),
        ]
    }

    #[test]
    fn test_worked_example() {
        let rows = aggregate(&worked_example(), PlayerSampleDivisor::FixedPair).unwrap();
        assert_eq!(rows.len(), 2);

        let abaddon = &rows[0];
        assert_eq!(abaddon.counter_hero, "abaddon");
        assert!((abaddon.weighted_disadvantage - 1.240676).abs() < EPS);
        assert!((abaddon.weighted_win_percent - 45.436042).abs() < EPS);

        let medusa = &rows[1];
        assert_eq!(medusa.counter_hero, "medusa");
        assert!((medusa.weighted_disadvantage - 5.157397).abs() < EPS);
        assert!((medusa.weighted_win_percent - 44.576045).abs() < EPS);

        for row in &rows {
            assert_eq!(row.hero, "bloodseeker");
            assert_eq!(row.player_num_matches, Some(1));
            assert_eq!(row.player_win_rate, Some(1.0));
            assert_eq!(row.num_sources, 2);
            assert_eq!(row.total_head_to_head_matches, None);
        }
    }

    #[test]
    fn test_source_count_divisor_matches_pair_for_two_sources() {
        let pair = aggregate(&worked_example(), PlayerSampleDivisor::FixedPair).unwrap();
        let sources = aggregate(&worked_example(), PlayerSampleDivisor::SourceCount).unwrap();
        assert_eq!(pair, sources);
    }

    #[test]
    fn test_input_order_does_not_change_output() {
        let forward = aggregate(&worked_example(), PlayerSampleDivisor::default()).unwrap();
        let mut reversed_input = worked_example();
        reversed_input.reverse();
        let reversed = aggregate(&reversed_input, PlayerSampleDivisor::default()).unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_same_source_counted_once() {
        let rows = aggregate(
            &[
                record("medusa", 5.0, 44.0, 10, "dotabuff"),
                record("medusa", 6.0, 45.0, 30, "dotabuff"),
            ],
            PlayerSampleDivisor::default(),
        )
        .unwrap();
        assert_eq!(rows[0].num_sources, 1);
        assert!((rows[0].weighted_disadvantage - 5.75).abs() < EPS);
    }

    #[test]
    fn test_single_source_is_identity() {
        let rows = aggregate(
            &[record("medusa", 5.964, 44.4417651314203, 4147, "stratz")],
            PlayerSampleDivisor::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].num_sources, 1);
        assert!((rows[0].weighted_disadvantage - 5.964).abs() < 1e-12);
        assert!((rows[0].weighted_win_percent - 44.4417651314203).abs() < 1e-12);
        assert_eq!(rows[0].player_num_matches, None);
    }

    #[test]
    fn test_zero_weight_group_is_an_error() {
        let result = aggregate(
            &[
                record("medusa", 5.0, 44.0, 0, "dotabuff"),
                record("medusa", 6.0, 45.0, 0, "stratz"),
            ],
            PlayerSampleDivisor::default(),
        );
        match result {
            Err(AppError::ZeroWeight { hero, counter_hero }) => {
                assert_eq!(hero, "bloodseeker");
                assert_eq!(counter_hero, "medusa");
            }
            other => panic!("expected ZeroWeight, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_weight_row_still_blends_with_others() {
        let rows = aggregate(
            &[
                record("medusa", 5.0, 44.0, 0, "dotabuff"),
                record("medusa", 6.0, 45.0, 20, "stratz"),
            ],
            PlayerSampleDivisor::default(),
        )
        .unwrap();
        assert!((rows[0].weighted_disadvantage - 6.0).abs() < EPS);
        assert_eq!(rows[0].num_sources, 2);
    }

    #[test]
    fn test_invalid_row_fails_whole_call() {
        let mut records = worked_example();
        records[2].target_disadvantage = f64::NAN;
        assert!(matches!(
            aggregate(&records, PlayerSampleDivisor::default()),
            Err(AppError::MissingField { row: 2, field: "target_disadvantage" })
        ));
    }

    #[test]
    fn test_fixed_pair_rejects_single_source_player_rows() {
        let records = vec![record("medusa", 5.0, 44.0, 10, "dotabuff").with_player_sample(4, 2)];
        assert!(matches!(
            aggregate(&records, PlayerSampleDivisor::FixedPair),
            Err(AppError::ImbalancedSourceCount { num_sources: 1, .. })
        ));

        let rows = aggregate(&records, PlayerSampleDivisor::SourceCount).unwrap();
        assert_eq!(rows[0].player_num_matches, Some(4));
        assert_eq!(rows[0].player_win_rate, Some(0.5));
    }

    #[test]
    fn test_player_fields_need_every_row() {
        let records = vec![
            record("medusa", 5.0, 44.0, 10, "dotabuff").with_player_sample(3, 1),
            record("medusa", 6.0, 45.0, 10, "stratz"),
        ];
        let rows = aggregate(&records, PlayerSampleDivisor::FixedPair).unwrap();
        assert_eq!(rows[0].player_num_matches, None);
        assert_eq!(rows[0].player_win_rate, None);
    }

    #[test]
    fn test_empty_player_sample_is_an_error() {
        let records = vec![
            record("medusa", 5.0, 44.0, 10, "dotabuff").with_player_sample(0, 0),
            record("medusa", 6.0, 45.0, 10, "stratz").with_player_sample(0, 0),
        ];
        assert!(matches!(
            aggregate(&records, PlayerSampleDivisor::default()),
            Err(AppError::EmptyPlayerSample { .. })
        ));
    }

    #[test]
    fn test_grouping_is_case_sensitive() {
        let rows = aggregate(
            &[
                record("Medusa", 5.0, 44.0, 10, "dotabuff"),
                record("medusa", 6.0, 45.0, 10, "stratz"),
            ],
            PlayerSampleDivisor::default(),
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_global_groups_by_counter_within_each_hero() {
        let mut tables = BTreeMap::new();
        tables.insert("bloodseeker".to_string(), worked_example());
        tables.insert(
            "Axe".to_string(),
            vec![
                MatchupRecord::new("Axe", "medusa", 2.0, 48.0, 100, "dotabuff"),
                MatchupRecord::new("Axe", "medusa", 4.0, 46.0, 300, "stratz"),
            ],
        );

        let rows = aggregate_global(&tables).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].hero, "Axe");
        assert!((rows[0].weighted_disadvantage - 3.5).abs() < EPS);
        assert_eq!(rows[0].total_head_to_head_matches, Some(400));

        let medusa = rows
            .iter()
            .find(|r| r.hero == "bloodseeker" && r.counter_hero == "medusa")
            .unwrap();
        assert!((medusa.weighted_disadvantage - 5.157397).abs() < EPS);
        assert_eq!(medusa.total_head_to_head_matches, Some(22771 + 4147));
        assert_eq!(medusa.player_num_matches, None);
        assert_eq!(medusa.num_sources, 2);
    }

    #[test]
    fn test_global_reports_row_across_tables() {
        let mut tables = BTreeMap::new();
        tables.insert("Axe".to_string(), vec![MatchupRecord::new("Axe", "Lina", 1.0, 50.0, 5, "stratz")]);
        tables.insert(
            "Bane".to_string(),
            vec![MatchupRecord::new("Bane", "", 1.0, 50.0, 5, "stratz")],
        );
        assert!(matches!(
            aggregate_global(&tables),
            Err(AppError::MissingField { row: 1, field: "counter_hero" })
        ));
    }

    #[test]
    fn test_divisor_parsing() {
        assert_eq!("pair".parse::<PlayerSampleDivisor>().unwrap(), PlayerSampleDivisor::FixedPair);
        assert_eq!(
            "Sources".parse::<PlayerSampleDivisor>().unwrap(),
            PlayerSampleDivisor::SourceCount
        );
        assert!("three".parse::<PlayerSampleDivisor>().is_err());

        for divisor in [PlayerSampleDivisor::SourceCount, PlayerSampleDivisor::FixedPair] {
            assert_eq!(divisor.to_string().parse::<PlayerSampleDivisor>().unwrap(), divisor);
        }
    }
}
