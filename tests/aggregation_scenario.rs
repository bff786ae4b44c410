use draftdiff::analysis::aggregator::{aggregate, PlayerSampleDivisor};
use draftdiff::error::AppError;
use draftdiff::export::{export, load_matchup_csv, OutputFormat};
use std::fs;
use tempfile::TempDir;

const BLOODSEEKER_ROWS: &str = "\
hero,counter_hero,num_matches,num_wins,target_disadvantage,target_winrate_vs_counter,counter_vs_target_matches_played,source
bloodseeker,medusa,1,1,5.0105,44.6005,22771,dotabuff
bloodseeker,abaddon,1,1,1.1627,45.4581,27434,dotabuff
bloodseeker,medusa,1,1,5.964,44.4417651314203,4147,stratz
bloodseeker,abaddon,1,1,1.658,45.3179867342957,5126,stratz
";

fn write_rows(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("rows.csv");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn bloodseeker_counters_blend_to_documented_values() {
    let dir = TempDir::new().unwrap();
    let records = load_matchup_csv(&write_rows(&dir, BLOODSEEKER_ROWS)).unwrap();

    for divisor in [PlayerSampleDivisor::SourceCount, PlayerSampleDivisor::FixedPair] {
        let rows = aggregate(&records, divisor).unwrap();
        assert_eq!(rows.len(), 2);

        let abaddon = &rows[0];
        assert_eq!(abaddon.counter_hero, "abaddon");
        assert!((abaddon.weighted_disadvantage - 1.240676).abs() < 1e-6);
        assert!((abaddon.weighted_win_percent - 45.436042).abs() < 1e-6);

        let medusa = &rows[1];
        assert_eq!(medusa.counter_hero, "medusa");
        assert!((medusa.weighted_disadvantage - 5.157397).abs() < 1e-6);
        assert!((medusa.weighted_win_percent - 44.576045).abs() < 1e-6);

        for row in &rows {
            assert_eq!(row.hero, "bloodseeker");
            assert_eq!(row.num_sources, 2);
            assert_eq!(row.player_num_matches, Some(1));
            assert_eq!(row.player_win_rate, Some(1.0));
            assert_eq!(row.total_head_to_head_matches, None);
        }
    }
}

#[test]
fn shuffled_input_gives_identical_output() {
    let dir = TempDir::new().unwrap();
    let mut lines: Vec<&str> = BLOODSEEKER_ROWS.lines().collect();
    let header = lines.remove(0);
    lines.reverse();
    let shuffled = format!("{}\n{}\n", header, lines.join("\n"));

    let forward = aggregate(
        &load_matchup_csv(&write_rows(&dir, BLOODSEEKER_ROWS)).unwrap(),
        PlayerSampleDivisor::SourceCount,
    )
    .unwrap();
    let reversed = aggregate(
        &load_matchup_csv(&write_rows(&dir, &shuffled)).unwrap(),
        PlayerSampleDivisor::SourceCount,
    )
    .unwrap();

    assert_eq!(forward, reversed);
}

#[test]
fn all_zero_weights_fail_instead_of_producing_nan() {
    let dir = TempDir::new().unwrap();
    let body = "\
hero,counter_hero,target_disadvantage,target_winrate_vs_counter,counter_vs_target_matches_played,source
axe,lina,1.0,50.0,0,dotabuff
axe,lina,2.0,48.0,0,stratz
";
    let records = load_matchup_csv(&write_rows(&dir, body)).unwrap();

    match aggregate(&records, PlayerSampleDivisor::SourceCount) {
        Err(AppError::ZeroWeight { hero, counter_hero }) => {
            assert_eq!(hero, "axe");
            assert_eq!(counter_hero, "lina");
        }
        other => panic!("expected ZeroWeight, got {:?}", other),
    }
}

#[test]
fn blended_table_exports_as_js_literal() {
    let dir = TempDir::new().unwrap();
    let records = load_matchup_csv(&write_rows(&dir, BLOODSEEKER_ROWS)).unwrap();
    let rows = aggregate(&records, PlayerSampleDivisor::SourceCount).unwrap();

    let out = dir.path().join("export").join("bloodseeker.js");
    export(&rows, OutputFormat::Js, &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "\"bloodseeker\": [\n    { name: 'abaddon', 'bloodseeker': 1.241 },\n    { name: 'medusa', 'bloodseeker': 5.157 },\n],"
    );
}
