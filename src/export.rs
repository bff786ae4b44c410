use crate::analysis::matchup::{AggregatedMatchup, MatchupRecord, RawMatchupRow};
use crate::error::{AppError, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    /// Object literal consumed by the web front-end.
    Js,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Js => "js",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "js" | "javascript" => Ok(OutputFormat::Js),
            other => Err(AppError::ConfigError(format!(
                "unknown output format `{}` (expected json, csv or js)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn render(rows: &[AggregatedMatchup], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => render_csv(rows),
        OutputFormat::Js => Ok(render_js(rows)),
    }
}

/// Writes `rows` to `path`, creating parent directories.
pub fn export(rows: &[AggregatedMatchup], format: OutputFormat, path: &Path) -> Result<()> {
    let body = render(rows, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    Ok(())
}

fn render_csv(rows: &[AggregatedMatchup]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Io(e.to_string()))
}

fn js_string(s: &str) -> String {
    if s.contains('\'') {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s)
    }
}

/// Nearest three-decimal value to the exact binary `x`, printed shortest.
fn round3(x: f64) -> f64 {
    format!("{:.3}", x).parse().unwrap_or(x)
}

/// One `"<hero>": [ ... ],` block per hero, preserving row order.
fn render_js(rows: &[AggregatedMatchup]) -> String {
    let mut heroes: Vec<(&str, Vec<&AggregatedMatchup>)> = Vec::new();
    for row in rows {
        match heroes.iter_mut().find(|(hero, _)| *hero == row.hero) {
            Some((_, counters)) => counters.push(row),
            None => heroes.push((row.hero.as_str(), vec![row])),
        }
    }

    let mut lines = Vec::new();
    for (hero, counters) in heroes {
        lines.push(format!("\"{}\": [", hero));
        for counter in counters {
            let disadvantage = round3(counter.weighted_disadvantage);
            lines.push(format!(
                "    {{ name: {}, {}: {:?} }},",
                js_string(&counter.counter_hero),
                js_string(hero),
                disadvantage
            ));
        }
        lines.push("],".to_string());
    }
    lines.join("\n")
}

/// Reads a flat matchup table with a header row. Empty cells are missing.
pub fn load_matchup_csv(path: &Path) -> Result<Vec<MatchupRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<RawMatchupRow>()
        .enumerate()
        .map(|(idx, row)| row?.into_record(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(hero: &str, counter: &str, dis: f64) -> AggregatedMatchup {
        AggregatedMatchup {
            hero: hero.into(),
            counter_hero: counter.into(),
            player_num_matches: None,
            player_win_rate: None,
            weighted_disadvantage: dis,
            weighted_win_percent: 45.0,
            num_sources: 2,
            total_head_to_head_matches: Some(100),
        }
    }

    #[test]
    fn test_js_blocks_per_hero() {
        let rows = vec![
            row("Bloodseeker", "Abaddon", 1.240676),
            row("Bloodseeker", "Medusa", 5.157397),
            row("Axe", "Nature's Prophet", 2.0),
        ];
        let text = render(&rows, OutputFormat::Js).unwrap();
        let expected = [
            "\"Bloodseeker\": [",
            "    { name: 'Abaddon', 'Bloodseeker': 1.241 },",
            "    { name: 'Medusa', 'Bloodseeker': 5.157 },",
            "],",
            "\"Axe\": [",
            "    { name: \"Nature's Prophet\", 'Axe': 2.0 },",
            "],",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_js_rounds_the_stored_value_not_the_scaled_one() {
        // 1.0005 and 5.1575 are stored just below the halfway point.
        let rows = vec![row("Axe", "Lina", 1.0005), row("Axe", "Lion", 5.1575)];
        let text = render(&rows, OutputFormat::Js).unwrap();
        assert!(text.contains("{ name: 'Lina', 'Axe': 1.0 },"));
        assert!(text.contains("{ name: 'Lion', 'Axe': 5.157 },"));
    }

    #[test]
    fn test_csv_has_header_and_blank_optionals() {
        let text = render(&[row("Axe", "Lina", 1.5)], OutputFormat::Csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("hero,counter_hero,player_num_matches,player_win_rate,weighted_disadvantage,weighted_win_percent,num_sources,total_head_to_head_matches")
        );
        assert_eq!(lines.next(), Some("Axe,Lina,,,1.5,45.0,2,100"));
    }

    #[test]
    fn test_export_json_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("counters.json");
        let rows = vec![row("Axe", "Lina", 1.5)];

        export(&rows, OutputFormat::Json, &path).unwrap();
        let back: Vec<AggregatedMatchup> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_load_matchup_csv_reports_blank_cell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(
            &path,
            "hero,counter_hero,target_disadvantage,target_winrate_vs_counter,counter_vs_target_matches_played,source\n\
             Axe,Lina,1.0,50.0,10,stratz\n\
             Axe,Lina,,49.0,12,dotabuff\n",
        )
        .unwrap();

        assert!(matches!(
            load_matchup_csv(&path),
            Err(AppError::MissingField { row: 1, field: "target_disadvantage" })
        ));
    }

    #[test]
    fn test_load_matchup_csv_reads_optional_player_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(
            &path,
            "hero,counter_hero,num_matches,num_wins,target_disadvantage,target_winrate_vs_counter,counter_vs_target_matches_played,source\n\
             Axe,Lina,4,3,1.0,50.0,10,stratz\n",
        )
        .unwrap();

        let records = load_matchup_csv(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num_matches, Some(4));
        assert_eq!(records[0].num_wins, Some(3));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("js".parse::<OutputFormat>().unwrap(), OutputFormat::Js);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
