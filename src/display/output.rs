use crate::analysis::matchup::AggregatedMatchup;
use crate::analysis::player_stats::PlayerHeroStats;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct CounterRow {
    rank: String,
    counter: String,
    disadvantage: String,
    win_rate: String,
    sources: String,
    sample: String,
}

#[derive(Tabled)]
struct PlayerHeroRow {
    hero: String,
    role: String,
    lane: String,
    matches: String,
    wins: String,
    win_rate: String,
}

/// Hardest counters first, grouped by hero.
pub fn top_counters(rows: &[AggregatedMatchup], top_n: usize) -> Vec<(&str, Vec<&AggregatedMatchup>)> {
    let mut heroes: Vec<(&str, Vec<&AggregatedMatchup>)> = Vec::new();
    for row in rows {
        match heroes.iter_mut().find(|(hero, _)| *hero == row.hero) {
            Some((_, counters)) => counters.push(row),
            None => heroes.push((row.hero.as_str(), vec![row])),
        }
    }

    for (_, counters) in heroes.iter_mut() {
        counters.sort_by(|a, b| b.weighted_disadvantage.total_cmp(&a.weighted_disadvantage));
        counters.truncate(top_n);
    }
    heroes
}

pub fn display_counters(rows: &[AggregatedMatchup], top_n: usize) {
    if rows.is_empty() {
        println!("{}", "No counter data available".yellow());
        return;
    }

    for (hero, counters) in top_counters(rows, top_n) {
        println!("\n{}", format!("🛡️  Hardest counters for {}", hero).bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let mut table_rows = vec![];
        for (idx, counter) in counters.iter().enumerate() {
            let sample = match (counter.total_head_to_head_matches, counter.player_num_matches) {
                (Some(total), _) => format!("{} games", total),
                (None, Some(played)) => format!(
                    "you: {} games, {:.1}% WR",
                    played,
                    counter.player_win_rate.unwrap_or(0.0) * 100.0
                ),
                (None, None) => "-".to_string(),
            };

            table_rows.push(CounterRow {
                rank: format!("#{}", idx + 1),
                counter: counter.counter_hero.clone(),
                disadvantage: format!("{:+.2}", counter.weighted_disadvantage),
                win_rate: format!("{:.1}%", counter.weighted_win_percent),
                sources: counter.num_sources.to_string(),
                sample,
            });
        }

        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Disadvantage: how unfavourable the matchup is for the hero (higher = worse)");
    println!("• Win Rate: the hero's win rate against this counter, weighted by games per source\n");
}

pub fn display_player_heroes(player_id: u64, stats: &[PlayerHeroStats]) {
    println!("\n{}", format!("📊 HEROES PLAYED by {}", player_id).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if stats.is_empty() {
        println!("{}", "No matches in the lookback window".yellow());
        return;
    }

    let rows: Vec<PlayerHeroRow> = stats
        .iter()
        .map(|s| {
            let win_rate = format!("{:.1}%", s.win_rate * 100.0);
            PlayerHeroRow {
                hero: s.hero.clone(),
                role: s.role.clone(),
                lane: s.lane.clone(),
                matches: s.num_matches.to_string(),
                wins: s.num_wins.to_string(),
                win_rate: if s.win_rate >= 0.5 {
                    win_rate.green().to_string()
                } else {
                    win_rate.red().to_string()
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hero: &str, counter: &str, dis: f64) -> AggregatedMatchup {
        AggregatedMatchup {
            hero: hero.into(),
            counter_hero: counter.into(),
            player_num_matches: None,
            player_win_rate: None,
            weighted_disadvantage: dis,
            weighted_win_percent: 50.0,
            num_sources: 2,
            total_head_to_head_matches: Some(10),
        }
    }

    #[test]
    fn test_top_counters_sorted_and_truncated() {
        let rows = vec![
            row("Axe", "Lina", 1.0),
            row("Axe", "Lion", 3.0),
            row("Bane", "Io", -1.0),
            row("Axe", "Luna", 2.0),
        ];
        let grouped = top_counters(&rows, 2);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "Axe");
        let names: Vec<&str> = grouped[0].1.iter().map(|r| r.counter_hero.as_str()).collect();
        assert_eq!(names, vec!["Lion", "Luna"]);
        assert_eq!(grouped[1].1.len(), 1);
    }
}
