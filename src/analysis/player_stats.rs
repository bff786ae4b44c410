use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How one player has fared on one hero, in one role and lane, over the
/// lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHeroStats {
    pub hero: String,
    pub role: String,
    pub lane: String,
    pub num_matches: u64,
    pub num_wins: u64,
    pub win_rate: f64,
}

impl PlayerHeroStats {
    pub fn new(hero: String, role: String, lane: String) -> Self {
        PlayerHeroStats {
            hero,
            role,
            lane,
            num_matches: 0,
            num_wins: 0,
            win_rate: 0.0,
        }
    }

    fn refresh_win_rate(&mut self) {
        self.win_rate = if self.num_matches == 0 {
            0.0
        } else {
            self.num_wins as f64 / self.num_matches as f64
        };
    }
}

#[derive(Default)]
pub struct PlayerStatsTracker {
    stats: HashMap<(String, String, String), PlayerHeroStats>,
}

impl PlayerStatsTracker {
    pub fn new() -> Self {
        PlayerStatsTracker {
            stats: HashMap::new(),
        }
    }

    pub fn add_match(&mut self, hero: &str, role: &str, lane: &str, won: bool) {
        let entry = self
            .stats
            .entry((hero.to_string(), role.to_string(), lane.to_string()))
            .or_insert_with(|| {
                PlayerHeroStats::new(hero.to_string(), role.to_string(), lane.to_string())
            });

        entry.num_matches += 1;
        if won {
            entry.num_wins += 1;
        }
        entry.refresh_win_rate();
    }

    /// Most played first, ties broken by hero, role, then lane.
    pub fn get_stats(&self) -> Vec<PlayerHeroStats> {
        let mut stats: Vec<PlayerHeroStats> = self.stats.values().cloned().collect();
        stats.sort_by(|a, b| {
            b.num_matches
                .cmp(&a.num_matches)
                .then_with(|| a.hero.cmp(&b.hero))
                .then_with(|| a.role.cmp(&b.role))
                .then_with(|| a.lane.cmp(&b.lane))
        });
        stats
    }

    pub fn total_matches(&self) -> u64 {
        self.stats.values().map(|s| s.num_matches).sum()
    }
}
