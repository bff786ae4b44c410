use serde::{Deserialize, Serialize};

// Stratz GraphQL: GetHeroMatchUps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratzMatchupResponse {
    pub data: Option<StratzData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StratzData {
    pub hero_stats: HeroStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroStats {
    pub hero_vs_hero_matchup: HeroVsHeroMatchup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroVsHeroMatchup {
    pub advantage: Vec<MatchupAdvantage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupAdvantage {
    pub hero_id: u16,
    pub vs: Vec<HeroVsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroVsEntry {
    pub hero_id2: u16,
    pub match_count: u64,
    pub win_count: u64,
    pub synergy: f64,
}
