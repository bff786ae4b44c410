// API endpoint definitions

pub const STRATZ_GRAPHQL_ENDPOINT: &str = "https://api.stratz.com/graphql";
pub const DOTABUFF_HEROES_ENDPOINT: &str = "https://www.dotabuff.com/heroes";
pub const DOTABUFF_PLAYERS_ENDPOINT: &str = "https://www.dotabuff.com/players";

pub const STRATZ_USER_AGENT: &str = "STRATZ_API";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

pub const HERO_MATCHUPS_QUERY: &str = r#"query GetHeroMatchUps($heroId: Short!, $matchLimit: Int!, $bracketBasicIds: [RankBracketBasicEnum]) {
  heroStats {
    heroVsHeroMatchup(
      heroId: $heroId
      matchLimit: $matchLimit
      bracketBasicIds: $bracketBasicIds
    ) {
      advantage {
        heroId
        matchCountWith
        matchCountVs
        vs {
          heroId2
          matchCount
          winCount
          synergy
        }
      }
    }
  }
}"#;

pub fn dotabuff_counters_url(slug: &str) -> String {
    format!("{}/{}/counters", DOTABUFF_HEROES_ENDPOINT, slug)
}

pub fn dotabuff_match_page_url(player_id: u64, page: u32) -> String {
    format!(
        "{}/{}/matches?enhance=overview&page={}",
        DOTABUFF_PLAYERS_ENDPOINT, player_id, page
    )
}
