use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Row {row} is missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },

    #[error("No head-to-head matches for {hero} vs {counter_hero}; weighted average is undefined")]
    ZeroWeight { hero: String, counter_hero: String },

    #[error("{hero} vs {counter_hero} has {num_sources} source(s); the fixed pair divisor needs exactly 2")]
    ImbalancedSourceCount {
        hero: String,
        counter_hero: String,
        num_sources: usize,
    },

    #[error("No player matches recorded for {hero} vs {counter_hero}; player win rate is undefined")]
    EmptyPlayerSample { hero: String, counter_hero: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("Unknown hero: {0}")]
    UnknownHero(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("No cached data for {ds}; live data can only be fetched for today")]
    StaleScrape { ds: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::JsonError(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Io(format!("CSV: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
