use crate::analysis::aggregator::PlayerSampleDivisor;
use crate::error::AppError;
use crate::export::OutputFormat;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Only needed by runs that query Stratz.
    pub stratz_api_token: Option<String>,
    pub data_dir: PathBuf,
    pub output_format: OutputFormat,
    pub lookback_days: u32,
    pub divisor: PlayerSampleDivisor,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stratz_api_token: None,
            data_dir: PathBuf::from("data"),
            output_format: OutputFormat::Csv,
            lookback_days: 30,
            divisor: PlayerSampleDivisor::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        config.stratz_api_token = lookup("STRATZ_API_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(dir) = lookup("DRAFTDIFF_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("DRAFTDIFF_OUTPUT_FORMAT") {
            config.output_format = raw.parse()?;
        }
        if let Some(raw) = lookup("DRAFTDIFF_LOOKBACK_DAYS") {
            config.lookback_days = raw.parse().map_err(|_| {
                AppError::ConfigError(format!("DRAFTDIFF_LOOKBACK_DAYS is not a number: {}", raw))
            })?;
        }
        if let Some(raw) = lookup("DRAFTDIFF_PLAYER_DIVISOR") {
            config.divisor = raw.parse()?;
        }

        Ok(config)
    }

    pub fn require_stratz_token(&self) -> Result<&str, AppError> {
        self.stratz_api_token.as_deref().ok_or_else(|| {
            AppError::ConfigError("STRATZ_API_TOKEN not found in environment or .env file".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.divisor, PlayerSampleDivisor::SourceCount);
        assert!(config.require_stratz_token().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STRATZ_API_TOKEN", "abc"),
            ("DRAFTDIFF_DATA_DIR", "/tmp/dd"),
            ("DRAFTDIFF_OUTPUT_FORMAT", "js"),
            ("DRAFTDIFF_LOOKBACK_DAYS", "14"),
            ("DRAFTDIFF_PLAYER_DIVISOR", "pair"),
        ]))
        .unwrap();
        assert_eq!(config.require_stratz_token().unwrap(), "abc");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dd"));
        assert_eq!(config.output_format, OutputFormat::Js);
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.divisor, PlayerSampleDivisor::FixedPair);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("DRAFTDIFF_LOOKBACK_DAYS", "a month")])),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DRAFTDIFF_OUTPUT_FORMAT", "xlsx")])),
            Err(AppError::ConfigError(_))
        ));
    }
}
