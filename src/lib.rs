//! Blends Dota 2 hero counter statistics from several upstream sources into
//! one match-weighted disadvantage and win-rate estimate per hero pair.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod heroes;
pub mod pipeline;
pub mod rate_limit;
pub mod sources;
