use crate::domain::{DAY_MS, Timestamp, WEEK_MS};

const MINUTE_MS: Timestamp = 60 * 1000;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub extrapolation_horizon_ms: Timestamp,
    pub trailing_window_ms: Timestamp,
    pub viewport_offset_with_extrapolation_ms: Timestamp,
    pub viewport_offset_ms: Timestamp,
    pub crawl_interval_ms: Timestamp,
    pub retry_interval_ms: Timestamp,
    pub ended_season_expiry_ms: Timestamp,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            extrapolation_horizon_ms: 14 * DAY_MS,
            trailing_window_ms: 14 * DAY_MS,
            viewport_offset_with_extrapolation_ms: 4 * WEEK_MS,
            viewport_offset_ms: 2 * WEEK_MS,
            crawl_interval_ms: 60 * MINUTE_MS, // scraper runs hourly
            retry_interval_ms: 5 * MINUTE_MS,
            ended_season_expiry_ms: 30 * DAY_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_path: String,
    pub seasons_path: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "cutoff_tracker.db".to_string()),
            seasons_path: std::env::var("SEASONS_PATH").ok(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineSettings,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            engine: EngineSettings::default(),
            server: ServerSettings::default(),
        }
    }
}
