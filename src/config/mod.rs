pub mod seasons;
pub mod settings;

pub use seasons::{get_seasons, load_season_table};
pub use settings::{AppConfig, EngineSettings, ServerSettings};
