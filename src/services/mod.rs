pub mod import;
pub mod report;
pub mod server;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{load_season_table, AppConfig};
use crate::database::{self, setup::ensure_schema, SqliteSnapshotSource};
use crate::engine::Engine;

/// Engine over the configured SQLite snapshot store
pub fn build_engine(config: &AppConfig) -> Result<Engine> {
    let pool = database::create_pool(&config.server.database_path)?;
    let mut conn = database::get_connection(&pool)?;
    ensure_schema(&mut conn)?;
    drop(conn);

    let seasons = load_season_table(&config.server)?;
    let source = Arc::new(SqliteSnapshotSource::new(pool));

    Ok(Engine::new(seasons, config.engine.clone(), source))
}
