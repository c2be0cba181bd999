use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::database::{self, setup::ensure_schema, snapshots, DbPool};
use crate::domain::RawRow;

/// Loads scraped snapshot rows from a JSON file into the snapshot store
pub struct ImportService {
    pool: DbPool,
}

impl ImportService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn from_path(database_path: &str) -> Result<Self> {
        Ok(Self::new(database::create_pool(database_path)?))
    }

    pub fn run<P: AsRef<Path>>(&self, file: P) -> Result<usize> {
        info!("=== Starting Snapshot Import ===");

        let rows = self.read_rows(file.as_ref())?;
        info!("  → Read {} rows", rows.len());

        let mut conn = database::get_connection(&self.pool)?;
        ensure_schema(&mut conn)?;
        let inserted = snapshots::insert_rows(&mut conn, &rows)?;
        let total = snapshots::count_rows(&mut conn)?;
        info!("  → Inserted {} rows, store now holds {}", inserted, total);

        info!("=== Import Complete ===");
        Ok(inserted)
    }

    fn read_rows(&self, path: &Path) -> Result<Vec<RawRow>> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse snapshot rows from {}. First 200 chars: {}",
                path.display(),
                json.chars().take(200).collect::<String>()
            )
        })
    }
}
