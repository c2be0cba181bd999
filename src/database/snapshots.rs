use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::{DbConn, DbPool, get_connection};
use crate::domain::{RawRow, Region, Timestamp};
use crate::engine::SnapshotSource;

pub fn insert_rows(conn: &mut DbConn, rows: &[RawRow]) -> Result<usize> {
    let tx = conn.transaction().context("Failed to open transaction")?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO snapshots (timestamp, region, faction, score, rank) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for row in rows {
            stmt.execute(params![row.timestamp, row.region, row.faction, row.score, row.rank])
                .context("Failed to insert snapshot")?;
        }
    }
    tx.commit().context("Failed to commit snapshots")?;

    Ok(rows.len())
}

/// Rows of one region within `[from, to]`, newest first
pub fn fetch_rows(
    conn: &mut DbConn,
    region: Region,
    from: Timestamp,
    to: Timestamp,
) -> Result<Vec<RawRow>> {
    let sql = "SELECT timestamp, region, faction, score, rank FROM snapshots WHERE region = ?1 AND timestamp >= ?2 AND timestamp <= ?3 ORDER BY timestamp DESC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![region.as_str(), from, to], parse_raw_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read snapshots")?;

    Ok(rows)
}

pub fn count_rows(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))
        .context("Failed to count snapshots")
}

fn parse_raw_row(row: &rusqlite::Row) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        timestamp: row.get(0)?,
        region: row.get(1)?,
        faction: row.get(2)?,
        score: row.get(3)?,
        rank: row.get(4)?,
    })
}

/// The snapshot table as the engine's row source
pub struct SqliteSnapshotSource {
    pool: DbPool,
}

impl SqliteSnapshotSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SnapshotSource for SqliteSnapshotSource {
    fn fetch_rows(&self, region: Region, from: Timestamp, to: Timestamp) -> Result<Vec<RawRow>> {
        let mut conn = get_connection(&self.pool)?;
        fetch_rows(&mut conn, region, from, to)
    }
}
