use log::warn;

use crate::domain::{Dataset, Faction, RawRow, Region};

/// Validate raw store rows and order them chronologically.
///
/// Rows with an unknown region or faction, a negative or non-finite score, or a
/// negative rank are dropped. A rank of zero is the "unknown" sentinel and is
/// stored as absent; a row that carries neither a score nor a rank is dropped.
pub fn normalize_rows(rows: Vec<RawRow>) -> Vec<Dataset> {
    let total = rows.len();
    let mut datasets: Vec<Dataset> = rows.into_iter().filter_map(normalize_row).collect();

    let dropped = total - datasets.len();
    if dropped > 0 {
        warn!("Dropped {} of {} malformed snapshot rows", dropped, total);
    }

    datasets.sort_by_key(|d| d.timestamp);
    datasets
}

fn normalize_row(row: RawRow) -> Option<Dataset> {
    let region: Region = row.region.parse().ok()?;
    let faction = parse_faction(row.faction.as_deref())?;

    if !row.score.is_finite() || row.score < 0.0 {
        return None;
    }

    let rank = match row.rank {
        Some(r) if r < 0 => return None,
        Some(r) => u32::try_from(r).ok().filter(|&r| r > 0),
        None => None,
    };

    if row.score == 0.0 && rank.is_none() {
        return None;
    }

    Some(Dataset {
        timestamp: row.timestamp,
        region,
        faction,
        score: row.score,
        rank,
    })
}

/// `Some(None)` for an untagged row, `None` for an unparseable tag
fn parse_faction(faction: Option<&str>) -> Option<Option<Faction>> {
    match faction {
        None | Some("") => Some(None),
        Some(name) => name.parse().ok().map(Some),
    }
}
