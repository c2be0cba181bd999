use serde::Serialize;

use crate::config::EngineSettings;
use crate::domain::{DAY_MS, Dataset, FactionKey, Field, Region, Season, Timestamp};

/// Linear projection of a series, anchored on `connector`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extrapolation {
    pub value: f64,
    pub timestamp: Timestamp,
    pub connector: Dataset,
}

/// Two-point projection over the trailing window, normalized to the horizon.
///
/// `series` must be ascending and restricted to a single (region, faction).
/// Samples whose selected value is the zero sentinel are skipped. Returns
/// `None` when nothing at or before `now` exists, or when the trailing window
/// holds a single sample.
pub fn extrapolate(
    series: &[Dataset],
    field: Field,
    now: Timestamp,
    settings: &EngineSettings,
) -> Option<Extrapolation> {
    let (last, last_value) = series
        .iter()
        .rev()
        .filter(|d| d.timestamp <= now)
        .find_map(|d| d.value(field).map(|v| (d, v)))?;

    let window_start = last.timestamp - settings.trailing_window_ms;
    let (first, first_value) = series
        .iter()
        .filter(|d| d.timestamp >= window_start)
        .find_map(|d| d.value(field).map(|v| (d, v)))?;

    if first.timestamp >= last.timestamp {
        return None;
    }

    let days_passed = (last.timestamp - first.timestamp) as f64 / DAY_MS as f64;
    let factor = (settings.extrapolation_horizon_ms as f64 / DAY_MS as f64) / days_passed;

    Some(Extrapolation {
        value: (last_value + (last_value - first_value) * factor).round(),
        timestamp: last.timestamp + settings.extrapolation_horizon_ms,
        connector: last.clone(),
    })
}

/// [`extrapolate`] with the season's knowledge applied: nothing is projected for
/// a region whose season has ended, whose cutoff is already confirmed, or whose
/// known end falls before the projected point.
pub fn extrapolate_for_season(
    season: &Season,
    region: Region,
    faction: FactionKey,
    series: &[Dataset],
    field: Field,
    now: Timestamp,
    settings: &EngineSettings,
) -> Option<Extrapolation> {
    if season.has_ended(region, now) || season.confirmed_cutoff(region, faction).is_some() {
        return None;
    }

    let extrapolation = extrapolate(series, field, now, settings)?;

    match season.end(region) {
        Some(end) if end < extrapolation.timestamp => None,
        _ => Some(extrapolation),
    }
}
