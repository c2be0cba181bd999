use serde::{Serialize, Serializer};

use super::extrapolation::Extrapolation;
use crate::config::EngineSettings;
use crate::domain::{Dataset, Timestamp};

/// Default chart range. `[0, 0]` means "show everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoomWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ZoomWindow {
    pub const EVERYTHING: ZoomWindow = ZoomWindow { start: 0, end: 0 };

    pub fn is_everything(&self) -> bool {
        *self == Self::EVERYTHING
    }
}

impl Serialize for ZoomWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

/// Pick the default zoom for a region's ascending series.
///
/// The window ends at the projected point when a projection exists, otherwise at
/// the newest sample, and starts at the newest sample strictly older than the
/// lookback offset.
pub fn calculate_extremes_to_zoom_to(
    series: &[Dataset],
    extrapolation: Option<&Extrapolation>,
    settings: &EngineSettings,
) -> ZoomWindow {
    let projected_end = extrapolation
        .map(|e| e.timestamp)
        .filter(|&timestamp| timestamp > 0);

    let end = match projected_end.or_else(|| series.last().map(|d| d.timestamp)) {
        Some(end) => end,
        None => return ZoomWindow::EVERYTHING,
    };

    let offset = if extrapolation.is_some() {
        settings.viewport_offset_with_extrapolation_ms
    } else {
        settings.viewport_offset_ms
    };

    let threshold = end - offset;
    series
        .iter()
        .rev()
        .find(|d| d.timestamp < threshold)
        .map(|d| ZoomWindow {
            start: d.timestamp,
            end,
        })
        .unwrap_or(ZoomWindow::EVERYTHING)
}
