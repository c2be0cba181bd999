pub mod dedup;
pub mod extrapolation;
pub mod freshness;
pub mod normalize;
pub mod pipeline;
pub mod viewport;
pub mod weekly;

pub use dedup::dedupe_by_day;
pub use extrapolation::{Extrapolation, extrapolate, extrapolate_for_season};
pub use freshness::{Freshness, FreshnessHeaders, derive_freshness};
pub use normalize::normalize_rows;
pub use pipeline::{Engine, LoadRequest, RegionResult, SeasonResponse, SnapshotSource, compute_region};
pub use viewport::{ZoomWindow, calculate_extremes_to_zoom_to};
pub use weekly::{WeekPosition, WeekSummary, week_position, weekly_summaries};
