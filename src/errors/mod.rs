use thiserror::Error;

/// Configuration failures raised at the request boundary, before any
/// aggregation runs. Missing data is never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown season: {0}")]
    UnknownSeason(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("Unknown overlay: {0}")]
    UnknownOverlay(String),

    #[error("Season {0} has an empty affix schedule")]
    InvalidSchedule(String),
}

impl EngineError {
    /// Whether the error names something the caller asked for that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::UnknownSeason(_))
    }
}
