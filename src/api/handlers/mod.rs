use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::engine::Engine;
use crate::errors::EngineError;

pub mod seasons;

pub struct AppState {
    pub engine: Engine,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonParams {
    pub regions: Option<String>,
    pub overlays: Option<String>,
    pub as_of: Option<i64>,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, self.to_string()).into_response()
    }
}
