use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::handlers::{
    seasons::{get_season, list_seasons},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/seasons", get(list_seasons))
        .route("/api/seasons/:slug", get(get_season))
        .with_state(state)
}
