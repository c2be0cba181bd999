use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, ETAG, EXPIRES, IF_NONE_MATCH, LAST_MODIFIED},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json},
};
use chrono::Utc;
use std::sync::Arc;

use super::{AppState, SeasonParams};
use crate::api::models::{SeasonListItem, SeasonListResponse};
use crate::engine::{FreshnessHeaders, LoadRequest};

pub async fn list_seasons(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let seasons = state.engine.seasons();
    let items: Vec<SeasonListItem> = seasons
        .slugs()
        .into_iter()
        .filter_map(|slug| seasons.get(slug).ok())
        .map(SeasonListItem::from)
        .collect();

    Json(SeasonListResponse {
        total: items.len(),
        items,
    })
}

pub async fn get_season(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<SeasonParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let request = match LoadRequest::parse(
        &slug,
        params.regions.as_deref(),
        params.overlays.as_deref(),
        params.as_of,
    ) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let now = Utc::now().timestamp_millis();
    let response = match state.engine.load(&request, now).await {
        Ok(response) => response,
        Err(e) => return e.into_response(),
    };

    let cache_headers = build_cache_headers(&response.freshness.headers());

    let if_none_match = headers.get(IF_NONE_MATCH).and_then(|h| h.to_str().ok());
    if if_none_match.is_some_and(|tag| response.freshness.matches(tag)) {
        return (StatusCode::NOT_MODIFIED, cache_headers).into_response();
    }

    (cache_headers, Json(response)).into_response()
}

fn build_cache_headers(bag: &FreshnessHeaders) -> HeaderMap {
    let mut headers = HeaderMap::new();

    insert_header(&mut headers, ETAG, &bag.etag);
    insert_header(&mut headers, EXPIRES, &bag.expires);
    insert_header(&mut headers, CACHE_CONTROL, &bag.cache_control);
    if let Some(last_modified) = &bag.last_modified {
        insert_header(&mut headers, LAST_MODIFIED, last_modified);
    }

    headers
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => log::warn!("Skipping invalid {} header {:?}: {}", name, value, e),
    }
}
