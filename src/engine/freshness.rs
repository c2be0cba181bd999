use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngineSettings;
use crate::domain::{Overlay, Region, Season, Timestamp};

/// Everything that shaped one response
#[derive(Debug, Clone)]
pub struct FreshnessInput<'a> {
    pub season: &'a Season,
    pub now: Timestamp,
    /// Newest sample per requested region, `None` for an empty series
    pub latest_per_region: Vec<(Region, Option<Timestamp>)>,
    pub extrapolation_cutoff: Option<Timestamp>,
    pub overlays: &'a [Overlay],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Freshness {
    pub etag: String,
    pub expires: Timestamp,
    pub last_modified: Option<Timestamp>,
    #[serde(skip)]
    now: Timestamp,
}

pub fn derive_freshness(input: &FreshnessInput<'_>, settings: &EngineSettings) -> Freshness {
    let last_modified = input
        .latest_per_region
        .iter()
        .filter_map(|(_, latest)| *latest)
        .max();

    let expires = input
        .latest_per_region
        .iter()
        .map(|(region, latest)| natural_refresh(input.season, *region, *latest, input.now, settings))
        .min()
        .unwrap_or(input.now + settings.retry_interval_ms);

    Freshness {
        etag: build_etag(input, last_modified),
        expires,
        last_modified,
        now: input.now,
    }
}

/// Sorted, hyphen-joined fingerprint of the response inputs
fn build_etag(input: &FreshnessInput<'_>, last_modified: Option<Timestamp>) -> String {
    let mut members: Vec<String> = [
        Some(input.season.slug.to_string()),
        last_modified.map(|ts| ts.to_string()),
        input.extrapolation_cutoff.map(|ts| ts.to_string()),
    ]
    .into_iter()
    .flatten()
    .chain(input.latest_per_region.iter().map(|(region, _)| region.to_string()))
    .chain(input.overlays.iter().map(|overlay| overlay.as_str().to_string()))
    .collect();

    members.sort();
    members.join("-")
}

/// When a region's data can next be expected to change
fn natural_refresh(
    season: &Season,
    region: Region,
    latest: Option<Timestamp>,
    now: Timestamp,
    settings: &EngineSettings,
) -> Timestamp {
    if season.has_ended(region, now) {
        return now + settings.ended_season_expiry_ms;
    }

    match latest.map(|ts| ts + settings.crawl_interval_ms) {
        Some(next_crawl) if next_crawl > now => next_crawl,
        _ => now + settings.retry_interval_ms,
    }
}

/// Header bag for the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct FreshnessHeaders {
    pub etag: String,
    pub expires: String,
    pub last_modified: Option<String>,
    pub cache_control: String,
}

impl Freshness {
    pub fn headers(&self) -> FreshnessHeaders {
        let max_age = ((self.expires - self.now) / 1000).max(0);

        FreshnessHeaders {
            etag: format!("\"{}\"", self.etag),
            expires: http_date(self.expires),
            last_modified: self.last_modified.map(http_date),
            cache_control: format!("public, max-age={}", max_age),
        }
    }

    /// Whether an `If-None-Match` value names this response
    pub fn matches(&self, if_none_match: &str) -> bool {
        let quoted = format!("\"{}\"", self.etag);
        if_none_match
            .split(',')
            .map(str::trim)
            .any(|tag| tag == "*" || tag == quoted || tag.trim_start_matches("W/") == quoted)
    }
}

fn http_date(timestamp: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
