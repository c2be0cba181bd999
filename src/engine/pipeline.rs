use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::task::JoinSet;

use super::dedup::{dedupe_by_day, group_by_faction};
use super::extrapolation::{Extrapolation, extrapolate_for_season};
use super::freshness::{Freshness, FreshnessInput, derive_freshness};
use super::normalize::normalize_rows;
use super::viewport::{ZoomWindow, calculate_extremes_to_zoom_to};
use super::weekly::{WeekPosition, WeekSummary, week_position, weekly_summaries};
use crate::config::EngineSettings;
use crate::domain::{
    Dataset, FactionKey, Field, Overlay, RawRow, Region, Season, SeasonSlug, SeasonTable, Timestamp,
};
use crate::errors::EngineError;

/// Where raw snapshots come from. Implementations may block.
pub trait SnapshotSource: Send + Sync {
    fn fetch_rows(&self, region: Region, from: Timestamp, to: Timestamp) -> Result<Vec<RawRow>>;
}

/// A validated request: only known seasons, regions and overlays get this far
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub season: SeasonSlug,
    pub regions: Vec<Region>,
    pub overlays: Vec<Overlay>,
    /// Evaluate projections and weeks as of this time instead of now
    pub as_of: Option<Timestamp>,
}

impl LoadRequest {
    /// Parse the loosely-typed request parameters. Regions and overlays are
    /// comma separated; no regions means all of them.
    pub fn parse(
        season: &str,
        regions: Option<&str>,
        overlays: Option<&str>,
        as_of: Option<Timestamp>,
    ) -> Result<Self, EngineError> {
        let season = season.parse()?;

        let mut regions: Vec<Region> = split_list(regions)
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        if regions.is_empty() {
            regions = Region::ALL.to_vec();
        }
        regions.sort();
        regions.dedup();

        let mut overlays: Vec<Overlay> = split_list(overlays)
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        overlays.sort();
        overlays.dedup();

        Ok(Self {
            season,
            regions,
            overlays,
            as_of,
        })
    }
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionForecast {
    pub faction: FactionKey,
    pub score: Option<Extrapolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Extrapolation>,
    pub confirmed_cutoff: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResult {
    pub region: Region,
    pub series: Vec<Dataset>,
    pub forecasts: Vec<FactionForecast>,
    pub zoom: ZoomWindow,
    pub week: Option<WeekPosition>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub weeks: BTreeMap<u64, WeekSummary>,
}

impl RegionResult {
    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.series.last().map(|d| d.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResponse {
    pub season: SeasonSlug,
    pub now: Timestamp,
    pub extrapolation_cutoff: Option<Timestamp>,
    pub regions: BTreeMap<Region, RegionResult>,
    pub freshness: Freshness,
}

/// Turn one region's raw rows into everything the chart needs
pub fn compute_region(
    season: &Season,
    region: Region,
    rows: Vec<RawRow>,
    eval: Timestamp,
    overlays: &[Overlay],
    settings: &EngineSettings,
) -> RegionResult {
    let normalized: Vec<Dataset> = normalize_rows(rows)
        .into_iter()
        .filter(|d| d.region == region)
        .collect();
    let total = normalized.len();

    // faction tags must agree with the season's cross-faction mode at that instant
    let consistent: Vec<Dataset> = normalized
        .into_iter()
        .filter(|d| d.faction.is_some() == season.tracks_factions_at(d.timestamp))
        .collect();
    if consistent.len() < total {
        warn!(
            "Dropped {} {} samples with mismatched faction tagging for {}",
            total - consistent.len(),
            region,
            season.slug
        );
    }

    let series = dedupe_by_day(consistent);

    let forecasts: Vec<FactionForecast> = group_by_faction(&series)
        .into_iter()
        .map(|(faction, group)| FactionForecast {
            faction,
            score: extrapolate_for_season(season, region, faction, &group, Field::Score, eval, settings),
            rank: extrapolate_for_season(season, region, faction, &group, Field::Rank, eval, settings),
            confirmed_cutoff: season.confirmed_cutoff(region, faction),
        })
        .collect();

    let canonical_rank = forecasts
        .iter()
        .filter_map(|f| f.rank.as_ref())
        .max_by_key(|e| e.timestamp);
    let zoom = calculate_extremes_to_zoom_to(&series, canonical_rank, settings);

    let week = season
        .start(region)
        .and_then(|start| week_position(start, season.end(region), eval, season.schedule_len()));

    let weeks = if overlays.contains(&Overlay::Affixes) {
        weekly_summaries(season, region, &series, eval)
    } else {
        BTreeMap::new()
    };

    let forecasts = if overlays.contains(&Overlay::Rank) {
        forecasts
    } else {
        forecasts
            .into_iter()
            .map(|f| FactionForecast { rank: None, ..f })
            .collect()
    };

    RegionResult {
        region,
        series,
        forecasts,
        zoom,
        week,
        weeks,
    }
}

#[derive(Clone)]
pub struct Engine {
    seasons: Arc<SeasonTable>,
    settings: EngineSettings,
    source: Arc<dyn SnapshotSource>,
}

impl Engine {
    pub fn new(seasons: SeasonTable, settings: EngineSettings, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            seasons: Arc::new(seasons),
            settings,
            source,
        }
    }

    pub fn seasons(&self) -> &SeasonTable {
        &self.seasons
    }

    /// Load and aggregate every requested region concurrently.
    ///
    /// Only an unknown season fails. A region whose fetch fails or returns
    /// nothing comes back with an empty series. Dropping the returned future
    /// abandons the in-flight fetches.
    pub async fn load(&self, request: &LoadRequest, now: Timestamp) -> Result<SeasonResponse, EngineError> {
        let season = Arc::new(self.seasons.get(request.season)?.clone());
        // evaluating past `now` has no data to stand on
        let as_of = request.as_of.map(|as_of| as_of.min(now));
        let eval = as_of.unwrap_or(now);

        let mut tasks = JoinSet::new();
        for &region in &request.regions {
            let season = Arc::clone(&season);
            let source = Arc::clone(&self.source);
            let settings = self.settings.clone();
            let overlays = request.overlays.clone();

            tasks.spawn(async move {
                let rows = fetch_region(source, &season, region, now).await;
                compute_region(&season, region, rows, eval, &overlays, &settings)
            });
        }

        let mut regions = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    debug!("Region {} ready with {} days", result.region, result.series.len());
                    regions.insert(result.region, result);
                }
                Err(e) => error!("Region task failed: {:?}", e),
            }
        }

        for &region in &request.regions {
            regions.entry(region).or_insert_with(|| {
                compute_region(&season, region, Vec::new(), eval, &request.overlays, &self.settings)
            });
        }

        let freshness = derive_freshness(
            &FreshnessInput {
                season: &season,
                now,
                latest_per_region: regions
                    .values()
                    .map(|r| (r.region, r.latest_timestamp()))
                    .collect(),
                extrapolation_cutoff: as_of,
                overlays: &request.overlays,
            },
            &self.settings,
        );

        Ok(SeasonResponse {
            season: season.slug,
            now,
            extrapolation_cutoff: as_of,
            regions,
            freshness,
        })
    }
}

async fn fetch_region(
    source: Arc<dyn SnapshotSource>,
    season: &Season,
    region: Region,
    now: Timestamp,
) -> Vec<RawRow> {
    let from = match season.start(region) {
        Some(from) if season.has_started(region, now) => from,
        _ => {
            info!("{} has not started in {}", season.slug, region);
            return Vec::new();
        }
    };
    let to = season.end(region).map_or(now, |end| end.min(now));

    match tokio::task::spawn_blocking(move || source.fetch_rows(region, from, to)).await {
        Ok(Ok(rows)) => {
            info!("Fetched {} rows for {} {}", rows.len(), season.slug, region);
            rows
        }
        Ok(Err(e)) => {
            warn!("Fetching {} {} failed: {:#}", season.slug, region, e);
            Vec::new()
        }
        Err(e) => {
            warn!("Fetch task for {} {} failed: {:?}", season.slug, region, e);
            Vec::new()
        }
    }
}
