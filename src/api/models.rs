use serde::Serialize;

use crate::domain::{CrossFactionSupport, RegionMap, Season, SeasonSlug, Timestamp};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonListItem {
    pub slug: SeasonSlug,
    pub start_dates: RegionMap<Option<Timestamp>>,
    pub end_dates: RegionMap<Option<Timestamp>>,
    pub schedule_weeks: usize,
    pub cross_faction_support: CrossFactionSupport,
}

impl From<&Season> for SeasonListItem {
    fn from(season: &Season) -> Self {
        Self {
            slug: season.slug,
            start_dates: season.start_dates.clone(),
            end_dates: season.end_dates.clone(),
            schedule_weeks: season.schedule_len(),
            cross_faction_support: season.cross_faction_support,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonListResponse {
    pub items: Vec<SeasonListItem>,
    pub total: usize,
}
