use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::models::{FactionKey, Region, RegionMap, Timestamp};
use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeasonSlug {
    #[serde(rename = "sl-season-4")]
    SlSeason4,
    #[serde(rename = "df-season-1")]
    DfSeason1,
    #[serde(rename = "df-season-2")]
    DfSeason2,
    #[serde(rename = "df-season-3")]
    DfSeason3,
}

impl SeasonSlug {
    pub const ALL: [SeasonSlug; 4] = [
        SeasonSlug::SlSeason4,
        SeasonSlug::DfSeason1,
        SeasonSlug::DfSeason2,
        SeasonSlug::DfSeason3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonSlug::SlSeason4 => "sl-season-4",
            SeasonSlug::DfSeason1 => "df-season-1",
            SeasonSlug::DfSeason2 => "df-season-2",
            SeasonSlug::DfSeason3 => "df-season-3",
        }
    }
}

impl fmt::Display for SeasonSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonSlug {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeasonSlug::ALL
            .into_iter()
            .find(|slug| slug.as_str() == s)
            .ok_or_else(|| EngineError::UnknownSeason(s.to_string()))
    }
}

/// Weekly dungeon modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affix {
    Fortified,
    Tyrannical,
    Afflicted,
    Bolstering,
    Bursting,
    Encrypted,
    Entangling,
    Explosive,
    Grievous,
    Incorporeal,
    Inspiring,
    Necrotic,
    Quaking,
    Raging,
    Sanguine,
    Shrouded,
    Spiteful,
    Storming,
    Thundering,
    Volcanic,
}

/// Modifiers active during one week, three or four of them
pub type AffixSet = Vec<Affix>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CrossFactionSupport {
    /// Every sample carries a faction
    #[serde(rename = "none")]
    Unsupported,
    /// No sample carries a faction
    Complete,
    /// Faction-tagged until `cutover`, merged afterwards
    Partial { cutover: Timestamp },
}

/// Authoritative end-of-season score, replaces any projection once known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedCutoff {
    pub region: Region,
    #[serde(default)]
    pub faction: FactionKey,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub slug: SeasonSlug,
    pub start_dates: RegionMap<Option<Timestamp>>,
    pub end_dates: RegionMap<Option<Timestamp>>,
    pub affix_schedule: Vec<AffixSet>,
    pub cross_faction_support: CrossFactionSupport,
    #[serde(default)]
    pub confirmed_cutoffs: Vec<ConfirmedCutoff>,
}

impl Season {
    pub fn start(&self, region: Region) -> Option<Timestamp> {
        *self.start_dates.get(region)
    }

    pub fn end(&self, region: Region) -> Option<Timestamp> {
        *self.end_dates.get(region)
    }

    pub fn has_started(&self, region: Region, now: Timestamp) -> bool {
        self.start(region).is_some_and(|start| start <= now)
    }

    pub fn has_ended(&self, region: Region, now: Timestamp) -> bool {
        self.end(region).is_some_and(|end| end <= now)
    }

    pub fn schedule_len(&self) -> usize {
        self.affix_schedule.len()
    }

    /// Whether a sample taken at `timestamp` is tracked per faction
    pub fn tracks_factions_at(&self, timestamp: Timestamp) -> bool {
        match self.cross_faction_support {
            CrossFactionSupport::Unsupported => true,
            CrossFactionSupport::Complete => false,
            CrossFactionSupport::Partial { cutover } => timestamp < cutover,
        }
    }

    pub fn confirmed_cutoff(&self, region: Region, faction: FactionKey) -> Option<f64> {
        self.confirmed_cutoffs
            .iter()
            .find(|cutoff| cutoff.region == region && cutoff.faction == faction)
            .map(|cutoff| cutoff.score)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.affix_schedule.is_empty() {
            return Err(EngineError::InvalidSchedule(self.slug.to_string()));
        }
        Ok(())
    }
}

/// Immutable season configuration, keyed by slug
#[derive(Debug, Clone)]
pub struct SeasonTable {
    seasons: BTreeMap<SeasonSlug, Season>,
}

impl SeasonTable {
    pub fn new(seasons: Vec<Season>) -> Result<Self, EngineError> {
        for season in &seasons {
            season.validate()?;
        }

        Ok(Self {
            seasons: seasons.into_iter().map(|s| (s.slug, s)).collect(),
        })
    }

    /// Load a table from a JSON array of seasons
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read season table {}", path.display()))?;
        let seasons: Vec<Season> =
            serde_json::from_str(&json).context("Failed to parse season table")?;

        Ok(Self::new(seasons)?)
    }

    pub fn get(&self, slug: SeasonSlug) -> Result<&Season, EngineError> {
        self.seasons
            .get(&slug)
            .ok_or_else(|| EngineError::UnknownSeason(slug.to_string()))
    }

    pub fn resolve(&self, slug: &str) -> Result<&Season, EngineError> {
        self.get(slug.parse()?)
    }

    pub fn slugs(&self) -> Vec<SeasonSlug> {
        self.seasons.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Faction;

    fn season(cross_faction_support: CrossFactionSupport) -> Season {
        Season {
            slug: SeasonSlug::DfSeason1,
            start_dates: RegionMap::splat(Some(1_000)),
            end_dates: RegionMap {
                us: Some(5_000),
                eu: None,
                kr: None,
                tw: None,
            },
            affix_schedule: vec![vec![Affix::Fortified, Affix::Raging, Affix::Quaking]],
            cross_faction_support,
            confirmed_cutoffs: vec![ConfirmedCutoff {
                region: Region::Us,
                faction: Some(Faction::Horde),
                score: 3400.0,
            }],
        }
    }

    #[test]
    fn test_partial_cross_faction_cutover() {
        let partial = season(CrossFactionSupport::Partial { cutover: 2_000 });
        assert!(partial.tracks_factions_at(1_999));
        assert!(!partial.tracks_factions_at(2_000));
        assert!(season(CrossFactionSupport::Unsupported).tracks_factions_at(9_999));
        assert!(!season(CrossFactionSupport::Complete).tracks_factions_at(0));
    }

    #[test]
    fn test_season_end_is_per_region() {
        let season = season(CrossFactionSupport::Complete);
        assert!(season.has_ended(Region::Us, 5_000));
        assert!(!season.has_ended(Region::Us, 4_999));
        assert!(!season.has_ended(Region::Eu, i64::MAX));
    }

    #[test]
    fn test_confirmed_cutoff_lookup() {
        let season = season(CrossFactionSupport::Unsupported);
        assert_eq!(season.confirmed_cutoff(Region::Us, Some(Faction::Horde)), Some(3400.0));
        assert_eq!(season.confirmed_cutoff(Region::Us, Some(Faction::Alliance)), None);
        assert_eq!(season.confirmed_cutoff(Region::Eu, Some(Faction::Horde)), None);
    }

    #[test]
    fn test_table_rejects_empty_schedule() {
        let mut broken = season(CrossFactionSupport::Complete);
        broken.affix_schedule.clear();
        assert_eq!(
            SeasonTable::new(vec![broken]).unwrap_err(),
            EngineError::InvalidSchedule("df-season-1".to_string())
        );
    }

    #[test]
    fn test_table_resolve_unknown_slug() {
        let table = SeasonTable::new(vec![season(CrossFactionSupport::Complete)]).unwrap();
        assert!(table.resolve("df-season-1").is_ok());
        assert_eq!(
            table.resolve("df-season-2").unwrap_err(),
            EngineError::UnknownSeason("df-season-2".to_string())
        );
        assert_eq!(
            table.resolve("bogus").unwrap_err(),
            EngineError::UnknownSeason("bogus".to_string())
        );
    }

    #[test]
    fn test_season_json_round_trip_shape() {
        let json = serde_json::json!({
            "slug": "df-season-1",
            "startDates": { "us": 1000, "eu": 1000, "kr": null, "tw": null },
            "endDates": { "us": null, "eu": null, "kr": null, "tw": null },
            "affixSchedule": [["tyrannical", "bursting", "grievous", "thundering"]],
            "crossFactionSupport": { "type": "partial", "cutover": 2000 }
        });
        let season: Season = serde_json::from_value(json).unwrap();
        assert_eq!(season.start(Region::Kr), None);
        assert_eq!(season.cross_faction_support, CrossFactionSupport::Partial { cutover: 2000 });
        assert!(season.confirmed_cutoffs.is_empty());
    }
}
