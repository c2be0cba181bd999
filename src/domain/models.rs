use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

pub const DAY_MS: Timestamp = 24 * 60 * 60 * 1000;
pub const WEEK_MS: Timestamp = 7 * DAY_MS;

/// Geographic partition of the ladder. Observations are never compared across regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Eu,
    Kr,
    Tw,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Us, Region::Eu, Region::Kr, Region::Tw];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Kr => "kr",
            Region::Tw => "tw",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "kr" => Ok(Region::Kr),
            "tw" => Ok(Region::Tw),
            _ => Err(EngineError::UnknownRegion(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Alliance,
    Horde,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Alliance => "alliance",
            Faction::Horde => "horde",
        }
    }
}

impl FromStr for Faction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alliance" => Ok(Faction::Alliance),
            "horde" => Ok(Faction::Horde),
            _ => Err(EngineError::UnknownFaction(s.to_string())),
        }
    }
}

/// `None` is the merged, cross-faction group
pub type FactionKey = Option<Faction>;

pub fn faction_key_name(faction: FactionKey) -> &'static str {
    faction.map(|f| f.as_str()).unwrap_or("xfaction")
}

/// One observation of the ladder at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub timestamp: Timestamp,
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: FactionKey,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl Dataset {
    /// Selected value, with the zero sentinel mapped to `None`
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Score if self.score > 0.0 => Some(self.score),
            Field::Score => None,
            Field::Rank => self.rank.filter(|&r| r > 0).map(f64::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Score,
    Rank,
}

/// Optional response sections a caller can switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    Rank,
    Affixes,
}

impl Overlay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Overlay::Rank => "rank",
            Overlay::Affixes => "affixes",
        }
    }
}

impl FromStr for Overlay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rank" => Ok(Overlay::Rank),
            "affixes" => Ok(Overlay::Affixes),
            _ => Err(EngineError::UnknownOverlay(s.to_string())),
        }
    }
}

/// A row as the snapshot store hands it over, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    pub timestamp: Timestamp,
    pub region: String,
    #[serde(default)]
    pub faction: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub rank: Option<i64>,
}

/// One value per region, every region always present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionMap<T> {
    pub us: T,
    pub eu: T,
    pub kr: T,
    pub tw: T,
}

impl<T> RegionMap<T> {
    pub fn get(&self, region: Region) -> &T {
        match region {
            Region::Us => &self.us,
            Region::Eu => &self.eu,
            Region::Kr => &self.kr,
            Region::Tw => &self.tw,
        }
    }

    pub fn get_mut(&mut self, region: Region) -> &mut T {
        match region {
            Region::Us => &mut self.us,
            Region::Eu => &mut self.eu,
            Region::Kr => &mut self.kr,
            Region::Tw => &mut self.tw,
        }
    }
}

impl<T: Clone> RegionMap<T> {
    pub fn splat(value: T) -> Self {
        Self {
            us: value.clone(),
            eu: value.clone(),
            kr: value.clone(),
            tw: value,
        }
    }
}
