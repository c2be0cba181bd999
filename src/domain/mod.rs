pub mod models;
pub mod season;

pub use models::{
    DAY_MS, Dataset, Faction, FactionKey, Field, Overlay, RawRow, Region, RegionMap, Timestamp,
    WEEK_MS, faction_key_name,
};
pub use season::{
    Affix, AffixSet, ConfirmedCutoff, CrossFactionSupport, Season, SeasonSlug, SeasonTable,
};
