use anyhow::Result;
use log::info;

use super::settings::ServerSettings;
use crate::domain::{
    Affix::*, AffixSet, CrossFactionSupport, RegionMap, Season, SeasonSlug, SeasonTable, Timestamp,
};

/// Built-in season table. Every known slug has exactly one entry.
pub fn get_seasons() -> Vec<Season> {
    SeasonSlug::ALL.into_iter().map(build_season).collect()
}

/// Season table used by the process: the JSON override if configured, the built-in one otherwise
pub fn load_season_table(settings: &ServerSettings) -> Result<SeasonTable> {
    match &settings.seasons_path {
        Some(path) => {
            info!("Loading season table from {}", path);
            SeasonTable::from_json_file(path)
        }
        None => Ok(SeasonTable::new(get_seasons())?),
    }
}

fn build_season(slug: SeasonSlug) -> Season {
    match slug {
        SeasonSlug::SlSeason4 => Season {
            slug,
            // 2022-08-02 / 2022-08-03
            start_dates: dates(1659452400000, 1659499200000, 1659567600000),
            // 2022-10-24 / 2022-10-25
            end_dates: dates(1666623600000, 1666670400000, 1666738800000),
            affix_schedule: vec![
                vec![Tyrannical, Bolstering, Explosive, Shrouded],
                vec![Fortified, Bursting, Storming, Shrouded],
                vec![Tyrannical, Raging, Volcanic, Shrouded],
                vec![Fortified, Inspiring, Grievous, Shrouded],
                vec![Tyrannical, Spiteful, Necrotic, Shrouded],
                vec![Fortified, Bolstering, Quaking, Shrouded],
                vec![Tyrannical, Sanguine, Grievous, Shrouded],
                vec![Fortified, Raging, Explosive, Shrouded],
            ],
            cross_faction_support: CrossFactionSupport::Unsupported,
            confirmed_cutoffs: Vec::new(),
        },
        SeasonSlug::DfSeason1 => Season {
            slug,
            // 2022-12-13 / 2022-12-14
            start_dates: dates(1670943600000, 1670990400000, 1671058800000),
            // 2023-05-09 / 2023-05-10
            end_dates: dates(1683644400000, 1683691200000, 1683759600000),
            affix_schedule: vec![
                vec![Fortified, Raging, Quaking, Thundering],
                vec![Tyrannical, Bursting, Grievous, Thundering],
                vec![Fortified, Sanguine, Volcanic, Thundering],
                vec![Tyrannical, Raging, Storming, Thundering],
                vec![Fortified, Spiteful, Grievous, Thundering],
                vec![Tyrannical, Sanguine, Explosive, Thundering],
                vec![Fortified, Bolstering, Storming, Thundering],
                vec![Tyrannical, Spiteful, Quaking, Thundering],
                vec![Fortified, Bursting, Explosive, Thundering],
                vec![Tyrannical, Bolstering, Volcanic, Thundering],
            ],
            // 2023-01-31, cross-faction ladders went live mid-season
            cross_faction_support: CrossFactionSupport::Partial {
                cutover: 1675177200000,
            },
            confirmed_cutoffs: Vec::new(),
        },
        SeasonSlug::DfSeason2 => Season {
            slug,
            // 2023-05-09 / 2023-05-10
            start_dates: dates(1683644400000, 1683691200000, 1683759600000),
            // 2023-11-06 / 2023-11-07
            end_dates: dates(1699282800000, 1699329600000, 1699398000000),
            affix_schedule: dragonflight_rotation(0),
            cross_faction_support: CrossFactionSupport::Complete,
            confirmed_cutoffs: Vec::new(),
        },
        SeasonSlug::DfSeason3 => Season {
            slug,
            // 2023-11-14 / 2023-11-15
            start_dates: dates(1699974000000, 1700020800000, 1700089200000),
            // 2024-04-22 / 2024-04-23
            end_dates: dates(1713798000000, 1713844800000, 1713913200000),
            affix_schedule: dragonflight_rotation(7),
            cross_faction_support: CrossFactionSupport::Complete,
            confirmed_cutoffs: Vec::new(),
        },
    }
}

/// KR and TW share a start time
fn dates(us: Timestamp, eu: Timestamp, asia: Timestamp) -> RegionMap<Option<Timestamp>> {
    RegionMap {
        us: Some(us),
        eu: Some(eu),
        kr: Some(asia),
        tw: Some(asia),
    }
}

/// The ten-week rotation shared by later Dragonflight seasons, starting at `offset`
fn dragonflight_rotation(offset: usize) -> Vec<AffixSet> {
    let rotation: [AffixSet; 10] = [
        vec![Tyrannical, Storming, Raging],
        vec![Fortified, Entangling, Bolstering],
        vec![Tyrannical, Incorporeal, Spiteful],
        vec![Fortified, Afflicted, Raging],
        vec![Tyrannical, Volcanic, Sanguine],
        vec![Fortified, Storming, Bursting],
        vec![Tyrannical, Afflicted, Bolstering],
        vec![Fortified, Incorporeal, Sanguine],
        vec![Tyrannical, Entangling, Bursting],
        vec![Fortified, Volcanic, Spiteful],
    ];

    let mut schedule = rotation.to_vec();
    schedule.rotate_left(offset % rotation.len());
    schedule
}
