use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::dedup::group_by_faction;
use crate::domain::{AffixSet, Dataset, FactionKey, Field, Region, Season, Timestamp, WEEK_MS};

/// Where a point in time falls in a season's repeating weekly schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPosition {
    /// Whole weeks since the region's start
    pub weeks_passed: u64,
    /// Index into the schedule
    pub slot: usize,
    /// Completed passes through the schedule
    pub cycle: u64,
}

impl WeekPosition {
    /// 1 for the first time a slot comes up, 2 for its first repeat, and so on
    pub fn occurrence(&self) -> u64 {
        self.cycle + 1
    }
}

/// Locate `eval` in a schedule of `schedule_len` weeks starting at `start`.
///
/// Once the season has ended (`end <= eval`) the position is pinned to the
/// week holding the season's final instant, so it stays put after data stops
/// flowing. Returns `None` before the start or for an empty schedule.
pub fn week_position(
    start: Timestamp,
    end: Option<Timestamp>,
    eval: Timestamp,
    schedule_len: usize,
) -> Option<WeekPosition> {
    if schedule_len == 0 {
        return None;
    }

    let effective = match end {
        Some(end) if end <= eval => end - 1,
        _ => eval,
    };

    if effective < start {
        return None;
    }

    let weeks_passed = (effective.saturating_sub(start) / WEEK_MS) as u64;
    let len = schedule_len as u64;

    Some(WeekPosition {
        weeks_passed,
        slot: (weeks_passed % len) as usize,
        cycle: weeks_passed / len,
    })
}

/// `[start, end)` of the given week
pub fn week_interval(season_start: Timestamp, week: u64) -> (Timestamp, Timestamp) {
    let offset = i64::try_from(week).unwrap_or(i64::MAX).saturating_mul(WEEK_MS);
    let from = season_start.saturating_add(offset);
    (from, from.saturating_add(WEEK_MS))
}

/// Score change across `[from, to)` of one faction's ascending series.
///
/// Uses the first sample at or after `from` and the last sample before `to`;
/// zero when either is missing.
pub fn week_delta(series: &[Dataset], from: Timestamp, to: Timestamp) -> f64 {
    let first = series
        .iter()
        .filter(|d| d.timestamp >= from)
        .find_map(|d| d.value(Field::Score).map(|v| (d.timestamp, v)));
    let last = series
        .iter()
        .rev()
        .filter(|d| d.timestamp < to)
        .find_map(|d| d.value(Field::Score).map(|v| (d.timestamp, v)));

    match (first, last) {
        (Some((first_ts, first_value)), Some((last_ts, last_value))) if first_ts <= last_ts => {
            last_value - first_value
        }
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionDelta {
    pub faction: FactionKey,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(flatten)]
    pub position: WeekPosition,
    pub occurrence: u64,
    pub affixes: AffixSet,
    pub current: bool,
    pub deltas: Vec<FactionDelta>,
}

/// Per-week score deltas of a region's series, keyed by week index.
///
/// Covers every week that holds a sample plus the week holding `now` (or the
/// last week of an ended season). Weeks without samples are left out.
pub fn weekly_summaries(
    season: &Season,
    region: Region,
    series: &[Dataset],
    now: Timestamp,
) -> BTreeMap<u64, WeekSummary> {
    let Some(start) = season.start(region) else {
        return BTreeMap::new();
    };
    let Some(current) = week_position(start, season.end(region), now, season.schedule_len())
    else {
        return BTreeMap::new();
    };

    let groups = group_by_faction(series);

    let mut weeks: BTreeSet<u64> = series
        .iter()
        .filter_map(|d| week_position(start, None, d.timestamp, season.schedule_len()))
        .map(|position| position.weeks_passed)
        .filter(|&week| week <= current.weeks_passed)
        .collect();
    weeks.insert(current.weeks_passed);

    weeks
        .into_iter()
        .filter_map(|week| {
            let (from, to) = week_interval(start, week);
            let position = week_position(start, None, from, season.schedule_len())?;
            let affixes = season.affix_schedule.get(position.slot)?.clone();

            let deltas = groups
                .iter()
                .map(|(faction, group)| FactionDelta {
                    faction: *faction,
                    delta: week_delta(group, from, to),
                })
                .collect();

            Some((
                week,
                WeekSummary {
                    start: from,
                    end: to,
                    position,
                    occurrence: position.occurrence(),
                    affixes,
                    current: week == current.weeks_passed,
                    deltas,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Affix, CrossFactionSupport, DAY_MS, Faction, RegionMap, SeasonSlug};

    const START: Timestamp = 1_700_000_000_000;

    fn position(weeks_passed: u64, slot: usize, cycle: u64) -> Option<WeekPosition> {
        Some(WeekPosition { weeks_passed, slot, cycle })
    }

    #[test]
    fn test_position_within_first_cycle() {
        assert_eq!(week_position(START, None, START, 3), position(0, 0, 0));
        assert_eq!(week_position(START, None, START + WEEK_MS - 1, 3), position(0, 0, 0));
        assert_eq!(week_position(START, None, START + WEEK_MS, 3), position(1, 1, 0));
        assert_eq!(week_position(START, None, START + 3 * WEEK_MS - 1, 3), position(2, 2, 0));
    }

    #[test]
    fn test_position_rolls_over_cycles() {
        let slots: Vec<Option<WeekPosition>> = (0..8)
            .map(|week| week_position(START, None, START + week * WEEK_MS + DAY_MS, 3))
            .collect();

        assert_eq!(
            slots,
            vec![
                position(0, 0, 0),
                position(1, 1, 0),
                position(2, 2, 0),
                position(3, 0, 1),
                position(4, 1, 1),
                position(5, 2, 1),
                position(6, 0, 2),
                position(7, 1, 2),
            ]
        );
    }

    #[test]
    fn test_occurrence_distinguishes_repeats() {
        let first = week_position(START, None, START + WEEK_MS, 3).unwrap();
        let third = week_position(START, None, START + 7 * WEEK_MS, 3).unwrap();

        assert_eq!(first.slot, third.slot);
        assert_eq!(first.occurrence(), 1);
        assert_eq!(third.occurrence(), 3);
    }

    #[test]
    fn test_ended_season_pins_to_final_week() {
        let end = START + 4 * WEEK_MS + DAY_MS;
        let expected = position(4, 1, 1);

        assert_eq!(week_position(START, Some(end), end, 3), expected);
        assert_eq!(week_position(START, Some(end), end + 20 * WEEK_MS, 3), expected);
    }

    #[test]
    fn test_end_on_week_boundary_keeps_previous_week() {
        let end = START + 6 * WEEK_MS;
        assert_eq!(week_position(START, Some(end), end + DAY_MS, 3), position(5, 2, 1));
    }

    #[test]
    fn test_future_end_does_not_pin() {
        let end = START + 10 * WEEK_MS;
        assert_eq!(week_position(START, Some(end), START + WEEK_MS, 3), position(1, 1, 0));
    }

    #[test]
    fn test_no_position_before_start_or_without_schedule() {
        assert_eq!(week_position(START, None, START - 1, 3), None);
        assert_eq!(week_position(START, None, START, 0), None);
    }

    fn sample(timestamp: Timestamp, faction: FactionKey, score: f64) -> Dataset {
        Dataset {
            timestamp,
            region: Region::Us,
            faction,
            score,
            rank: None,
        }
    }

    #[test]
    fn test_week_delta_uses_boundary_samples() {
        let series = vec![
            sample(START - DAY_MS, None, 50.0),
            sample(START + DAY_MS, None, 100.0),
            sample(START + 3 * DAY_MS, None, 140.0),
            sample(START + 6 * DAY_MS, None, 180.0),
            sample(START + WEEK_MS, None, 500.0),
        ];

        assert_eq!(week_delta(&series, START, START + WEEK_MS), 80.0);
    }

    #[test]
    fn test_week_delta_missing_boundary_is_zero() {
        let after_only = vec![sample(START + 2 * WEEK_MS, None, 100.0)];
        assert_eq!(week_delta(&after_only, START, START + WEEK_MS), 0.0);

        let before_only = vec![sample(START - DAY_MS, None, 100.0)];
        assert_eq!(week_delta(&before_only, START, START + WEEK_MS), 0.0);

        assert_eq!(week_delta(&[], START, START + WEEK_MS), 0.0);
    }

    fn season() -> Season {
        Season {
            slug: SeasonSlug::SlSeason4,
            start_dates: RegionMap::splat(Some(START)),
            end_dates: RegionMap::splat(None),
            affix_schedule: vec![
                vec![Affix::Tyrannical, Affix::Bolstering, Affix::Explosive, Affix::Shrouded],
                vec![Affix::Fortified, Affix::Bursting, Affix::Storming, Affix::Shrouded],
            ],
            cross_faction_support: CrossFactionSupport::Unsupported,
            confirmed_cutoffs: Vec::new(),
        }
    }

    #[test]
    fn test_weekly_summaries_per_faction() {
        let series = vec![
            sample(START + DAY_MS, Some(Faction::Alliance), 100.0),
            sample(START + DAY_MS, Some(Faction::Horde), 110.0),
            sample(START + 5 * DAY_MS, Some(Faction::Alliance), 160.0),
            sample(START + 5 * DAY_MS, Some(Faction::Horde), 150.0),
            sample(START + WEEK_MS + DAY_MS, Some(Faction::Alliance), 170.0),
        ];
        let now = START + 2 * WEEK_MS + DAY_MS;

        let summaries = weekly_summaries(&season(), Region::Us, &series, now);

        assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

        let first = &summaries[&0];
        assert_eq!(
            first.deltas,
            vec![
                FactionDelta { faction: Some(Faction::Alliance), delta: 60.0 },
                FactionDelta { faction: Some(Faction::Horde), delta: 40.0 },
            ]
        );
        assert!(!first.current);

        // a single alliance sample and no horde sample in week 1
        assert!(summaries[&1].deltas.iter().all(|d| d.delta == 0.0));

        let third = &summaries[&2];
        assert!(third.current);
        assert_eq!(third.position.slot, 0);
        assert_eq!(third.occurrence, 2);
        assert_eq!(third.affixes[0], Affix::Tyrannical);
    }

    #[test]
    fn test_weekly_summaries_skip_weeks_without_samples() {
        let series = vec![
            sample(START + DAY_MS, None, 100.0),
            sample(START + 3 * WEEK_MS + DAY_MS, None, 200.0),
        ];
        let now = START + 6 * WEEK_MS;

        let summaries = weekly_summaries(&season(), Region::Us, &series, now);

        assert_eq!(summaries.keys().copied().collect::<Vec<_>>(), vec![0, 3, 6]);
        assert!(summaries[&6].current);
        assert!(summaries[&6].deltas.iter().all(|d| d.delta == 0.0));
    }

    #[test]
    fn test_far_future_evaluation_stays_bounded() {
        let series = vec![sample(START + DAY_MS, None, 100.0)];

        let summaries = weekly_summaries(&season(), Region::Us, &series, i64::MAX);

        assert_eq!(summaries.len(), 2);
        let (_, last) = summaries.iter().next_back().unwrap();
        assert!(last.current);
        assert!(last.start <= last.end);
        assert_eq!(week_interval(START, u64::MAX).1, i64::MAX);
    }

    #[test]
    fn test_weekly_summaries_before_start_are_empty() {
        assert!(weekly_summaries(&season(), Region::Us, &[], START - 1).is_empty());

        let mut unstarted = season();
        unstarted.start_dates = RegionMap::splat(None);
        assert!(weekly_summaries(&unstarted, Region::Us, &[], START).is_empty());
    }
}
