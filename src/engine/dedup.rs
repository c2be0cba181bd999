use std::collections::HashMap;

use crate::domain::{DAY_MS, Dataset, FactionKey, Field, Region, Timestamp};

type GroupKey = (Region, FactionKey);

/// UTC calendar day index of a millisecond timestamp
pub fn utc_day(timestamp: Timestamp) -> i64 {
    timestamp.div_euclid(DAY_MS)
}

/// Collapse the samples of every (region, faction, UTC day) into the latest one.
///
/// Input may be in any order. Equal timestamps on the same day resolve to the
/// sample seen last. A zero-sentinel score or rank on the kept sample is filled
/// from the newest earlier sample of that day that has one. Output is ascending
/// by timestamp.
pub fn dedupe_by_day(mut datasets: Vec<Dataset>) -> Vec<Dataset> {
    datasets.sort_by_key(|d| d.timestamp);

    let mut accepted: HashMap<GroupKey, HashMap<i64, usize>> = HashMap::new();
    let mut deduped: Vec<Dataset> = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        let days = accepted.entry((dataset.region, dataset.faction)).or_default();
        let day = utc_day(dataset.timestamp);

        match days.get(&day) {
            Some(&idx) => {
                deduped[idx] = fill_sentinels(dataset, &deduped[idx]);
            }
            None => {
                days.insert(day, deduped.len());
                deduped.push(dataset);
            }
        }
    }

    deduped.sort_by_key(|d| d.timestamp);
    deduped
}

fn fill_sentinels(mut newer: Dataset, older: &Dataset) -> Dataset {
    if newer.value(Field::Score).is_none() {
        newer.score = older.score;
    }
    if newer.value(Field::Rank).is_none() {
        newer.rank = older.rank;
    }
    newer
}

/// Split an ascending series into its faction groups, each still ascending
pub fn group_by_faction(series: &[Dataset]) -> Vec<(FactionKey, Vec<Dataset>)> {
    let mut groups: Vec<(FactionKey, Vec<Dataset>)> = Vec::new();

    for dataset in series {
        match groups.iter_mut().find(|(key, _)| *key == dataset.faction) {
            Some((_, group)) => group.push(dataset.clone()),
            None => groups.push((dataset.faction, vec![dataset.clone()])),
        }
    }

    groups.sort_by_key(|(key, _)| *key);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Faction;
    use std::collections::BTreeSet;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn dataset(timestamp: i64, faction: FactionKey, score: f64) -> Dataset {
        Dataset {
            timestamp,
            region: Region::Eu,
            faction,
            score,
            rank: None,
        }
    }

    fn messy_input() -> Vec<Dataset> {
        vec![
            dataset(2 * DAY_MS + 5 * HOUR_MS, Some(Faction::Horde), 30.0),
            dataset(3 * HOUR_MS, Some(Faction::Alliance), 10.0),
            dataset(DAY_MS + HOUR_MS, Some(Faction::Alliance), 12.0),
            dataset(9 * HOUR_MS, Some(Faction::Alliance), 11.0),
            dataset(2 * DAY_MS + HOUR_MS, Some(Faction::Horde), 29.0),
            dataset(DAY_MS - 1, Some(Faction::Horde), 5.0),
            dataset(DAY_MS, Some(Faction::Horde), 6.0),
        ]
    }

    #[test]
    fn test_keeps_latest_sample_of_the_day() {
        let deduped = dedupe_by_day(vec![
            dataset(HOUR_MS, None, 10.0),
            dataset(2 * HOUR_MS, None, 20.0),
        ]);

        assert_eq!(deduped, vec![dataset(2 * HOUR_MS, None, 20.0)]);
    }

    #[test]
    fn test_latest_wins_regardless_of_input_order() {
        let deduped = dedupe_by_day(vec![
            dataset(2 * HOUR_MS, None, 20.0),
            dataset(HOUR_MS, None, 10.0),
        ]);

        assert_eq!(deduped, vec![dataset(2 * HOUR_MS, None, 20.0)]);
    }

    #[test]
    fn test_equal_timestamps_resolve_to_last_seen() {
        let deduped = dedupe_by_day(vec![
            dataset(HOUR_MS, None, 10.0),
            dataset(HOUR_MS, None, 15.0),
        ]);

        assert_eq!(deduped, vec![dataset(HOUR_MS, None, 15.0)]);
    }

    #[test]
    fn test_rank_only_sample_keeps_the_days_score() {
        let scored = Dataset { rank: Some(50), ..dataset(HOUR_MS, None, 2800.0) };
        let rank_only = Dataset { rank: Some(40), ..dataset(2 * HOUR_MS, None, 0.0) };
        let score_only = dataset(3 * HOUR_MS, None, 2810.0);

        let deduped = dedupe_by_day(vec![rank_only.clone(), scored.clone()]);
        assert_eq!(deduped, vec![Dataset { score: 2800.0, ..rank_only.clone() }]);

        let deduped = dedupe_by_day(vec![scored, rank_only, score_only.clone()]);
        assert_eq!(deduped, vec![Dataset { rank: Some(40), ..score_only }]);
    }

    #[test]
    fn test_day_boundary_is_utc_midnight() {
        let deduped = dedupe_by_day(vec![
            dataset(DAY_MS - 1, None, 1.0),
            dataset(DAY_MS, None, 2.0),
        ]);

        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_one_row_per_group_and_day() {
        let input = messy_input();
        let deduped = dedupe_by_day(input.clone());

        for faction in [Some(Faction::Alliance), Some(Faction::Horde)] {
            let expected: BTreeSet<i64> = input
                .iter()
                .filter(|d| d.faction == faction)
                .map(|d| utc_day(d.timestamp))
                .collect();
            let actual: Vec<i64> = deduped
                .iter()
                .filter(|d| d.faction == faction)
                .map(|d| utc_day(d.timestamp))
                .collect();

            assert_eq!(actual.len(), expected.len());
            assert_eq!(actual.into_iter().collect::<BTreeSet<_>>(), expected);
        }
    }

    #[test]
    fn test_output_is_ascending() {
        let deduped = dedupe_by_day(messy_input());
        assert!(deduped.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let once = dedupe_by_day(messy_input());
        let twice = dedupe_by_day(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_factions_are_kept_apart() {
        let deduped = dedupe_by_day(vec![
            dataset(HOUR_MS, Some(Faction::Alliance), 10.0),
            dataset(HOUR_MS, Some(Faction::Horde), 20.0),
            dataset(2 * HOUR_MS, None, 30.0),
        ]);

        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_by_day(Vec::new()).is_empty());
    }

    #[test]
    fn test_group_by_faction_orders_merged_group_first() {
        let groups = group_by_faction(&dedupe_by_day(vec![
            dataset(HOUR_MS, Some(Faction::Horde), 20.0),
            dataset(HOUR_MS, None, 5.0),
            dataset(2 * HOUR_MS, Some(Faction::Alliance), 10.0),
        ]));

        let keys: Vec<FactionKey> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![None, Some(Faction::Alliance), Some(Faction::Horde)]);
    }
}
