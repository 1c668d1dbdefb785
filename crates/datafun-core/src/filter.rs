//! Region + date-range filtering for the analysis view.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use datafun_common::{Record, Region};
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, EPOCH};

/// Lowest date the analysis form offers.
pub const WINDOW_START: NaiveDate = EPOCH;

/// Highest date the analysis form offers (day 100 of the default dataset).
pub const WINDOW_END: NaiveDate = match NaiveDate::from_ymd_opt(2023, 4, 10) {
    Some(date) => date,
    None => panic!("invalid window end"),
};

/// Which records the analysis view keeps. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub regions: BTreeSet<Region>,
    pub date_lo: NaiveDate,
    pub date_hi: NaiveDate,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            regions: [Region::East, Region::South].into_iter().collect(),
            date_lo: WINDOW_START,
            date_hi: WINDOW_END,
        }
    }
}

impl FilterCriteria {
    pub fn new(regions: impl IntoIterator<Item = Region>, date_lo: NaiveDate, date_hi: NaiveDate) -> Self {
        Self {
            regions: regions.into_iter().collect(),
            date_lo,
            date_hi,
        }
    }

    /// Build criteria from raw form input, falling back to the defaults for
    /// missing dates and clamping both bounds into the selectable window.
    pub fn from_input(
        regions: impl IntoIterator<Item = Region>,
        date_lo: Option<NaiveDate>,
        date_hi: Option<NaiveDate>,
    ) -> Self {
        let clamp = |d: NaiveDate| d.clamp(WINDOW_START, WINDOW_END);
        Self::new(
            regions,
            clamp(date_lo.unwrap_or(WINDOW_START)),
            clamp(date_hi.unwrap_or(WINDOW_END)),
        )
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.regions.contains(&record.region)
            && self.date_lo <= record.date
            && record.date <= self.date_hi
    }
}

/// Keep the records matching `criteria`, in their original order.
/// An inverted date range yields nothing.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<Record> {
    if criteria.date_lo > criteria.date_hi {
        return Vec::new();
    }
    dataset
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Records per region, most frequent first. Ties keep region order.
pub fn region_counts(records: &[Record]) -> Vec<(Region, usize)> {
    let mut counts: Vec<(Region, usize)> = Region::ALL
        .iter()
        .map(|&region| (region, records.iter().filter(|r| r.region == region).count()))
        .filter(|&(_, count)| count > 0)
        .collect();
    // sort_by is stable, so equal counts stay in Region::ALL order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate;
    use chrono::Days;

    fn day(offset: u64) -> NaiveDate {
        EPOCH + Days::new(offset)
    }

    fn record(offset: u64, region: Region) -> Record {
        Record {
            date: day(offset),
            sales: 1000.0 + offset as f64,
            visits: 100,
            conversion_rate: 0.05,
            region,
        }
    }

    #[test]
    fn test_filter_keeps_only_matching_records_in_order() {
        let ds = generate(100).unwrap();
        let criteria = FilterCriteria::new([Region::East, Region::West], day(10), day(60));
        let out = filter(&ds, &criteria);

        assert!(!out.is_empty());
        for r in &out {
            assert!(criteria.regions.contains(&r.region));
            assert!(r.date >= day(10) && r.date <= day(60));
        }
        for pair in out.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        let expected = ds.records().iter().filter(|r| criteria.matches(r)).count();
        assert_eq!(out.len(), expected);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let ds = generate(100).unwrap();
        let criteria = FilterCriteria::new(Region::ALL, day(30), day(5));
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn test_single_day_east_filter() {
        let ds = generate(100).unwrap();
        let criteria = FilterCriteria::new([Region::East], EPOCH, EPOCH);
        let out = filter(&ds, &criteria);
        assert!(out.len() <= 1);
        assert_eq!(out.len() == 1, ds.records()[0].region == Region::East);
    }

    #[test]
    fn test_empty_region_set_matches_nothing() {
        let ds = generate(50).unwrap();
        let criteria = FilterCriteria::new(Vec::<Region>::new(), WINDOW_START, WINDOW_END);
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn test_from_input_clamps_to_window() {
        let before = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let c = FilterCriteria::from_input([Region::North], Some(before), Some(after));
        assert_eq!(c.date_lo, WINDOW_START);
        assert_eq!(c.date_hi, WINDOW_END);

        let c = FilterCriteria::from_input([Region::North], None, None);
        assert_eq!(c.date_lo, WINDOW_START);
        assert_eq!(c.date_hi, WINDOW_END);
    }

    #[test]
    fn test_default_criteria() {
        let c = FilterCriteria::default();
        assert_eq!(c.regions.len(), 2);
        assert!(c.regions.contains(&Region::East) && c.regions.contains(&Region::South));
        assert_eq!(WINDOW_END, day(99));
    }

    #[test]
    fn test_region_counts_sorted_descending() {
        let records = vec![
            record(0, Region::West),
            record(1, Region::East),
            record(2, Region::West),
            record(3, Region::North),
            record(4, Region::East),
            record(5, Region::West),
        ];
        let counts = region_counts(&records);
        assert_eq!(
            counts,
            vec![(Region::West, 3), (Region::East, 2), (Region::North, 1)]
        );
    }
}
