/// Core entity types for the synthetic sales dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DatafunError;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    East,
    South,
    North,
    West,
    Northwest,
}

impl Region {
    /// Every region, in display order.
    pub const ALL: [Region; 5] = [
        Region::East,
        Region::South,
        Region::North,
        Region::West,
        Region::Northwest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::East      => "East",
            Region::South     => "South",
            Region::North     => "North",
            Region::West      => "West",
            Region::Northwest => "Northwest",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DatafunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DatafunError::InvalidArgument(format!("unknown region '{}'", s)))
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One day of synthetic sales activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub sales: f64,
    pub visits: u32,
    /// Fraction in [0, 1].
    pub conversion_rate: f64,
    pub region: Region,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parse_is_case_insensitive() {
        assert_eq!("northwest".parse::<Region>().unwrap(), Region::Northwest);
        assert_eq!(" East ".parse::<Region>().unwrap(), Region::East);
    }

    #[test]
    fn test_region_parse_rejects_unknown() {
        let err = "Central".parse::<Region>().unwrap_err();
        assert!(matches!(err, DatafunError::InvalidArgument(_)));
    }

    #[test]
    fn test_region_display_round_trips_labels() {
        for region in Region::ALL {
            assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
        }
    }
}
