//! AIRAC cycle arithmetic for versioning boundary caches.
//!
//! Aeronautical data is published on a fixed 28-day cycle. Cycle 2001
//! became effective on 2020-01-02; every other cycle is an integer number
//! of 28-day periods away from that date.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of one cycle in days.
pub const CYCLE_DAYS: i64 = 28;

fn epoch() -> NaiveDate {
    // 2020-01-02 is a valid date; from_ymd_opt only fails on impossible dates.
    NaiveDate::from_ymd_opt(2020, 1, 2).unwrap_or(NaiveDate::MIN)
}

/// One 28-day data-validity period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AiracCycle {
    effective: NaiveDate,
}

impl AiracCycle {
    /// The cycle in force on `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let days = (date - epoch()).num_days();
        let index = days.div_euclid(CYCLE_DAYS);
        Self {
            effective: epoch() + Duration::days(index * CYCLE_DAYS),
        }
    }

    /// The cycle in force today (UTC).
    pub fn current() -> Self {
        Self::containing(chrono::Utc::now().date_naive())
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective
    }

    /// First day after this cycle.
    pub fn expiry_date(&self) -> NaiveDate {
        self.effective + Duration::days(CYCLE_DAYS)
    }

    pub fn next(&self) -> Self {
        Self {
            effective: self.expiry_date(),
        }
    }

    /// Ordinal of this cycle within its effective year, starting at 1.
    pub fn number_in_year(&self) -> u32 {
        let year_start = NaiveDate::from_ymd_opt(self.effective.year(), 1, 1).unwrap_or(self.effective);
        let first = Self::containing(year_start);
        let first_effective = if first.effective < year_start {
            first.expiry_date()
        } else {
            first.effective
        };
        ((self.effective - first_effective).num_days() / CYCLE_DAYS) as u32 + 1
    }

    /// Conventional `YYNN` identifier, e.g. `2001`.
    pub fn ident(&self) -> String {
        format!("{:02}{:02}", self.effective.year() % 100, self.number_in_year())
    }

    /// Cache file name for ARTCC boundaries of this cycle.
    pub fn boundary_cache_file_name(&self) -> String {
        format!("artcc_boundaries_{}.json", self.effective.format("%Y-%m-%d"))
    }

    /// Parse the cycle back out of a cache file name.
    pub fn from_cache_file_name(name: &str) -> Option<Self> {
        let date = name
            .strip_prefix("artcc_boundaries_")?
            .strip_suffix(".json")?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(Self::containing(date))
    }
}

impl fmt::Display for AiracCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ident(), self.effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_cycle() {
        let cycle = AiracCycle::containing(date(2020, 1, 2));
        assert_eq!(cycle.effective_date(), date(2020, 1, 2));
        assert_eq!(cycle.ident(), "2001");
    }

    #[test]
    fn test_mid_cycle_date() {
        let cycle = AiracCycle::containing(date(2020, 1, 29));
        assert_eq!(cycle.effective_date(), date(2020, 1, 2));
        assert_eq!(cycle.next().effective_date(), date(2020, 1, 30));
        assert_eq!(cycle.next().ident(), "2002");
    }

    #[test]
    fn test_before_epoch() {
        let cycle = AiracCycle::containing(date(2019, 12, 31));
        assert_eq!(cycle.effective_date(), date(2019, 12, 5));
        assert_eq!(cycle.next().effective_date(), date(2020, 1, 2));
    }

    #[test]
    fn test_known_2024_cycle() {
        // AIRAC 2401 became effective 2024-01-25.
        let cycle = AiracCycle::containing(date(2024, 2, 1));
        assert_eq!(cycle.effective_date(), date(2024, 1, 25));
        assert_eq!(cycle.ident(), "2401");
    }

    #[test]
    fn test_cache_file_name_roundtrip() {
        let cycle = AiracCycle::containing(date(2024, 2, 1));
        let name = cycle.boundary_cache_file_name();
        assert_eq!(name, "artcc_boundaries_2024-01-25.json");
        assert_eq!(AiracCycle::from_cache_file_name(&name), Some(cycle));
        assert_eq!(AiracCycle::from_cache_file_name("other.json"), None);
    }
}
