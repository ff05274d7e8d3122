//! Per-group category tallies.

use serde::{Deserialize, Serialize};
use wx_common::FlightCategory;

use crate::AirportInfo;

/// Count of members in each known flight category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub lifr: usize,
    pub ifr: usize,
    pub mvfr: usize,
    pub vfr: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: FlightCategory) -> usize {
        match category {
            FlightCategory::Lifr => self.lifr,
            FlightCategory::Ifr => self.ifr,
            FlightCategory::Mvfr => self.mvfr,
            FlightCategory::Vfr => self.vfr,
            FlightCategory::Unknown => 0,
        }
    }

    pub fn add(&mut self, category: FlightCategory) {
        match category {
            FlightCategory::Lifr => self.lifr += 1,
            FlightCategory::Ifr => self.ifr += 1,
            FlightCategory::Mvfr => self.mvfr += 1,
            FlightCategory::Vfr => self.vfr += 1,
            FlightCategory::Unknown => {}
        }
    }

    pub fn total(&self) -> usize {
        self.lifr + self.ifr + self.mvfr + self.vfr
    }
}

/// Tally known categories; unknown members are not counted.
pub fn count_categories(members: &[AirportInfo]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for member in members {
        counts.add(member.category);
    }
    counts
}

/// `"1 IFR | 5 VFR"`: non-zero counts, most restrictive first.
pub fn summary_line(counts: &CategoryCounts) -> String {
    FlightCategory::KNOWN
        .iter()
        .filter_map(|&c| match counts.get(c) {
            0 => None,
            n => Some(format!("{} {}", n, c)),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
