//! Airport records as seen by the clusterer.

use serde::{Deserialize, Serialize};
use std::fmt;
use wx_common::{FlightCategory, GeoPoint};

/// Tower significance, lower is more significant.
///
/// The scale runs from 0 (tower co-located with a radar approach facility)
/// to 4 (unknown facility type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizePriority(u8);

impl SizePriority {
    pub const COMBINED_TRACON: Self = Self(0);
    pub const APPROACH_CONTROL: Self = Self(1);
    pub const TOWER: Self = Self(2);
    pub const NON_TOWERED: Self = Self(3);
    pub const UNKNOWN: Self = Self(4);

    /// Values above 4 are clamped to [`SizePriority::UNKNOWN`].
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::UNKNOWN.0))
    }

    /// Map a facility-directory tower type string onto the scale.
    pub fn from_tower_type(tower_type: &str) -> Self {
        match tower_type.trim().to_ascii_uppercase().as_str() {
            "ATCT-TRACON" | "ATCT-RAPCON" | "ATCT-RATCF" => Self::COMBINED_TRACON,
            "ATCT-A/C" => Self::APPROACH_CONTROL,
            "ATCT" => Self::TOWER,
            "NON-ATCT" => Self::NON_TOWERED,
            _ => Self::UNKNOWN,
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Priorities 0-2 denote a staffed control tower.
    pub fn is_towered(&self) -> bool {
        *self <= Self::TOWER
    }
}

impl Default for SizePriority {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SizePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One airport's clustering input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInfo {
    pub icao: String,
    /// Airports without coordinates can only be grouped by name.
    pub coord: Option<GeoPoint>,
    pub category: FlightCategory,
    pub size_priority: SizePriority,
    /// Whether a live ATIS broadcast is currently heard.
    #[serde(default)]
    pub has_atis: bool,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

impl AirportInfo {
    pub fn new(icao: impl Into<String>, category: FlightCategory) -> Self {
        Self {
            icao: icao.into(),
            coord: None,
            category,
            size_priority: SizePriority::UNKNOWN,
            has_atis: false,
            city: String::new(),
            state: String::new(),
        }
    }

    pub fn with_coord(mut self, coord: GeoPoint) -> Self {
        self.coord = Some(coord);
        self
    }

    pub fn with_priority(mut self, priority: SizePriority) -> Self {
        self.size_priority = priority;
        self
    }

    pub fn with_atis(mut self, has_atis: bool) -> Self {
        self.has_atis = has_atis;
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = city.into();
        self.state = state.into();
        self
    }

    /// Towered by facility type, or announced by a live ATIS.
    pub fn is_towered(&self) -> bool {
        self.size_priority.is_towered() || self.has_atis
    }

    /// Ordering used for members and for picking group names:
    /// ATIS first, then size priority, then ICAO.
    pub(crate) fn report_key(&self) -> (bool, SizePriority, &str) {
        (!self.has_atis, self.size_priority, self.icao.as_str())
    }
}
