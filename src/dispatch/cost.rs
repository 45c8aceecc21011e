use std::cmp::Ordering;
use std::num::NonZeroU32;

use crate::utils::geo::{manhattan_distance, Coordinate};

/// Estimated travel time expressed as the exact ratio `distance / speed`.
///
/// Comparison is done by cross-multiplication so two estimates never compare
/// differently because of rounding.
#[derive(Debug, Clone, Copy)]
pub struct TravelTime {
    distance: i64,
    speed: NonZeroU32,
}

impl TravelTime {
    pub fn distance(&self) -> i64 {
        self.distance
    }

    pub fn speed(&self) -> NonZeroU32 {
        self.speed
    }

    /// Approximate value for logging.
    pub fn as_f64(&self) -> f64 {
        self.distance as f64 / f64::from(self.speed.get())
    }
}

impl Ord for TravelTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.distance) * i128::from(other.speed.get());
        let rhs = i128::from(other.distance) * i128::from(self.speed.get());
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for TravelTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TravelTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TravelTime {}

/// Travel time from a chair's anchor point to a pickup point.
pub fn estimate(anchor: Coordinate, pickup: Coordinate, speed: NonZeroU32) -> TravelTime {
    TravelTime {
        distance: manhattan_distance(anchor, pickup),
        speed,
    }
}
