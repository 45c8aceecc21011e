use serde::{Deserialize, Serialize};

/// A point on the integer dispatch grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: i32,
    pub longitude: i32,
}

impl Coordinate {
    pub fn new(latitude: i32, longitude: i32) -> Self {
        Self { latitude, longitude }
    }
}

/// Calculate the Manhattan distance between two coordinates
/// (|Δlatitude| + |Δlongitude|), widened so it cannot overflow.
pub fn manhattan_distance(a: Coordinate, b: Coordinate) -> i64 {
    let d_lat = (i64::from(a.latitude) - i64::from(b.latitude)).abs();
    let d_lng = (i64::from(a.longitude) - i64::from(b.longitude)).abs();
    d_lat + d_lng
}

/// Check that both axes of a coordinate stay within `limit` of the origin
pub fn is_within_bounds(point: Coordinate, limit: i32) -> bool {
    point.latitude.unsigned_abs() <= limit.unsigned_abs()
        && point.longitude.unsigned_abs() <= limit.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let origin = Coordinate::new(0, 0);
        assert_eq!(manhattan_distance(origin, Coordinate::new(3, 4)), 7);
        assert_eq!(manhattan_distance(Coordinate::new(-2, 5), Coordinate::new(1, -1)), 9);
        assert_eq!(manhattan_distance(origin, origin), 0);
    }

    #[test]
    fn test_manhattan_distance_extremes() {
        let a = Coordinate::new(i32::MIN, i32::MIN);
        let b = Coordinate::new(i32::MAX, i32::MAX);
        assert_eq!(manhattan_distance(a, b), 2 * (u32::MAX as i64));
    }

    #[test]
    fn test_within_bounds() {
        assert!(is_within_bounds(Coordinate::new(-100, 100), 100));
        assert!(!is_within_bounds(Coordinate::new(101, 0), 100));
        assert!(!is_within_bounds(Coordinate::new(0, i32::MIN), 100));
    }
}
