//! Core data types for dynamic hull maintenance

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(0);

/// A 2D point with a stable identity
///
/// Points are ordered lexicographically by `(x, y)` and compared by value;
/// the `id` is carried along for external reference only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub id: u64,
}

impl Point {
    /// Create a new point with a freshly assigned id
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_id(x, y, NEXT_POINT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Create a point with an explicit id
    pub fn with_id(x: f64, y: f64, id: u64) -> Self {
        // Adding 0.0 turns -0.0 into 0.0, so that equality, ordering and
        // hashing all agree on the sign of zero.
        Self {
            x: x + 0.0,
            y: y + 0.0,
            id,
        }
    }

    /// Mirror the point across the x axis, keeping its id
    pub fn reflect_y(&self) -> Point {
        Point::with_id(self.x, -self.y, self.id)
    }

    /// Check that both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}; {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(1.0, 2.0);
        assert_ne!(a.id, b.id);
        assert_eq!(a, b, "Equality ignores the id");
    }

    #[test]
    fn test_lexicographic_order() {
        let mut points = vec![
            Point::new(1.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(0.0, -1.0),
            Point::new(-2.0, 3.0),
        ];
        points.sort();
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(-2.0, 3.0), (0.0, -1.0), (0.0, 5.0), (1.0, 0.0)]);
    }

    #[test]
    fn test_negative_zero_is_normalised() {
        let a = Point::new(-0.0, 1.0);
        let b = Point::new(0.0, 1.0);
        assert_eq!(a, b);
        assert_eq!(a.x.to_bits(), 0.0_f64.to_bits());

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        let flat = Point::new(3.0, 0.0);
        assert_eq!(flat.reflect_y(), flat);
    }

    #[test]
    fn test_reflect_keeps_id() {
        let p = Point::with_id(2.0, 3.0, 42);
        let q = p.reflect_y();
        assert_eq!(q.id, 42);
        assert_eq!((q.x, q.y), (2.0, -3.0));
        assert_eq!(q.reflect_y(), p);
    }

    #[test]
    fn test_finite_check() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }
}
