//! Geometric utility functions

use crate::types::Point;
use std::cmp::Ordering;

/// Which of the two chains of a merge a candidate point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSide {
    /// The chain whose points precede the other chain in `(x, y)` order
    Left,
    /// The chain whose points follow the other chain in `(x, y)` order
    Right,
}

/// Position of a bridge candidate relative to the bridge being searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The bridge touches this chain further away from the other chain
    Convex,
    /// The bridge touches this chain closer to the other chain
    Concave,
    /// The candidate line is tangent to this chain at the candidate
    Supporting,
}

/// Signed area of the parallelogram spanned by `b - a` and `c - a`
///
/// Positive when `c` lies left of the directed line `a -> b`, negative when it
/// lies to the right, and exactly zero for collinear points.
#[inline]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Check if `point` lies strictly left of the directed line `from -> to`
#[inline]
pub fn is_point_left(from: &Point, to: &Point, point: &Point) -> bool {
    orientation(from, to, point) > 0.0
}

/// Classify a bridge candidate `current` against a candidate `other` on the
/// opposite chain.
///
/// A missing neighbour stands for the vertical reference below a chain end and
/// never lies above the candidate line. Neighbours that are exactly on the
/// line push the search outward, so collinear runs resolve to their outermost
/// points.
pub fn classify_tangent_point(
    side: ChainSide,
    previous: Option<&Point>,
    current: &Point,
    next: Option<&Point>,
    other: &Point,
) -> Classification {
    match side {
        ChainSide::Left => {
            let above = |p: &Point| orientation(current, other, p);
            if previous.is_some_and(|p| above(p) >= 0.0) {
                Classification::Convex
            } else if next.is_some_and(|p| above(p) > 0.0) {
                Classification::Concave
            } else {
                Classification::Supporting
            }
        }
        ChainSide::Right => {
            let above = |p: &Point| orientation(other, current, p);
            if next.is_some_and(|p| above(p) >= 0.0) {
                Classification::Convex
            } else if previous.is_some_and(|p| above(p) > 0.0) {
                Classification::Concave
            } else {
                Classification::Supporting
            }
        }
    }
}

/// Numerators and denominator of the intersection of lines `ab` and `cd`
fn intersection_terms(a: &Point, b: &Point, c: &Point, d: &Point) -> (f64, f64, f64) {
    let ab = a.x * b.y - a.y * b.x;
    let cd = c.x * d.y - c.y * d.x;
    let denominator = (a.x - b.x) * (c.y - d.y) - (a.y - b.y) * (c.x - d.x);
    let x = ab * (c.x - d.x) - (a.x - b.x) * cd;
    let y = ab * (c.y - d.y) - (a.y - b.y) * cd;
    (x, y, denominator)
}

/// Intersection point of the lines through `a, b` and through `c, d`
///
/// Returns `None` for parallel lines.
pub fn line_intersection(a: &Point, b: &Point, c: &Point, d: &Point) -> Option<Point> {
    let (x, y, denominator) = intersection_terms(a, b, c, d);
    if denominator == 0.0 {
        return None;
    }
    let point = Point::with_id(x / denominator, y / denominator, 0);
    point.is_finite().then_some(point)
}

/// Compare the intersection of lines `ab` and `cd` with the midpoint of
/// `low` and `high`, x first and then y.
///
/// The comparison is carried out on the cross-multiplied terms so that it does
/// not depend on the rounding of the division. Returns `None` for parallel
/// lines or non-finite terms.
pub(crate) fn intersection_side(
    a: &Point,
    b: &Point,
    c: &Point,
    d: &Point,
    low: &Point,
    high: &Point,
) -> Option<Ordering> {
    let (x, y, denominator) = intersection_terms(a, b, c, d);
    if denominator == 0.0 {
        return None;
    }
    // intersection.x < (low.x + high.x) / 2  <=>  2 x / den < low.x + high.x
    let sign = denominator.signum();
    let by_x = (2.0 * x * sign).partial_cmp(&((low.x + high.x) * denominator * sign))?;
    let by_y = (2.0 * y * sign).partial_cmp(&((low.y + high.y) * denominator * sign))?;
    Some(by_x.then(by_y))
}
