//! Test data for dynamic hull tests
//!
//! Point set generators plus a static monotone-chain hull used as the
//! reference the dynamic structure is checked against.

use crate::geometry::orientation;
use crate::types::Point;
use rand::Rng;
use std::collections::HashSet;

/// The six points of the classroom walkthrough
pub fn lab_points() -> Vec<Point> {
    [
        (-5.0, -3.0),
        (-1.0, -1.0),
        (0.0, 0.0),
        (3.0, 6.0),
        (6.0, 10.0),
        (7.0, 7.0),
    ]
    .iter()
    .map(|&(x, y)| Point::new(x, y))
    .collect()
}

/// Generate random points uniformly distributed in a disk
pub fn random_disk_points(n: usize, radius: f64) -> Vec<Point> {
    let mut rng = rand::rng();
    let mut points = Vec::with_capacity(n);

    for _ in 0..n {
        let angle = rng.random::<f64>() * 2.0 * std::f64::consts::PI;
        let r = radius * rng.random::<f64>().sqrt();
        points.push(Point::new(r * angle.cos(), r * angle.sin()));
    }

    points
}

/// Generate distinct random points with integer coordinates in
/// `[-half_extent, half_extent]²`
///
/// Small grids produce many collinear triples and shared `x` values, and all
/// orientation tests on them are exact.
pub fn random_grid_points(n: usize, half_extent: i32) -> Vec<Point> {
    let side = 2 * half_extent.unsigned_abs() as usize + 1;
    let n = n.min(side * side);
    let mut rng = rand::rng();
    let mut seen = HashSet::with_capacity(n);
    let mut points = Vec::with_capacity(n);

    while points.len() < n {
        let x = rng.random_range(-half_extent..=half_extent);
        let y = rng.random_range(-half_extent..=half_extent);
        if seen.insert((x, y)) {
            points.push(Point::new(x as f64, y as f64));
        }
    }

    points
}

/// Points evenly spaced on a circle, every one of them a hull vertex
pub fn circle_points(n: usize, radius: f64) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Points on a line through the origin with the given direction
pub fn collinear_points(n: usize, dx: f64, dy: f64) -> Vec<Point> {
    (0..n)
        .map(|i| Point::new(i as f64 * dx, i as f64 * dy))
        .collect()
}

/// Upper chain of a static point set (Andrew's monotone chain)
///
/// Sorted by `(x, y)`, strictly convex, from the lowest leftmost point to the
/// highest rightmost point. Duplicates are ignored.
pub fn upper_chain_reference(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut chain: Vec<Point> = Vec::with_capacity(sorted.len());
    for p in sorted {
        while chain.len() >= 2
            && orientation(&chain[chain.len() - 2], &chain[chain.len() - 1], &p) >= 0.0
        {
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

/// Lower chain of a static point set, mirrored through the upper chain
pub fn lower_chain_reference(points: &[Point]) -> Vec<Point> {
    let reflected: Vec<Point> = points.iter().map(Point::reflect_y).collect();
    upper_chain_reference(&reflected)
        .iter()
        .map(Point::reflect_y)
        .collect()
}

/// Clockwise hull polygon of a static point set
///
/// Starts at the lowest leftmost point, the same order the dynamic structure
/// reports its boundary in.
pub fn monotone_chain_hull(points: &[Point]) -> Vec<Point> {
    let upper = upper_chain_reference(points);
    let lower = lower_chain_reference(points);
    let mut seen = HashSet::with_capacity(upper.len() + lower.len());
    upper
        .into_iter()
        .chain(lower.into_iter().rev())
        .filter(|p| seen.insert(*p))
        .collect()
}
