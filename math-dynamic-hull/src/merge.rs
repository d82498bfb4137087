//! Bridge search between two upper chains
//!
//! Based on the simultaneous binary search of Overmars and van Leeuwen (see
//! Preparata and Shamos, section 3.3.7): each chain keeps a window of
//! candidate indices, the current pair of candidates is classified on both
//! chains, and each of the nine outcomes discards part of one or both windows
//! until both candidates are supporting.

use crate::geometry::{
    ChainSide, Classification, classify_tangent_point, intersection_side, is_point_left,
};
use crate::types::Point;
use crate::{DynamicHullError, Result};
use std::cmp::Ordering;

/// Default iteration guard, as a multiple of the combined chain length
pub(crate) const DEFAULT_ITERATION_FACTOR: usize = 4;

/// The result of bridging two chains
///
/// The merged chain is `prefix_left ++ suffix_right`; the two middle fragments
/// are the parts that fell below the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMerge {
    /// Left chain up to and including the bridge point
    pub prefix_left: Vec<Point>,
    /// Left chain after the bridge point
    pub suffix_left: Vec<Point>,
    /// Right chain before the bridge point
    pub prefix_right: Vec<Point>,
    /// Right chain from the bridge point on
    pub suffix_right: Vec<Point>,
    /// Index of the left bridge point in the merged chain
    pub bridge_index: usize,
}

impl ChainMerge {
    /// The merged chain `prefix_left ++ suffix_right`
    pub fn merged(&self) -> Vec<Point> {
        let mut merged = Vec::with_capacity(self.prefix_left.len() + self.suffix_right.len());
        merged.extend_from_slice(&self.prefix_left);
        merged.extend_from_slice(&self.suffix_right);
        merged
    }

    /// The two endpoints of the bridge edge
    pub fn bridge(&self) -> (Point, Point) {
        (self.prefix_left[self.bridge_index], self.suffix_right[0])
    }
}

/// Shrinking window of bridge candidates on one chain
#[derive(Debug, Clone, Copy)]
struct Window {
    min: usize,
    max: usize,
    index: usize,
}

impl Window {
    fn new(len: usize) -> Self {
        Self {
            min: 0,
            max: len - 1,
            index: (len - 1) / 2,
        }
    }

    /// Move towards `max`, discarding everything before the current index
    fn step_up(&mut self) {
        self.min = self.index;
        self.index = if self.max - self.index == 1 {
            self.max
        } else {
            (self.index + self.max) / 2
        };
    }

    /// Move towards `min`, discarding everything after the current index
    fn step_down(&mut self) {
        self.max = self.index;
        self.index = (self.min + self.index) / 2;
    }

    fn classify(&self, side: ChainSide, chain: &[Point], other: &Point) -> Classification {
        let previous = (self.index > self.min).then(|| &chain[self.index - 1]);
        let next = (self.index < self.max).then(|| &chain[self.index + 1]);
        classify_tangent_point(side, previous, &chain[self.index], next, other)
    }
}

/// Bridge two upper chains
///
/// Both chains must be sorted by `(x, y)`, strictly convex, and every point of
/// `left` must precede every point of `right`. The result is deterministic:
/// merging the same chains twice yields identical output.
pub fn merge_chains(left: &[Point], right: &[Point]) -> Result<ChainMerge> {
    merge_chains_bounded(left, right, DEFAULT_ITERATION_FACTOR)
}

/// Bridge two upper chains with an explicit iteration guard
pub(crate) fn merge_chains_bounded(
    left: &[Point],
    right: &[Point],
    iteration_factor: usize,
) -> Result<ChainMerge> {
    if left.is_empty() || right.is_empty() {
        return Err(DynamicHullError::EmptyStructure);
    }

    let (i, j) = match (left.len(), right.len()) {
        (1, 1) => (0, 0),
        // The inner point survives only if it is strictly above the bridge.
        (2, 1) => {
            if is_point_left(&left[0], &right[0], &left[1]) {
                (1, 0)
            } else {
                (0, 0)
            }
        }
        (1, 2) => {
            if is_point_left(&left[0], &right[1], &right[0]) {
                (0, 0)
            } else {
                (0, 1)
            }
        }
        _ => find_bridge(left, right, iteration_factor)?,
    };

    Ok(ChainMerge {
        prefix_left: left[..=i].to_vec(),
        suffix_left: left[i + 1..].to_vec(),
        prefix_right: right[..j].to_vec(),
        suffix_right: right[j..].to_vec(),
        bridge_index: i,
    })
}

fn find_bridge(left: &[Point], right: &[Point], iteration_factor: usize) -> Result<(usize, usize)> {
    use Classification::{Concave, Convex, Supporting};

    let mut lw = Window::new(left.len());
    let mut rw = Window::new(right.len());
    let max_iterations = iteration_factor * (left.len() + right.len()) + 8;

    for iteration in 0..max_iterations {
        let p = &left[lw.index];
        let q = &right[rw.index];
        let left_type = lw.classify(ChainSide::Left, left, q);
        let right_type = rw.classify(ChainSide::Right, right, p);

        log::trace!(
            "Bridge step {}: left[{}] {:?}, right[{}] {:?}",
            iteration,
            lw.index,
            left_type,
            rw.index,
            right_type
        );

        match (left_type, right_type) {
            (Supporting, Supporting) => return Ok((lw.index, rw.index)),
            (Concave, Concave) => {
                let side = intersection_side(
                    p,
                    &left[lw.index + 1],
                    &right[rw.index - 1],
                    q,
                    &left[lw.max],
                    &right[rw.min],
                )
                .ok_or(DynamicHullError::DegenerateBridge {
                    left: *p,
                    right: *q,
                })?;
                match side {
                    Ordering::Less => lw.step_up(),
                    Ordering::Greater => rw.step_down(),
                    Ordering::Equal => {
                        lw.step_up();
                        rw.step_down();
                    }
                }
            }
            (Concave, Supporting) => {
                lw.step_up();
                rw.min = rw.index;
            }
            (Concave, Convex) => rw.step_up(),
            (Supporting, Concave) => {
                lw.max = lw.index;
                rw.step_down();
            }
            (Supporting, Convex) => {
                lw.max = lw.index;
                rw.step_up();
            }
            (Convex, Concave) => lw.step_down(),
            (Convex, Supporting) => {
                lw.step_down();
                rw.min = rw.index;
            }
            (Convex, Convex) => {
                lw.step_down();
                rw.step_up();
            }
        }
    }

    log::error!(
        "Bridge search exceeded {} iterations for chains of {} and {} points",
        max_iterations,
        left.len(),
        right.len()
    );
    Err(DynamicHullError::DegenerateBridge {
        left: left[lw.index],
        right: right[rw.index],
    })
}
