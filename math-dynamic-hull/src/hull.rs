//! Upper, lower and full dynamic hulls

use crate::config::HullConfig;
use crate::tree::{HullTree, RenderChain};
use crate::types::Point;
use crate::{DynamicHullError, Result};
use std::collections::HashSet;

/// Upper hull of a dynamic point set
#[derive(Debug, Clone, Default)]
pub struct UpperHull {
    tree: HullTree,
}

impl UpperHull {
    /// Create an empty upper hull
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty upper hull whose tree uses `config`
    pub fn with_config(config: HullConfig) -> Self {
        Self {
            tree: HullTree::with_config(config),
        }
    }

    /// Add a point
    pub fn insert(&mut self, point: Point) -> Result<()> {
        self.tree.insert(point)
    }

    /// Remove a point and return the stored copy
    pub fn delete(&mut self, point: &Point) -> Result<Point> {
        self.tree.delete(point)
    }

    /// Upper chain from the lowest leftmost to the highest rightmost point
    pub fn chain(&self) -> Result<Vec<Point>> {
        Ok(self.tree.chain()?.to_vec())
    }

    /// Per-node chains in pre-order
    pub fn expand_children_for_render(&self) -> Vec<RenderChain> {
        self.tree.expand_children_for_render()
    }

    /// Underlying search tree
    pub fn tree(&self) -> &HullTree {
        &self.tree
    }
}

/// Lower hull of a dynamic point set
///
/// Stores the points mirrored across the x axis in an upper-hull tree, so
/// every point passes through `Point::reflect_y` on the way in and out.
#[derive(Debug, Clone, Default)]
pub struct LowerHull {
    tree: HullTree,
}

impl LowerHull {
    /// Create an empty lower hull
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty lower hull whose tree uses `config`
    pub fn with_config(config: HullConfig) -> Self {
        Self {
            tree: HullTree::with_config(config),
        }
    }

    /// Add a point
    pub fn insert(&mut self, point: Point) -> Result<()> {
        self.tree.insert(point.reflect_y()).map_err(reflect_error)
    }

    /// Remove a point and return the stored copy
    pub fn delete(&mut self, point: &Point) -> Result<Point> {
        self.tree
            .delete(&point.reflect_y())
            .map(|stored| stored.reflect_y())
            .map_err(reflect_error)
    }

    /// Lower chain from the highest leftmost to the lowest rightmost point
    ///
    /// Points are ordered by increasing `x`; points sharing an `x` appear
    /// from top to bottom.
    pub fn chain(&self) -> Result<Vec<Point>> {
        Ok(self.tree.chain()?.iter().map(Point::reflect_y).collect())
    }

    /// Per-node chains in pre-order, in the caller's coordinates
    pub fn expand_children_for_render(&self) -> Vec<RenderChain> {
        let mut chains = self.tree.expand_children_for_render();
        for render in &mut chains {
            for point in &mut render.chain {
                *point = point.reflect_y();
            }
        }
        chains
    }

    /// Underlying search tree, in mirrored coordinates
    pub fn tree(&self) -> &HullTree {
        &self.tree
    }
}

/// Map points reported by the mirrored tree back to the caller's coordinates
fn reflect_error(err: DynamicHullError) -> DynamicHullError {
    match err {
        DynamicHullError::DuplicatePoint { point } => DynamicHullError::DuplicatePoint {
            point: point.reflect_y(),
        },
        DynamicHullError::PointNotFound { point } => DynamicHullError::PointNotFound {
            point: point.reflect_y(),
        },
        DynamicHullError::NonFiniteCoordinate { point } => DynamicHullError::NonFiniteCoordinate {
            point: point.reflect_y(),
        },
        DynamicHullError::DegenerateBridge { left, right } => DynamicHullError::DegenerateBridge {
            left: left.reflect_y(),
            right: right.reflect_y(),
        },
        other => other,
    }
}

/// Convex hull of a point set under insertion and deletion
///
/// Keeps an [`UpperHull`] and a [`LowerHull`] over the same points. An update
/// either succeeds on both halves or leaves both unchanged. The exception is a
/// `CorruptedTree` error raised by `validate_after_update`: the edit is already
/// applied to the half that reported it, and the hull should be discarded.
#[derive(Debug, Clone, Default)]
pub struct DynamicConvexHull {
    upper: UpperHull,
    lower: LowerHull,
}

impl DynamicConvexHull {
    /// Create an empty hull
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty hull whose trees use `config`
    pub fn with_config(config: HullConfig) -> Self {
        Self {
            upper: UpperHull::with_config(config.clone()),
            lower: LowerHull::with_config(config),
        }
    }

    /// Build a hull from a sequence of distinct points
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut hull = Self::new();
        hull.extend_points(points)?;
        Ok(hull)
    }

    /// Insert every point in order, stopping at the first failure
    ///
    /// Points inserted before the failure stay in the hull.
    pub fn extend_points<I>(&mut self, points: I) -> Result<()>
    where
        I: IntoIterator<Item = Point>,
    {
        points.into_iter().try_for_each(|point| self.insert(point))
    }

    /// Add a point to both halves
    pub fn insert(&mut self, point: Point) -> Result<()> {
        self.upper.insert(point)?;
        if let Err(err) = self.lower.insert(point) {
            log::warn!("Lower hull rejected {} ({}), reverting upper hull", point, err);
            if let Err(revert) = self.upper.delete(&point) {
                log::error!("Failed to revert upper hull: {}", revert);
            }
            return Err(err);
        }
        Ok(())
    }

    /// Remove a point from both halves and return the stored copy
    ///
    /// The upper leaf stays detached until the lower half succeeds, so a
    /// failure puts it back in its old place.
    pub fn delete(&mut self, point: &Point) -> Result<Point> {
        let detached = self.upper.tree.detach(point)?;
        if let Err(err) = self.lower.delete(point) {
            log::warn!("Lower hull failed to delete {} ({}), reverting upper hull", point, err);
            if let Err(revert) = self.upper.tree.reattach(detached) {
                log::error!("Failed to revert upper hull: {}", revert);
            }
            return Err(err);
        }
        self.upper.tree.finish_delete(detached)
    }

    /// Upper chain from the lowest leftmost to the highest rightmost point
    pub fn upper_chain(&self) -> Result<Vec<Point>> {
        self.upper.chain()
    }

    /// Lower chain from the highest leftmost to the lowest rightmost point
    pub fn lower_chain(&self) -> Result<Vec<Point>> {
        self.lower.chain()
    }

    /// Hull polygon in clockwise order, starting at the lowest leftmost point
    pub fn boundary(&self) -> Result<Vec<Point>> {
        let upper = self.upper_chain()?;
        let lower = self.lower_chain()?;

        let mut seen = HashSet::with_capacity(upper.len() + lower.len());
        Ok(upper
            .into_iter()
            .chain(lower.into_iter().rev())
            .filter(|p| seen.insert(*p))
            .collect())
    }

    /// Per-node chains of the upper and the lower tree
    pub fn expand_children_for_render(&self) -> (Vec<RenderChain>, Vec<RenderChain>) {
        (
            self.upper.expand_children_for_render(),
            self.lower.expand_children_for_render(),
        )
    }

    /// Upper half
    pub fn upper(&self) -> &UpperHull {
        &self.upper
    }

    /// Lower half
    pub fn lower(&self) -> &LowerHull {
        &self.lower
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.upper.tree.len()
    }

    /// Check whether no point is stored
    pub fn is_empty(&self) -> bool {
        self.upper.tree.is_empty()
    }

    /// Check whether a point with the same coordinates is stored
    pub fn contains(&self, point: &Point) -> bool {
        self.upper.tree.contains(point)
    }

    /// All stored points in `(x, y)` order
    pub fn points(&self) -> Vec<Point> {
        self.upper.tree.points()
    }

    /// Stored points immediately before and after `point` in `(x, y)` order
    pub fn neighbours(&self, point: &Point) -> (Option<Point>, Option<Point>) {
        self.upper.tree.neighbours(point)
    }

    /// Height of the taller of the two trees
    pub fn height(&self) -> usize {
        self.upper.tree.height().max(self.lower.tree.height())
    }

    /// Remove every point
    pub fn clear(&mut self) {
        self.upper.tree.clear();
        self.lower.tree.clear();
    }

    /// Check both trees and that they hold the same points
    pub fn validate(&self) -> Result<()> {
        self.upper.tree.validate()?;
        self.lower.tree.validate()?;
        if self.upper.tree.len() != self.lower.tree.len() {
            return Err(DynamicHullError::CorruptedTree(format!(
                "upper hull holds {} points, lower hull {}",
                self.upper.tree.len(),
                self.lower.tree.len()
            )));
        }
        Ok(())
    }
}
