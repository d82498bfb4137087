//! Dynamic 2D Convex Hull Library
//!
//! This library maintains the convex hull of a changing planar point set under
//! single-point insertion and deletion, following the Overmars and van Leeuwen
//! scheme: a binary search tree over the points (ordered by `x`, ties broken by
//! `y`) whose internal nodes cache the upper hull of their subtree. Two
//! neighbouring chains are joined by a logarithmic bridge search.
//!
//! Based on:
//! - Overmars, M.H. and van Leeuwen, J., "Maintenance of configurations in the
//!   plane," J. Computer and System Sciences, 23(2):166-204, 1981.
//! - Preparata, F.P. and Shamos, M.I., "Computational Geometry: An
//!   Introduction," Springer, 1985, section 3.3.7.
//!
//! The tree is not rebalanced, so its height depends on the insertion order.
//! Every node keeps a full copy of its subtree's chain, so an update costs
//! the chain length at each ancestor and memory grows with `n · height`,
//! up to about `n²/2` points when the points arrive sorted.
//!
//! # Example
//! ```
//! use math_dynamic_hull::{DynamicConvexHull, Point};
//!
//! let mut hull = DynamicConvexHull::new();
//! for (x, y) in [(-5.0, -3.0), (-1.0, -1.0), (0.0, 0.0), (3.0, 6.0), (6.0, 10.0), (7.0, 7.0)] {
//!     hull.insert(Point::new(x, y)).unwrap();
//! }
//!
//! let boundary = hull.boundary().unwrap();
//! assert_eq!(boundary.len(), 4);
//! assert!(!boundary.contains(&Point::new(0.0, 0.0)));
//! ```

mod config;
mod export;
mod geometry;
mod hull;
mod merge;
mod tree;
mod types;

// Make testdata publicly available for tests and benchmarks
pub mod testdata;

pub use config::HullConfig;
pub use export::{export_dot, tree_to_dot};
pub use geometry::{
    ChainSide, Classification, classify_tangent_point, is_point_left, line_intersection,
    orientation,
};
pub use hull::{DynamicConvexHull, LowerHull, UpperHull};
pub use merge::{ChainMerge, merge_chains};
pub use tree::{HullTree, NodeId, RenderChain};
pub use types::Point;

/// Error types for dynamic convex hull operations
#[derive(Debug, thiserror::Error)]
pub enum DynamicHullError {
    #[error("Point {point} is already stored in the hull")]
    DuplicatePoint { point: Point },

    #[error("Point {point} is not stored in the hull")]
    PointNotFound { point: Point },

    #[error("Bridge between {left} and {right} is undefined")]
    DegenerateBridge { left: Point, right: Point },

    #[error("The hull structure is empty")]
    EmptyStructure,

    #[error("Point {point} has a non-finite coordinate")]
    NonFiniteCoordinate { point: Point },

    #[error("Corrupted hull tree: {0}")]
    CorruptedTree(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DynamicHullError>;
