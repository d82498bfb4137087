//! Arena-backed search tree that caches an upper chain at every node
//!
//! Points live in the leaves, ordered by `(x, y)`. Every router stores the
//! largest point of its left subtree as routing key, the full upper chain of
//! its subtree, and the index of the bridge that joins the chains of its two
//! children. The parts of the children's chains that fall below that bridge
//! are kept on the children as `subtree_chain`, so any node's chain can be
//! reassembled from the root downwards.

use crate::config::HullConfig;
use crate::geometry::orientation;
use crate::merge::merge_chains_bounded;
use crate::types::Point;
use crate::{DynamicHullError, Result};

/// Handle of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Chain of one node, reassembled for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct RenderChain {
    pub node: NodeId,
    /// Distance from the root
    pub depth: usize,
    pub is_leaf: bool,
    /// Upper chain of the node's subtree
    pub chain: Vec<Point>,
}

#[derive(Debug, Clone)]
struct NodeData {
    /// Leaf: its point. Router: the largest point of the left subtree
    anchor_point: Point,
    /// Leaf holding `anchor_point`
    left_most_right: NodeId,
    /// Part of `merged_chain` hidden below the parent's bridge
    subtree_chain: Vec<Point>,
    merged_chain: Vec<Point>,
    /// Index of the last left-subtree point in `merged_chain`
    bridge_index: usize,
}

#[derive(Debug, Clone)]
struct TreeNode {
    parent: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    data: NodeData,
}

impl TreeNode {
    fn leaf(id: NodeId, point: Point) -> Self {
        Self {
            parent: None,
            children: None,
            data: NodeData {
                anchor_point: point,
                left_most_right: id,
                subtree_chain: vec![point],
                merged_chain: vec![point],
                bridge_index: 0,
            },
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Result of walking from the root towards a point
#[derive(Debug, Clone, Copy)]
struct Descent {
    leaf: NodeId,
    /// Leaf of the largest stored point below the search interval
    predecessor: Option<NodeId>,
    /// Last router where the walk went left
    successor_router: Option<NodeId>,
}

/// Leaf unlinked from the tree, with the router removed alongside it
#[derive(Debug, Clone, Copy)]
pub(crate) struct Detached {
    point: Point,
    leaf: NodeId,
    /// Former parent of the leaf and the sibling that took its place
    router: Option<(NodeId, NodeId)>,
}

/// Search tree over the points of one upper hull
#[derive(Debug, Clone, Default)]
pub struct HullTree {
    nodes: Vec<TreeNode>,
    free_list: Vec<usize>,
    root: Option<NodeId>,
    len: usize,
    config: HullConfig,
}

impl HullTree {
    /// Create an empty tree with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with the given configuration
    pub fn with_config(config: HullConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configuration the tree was built with
    pub fn config(&self) -> &HullConfig {
        &self.config
    }

    /// Number of stored points
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether the tree stores no point
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Root node, if any point is stored
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of node levels on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut height = 0;
        let mut stack = vec![(root, 1)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some((left, right)) = self.nodes[id.0].children {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        height
    }

    /// Upper chain of all stored points, ordered by `(x, y)`
    pub fn chain(&self) -> Result<&[Point]> {
        let root = self.root.ok_or(DynamicHullError::EmptyStructure)?;
        Ok(&self.nodes[root.0].data.merged_chain)
    }

    /// Check whether a point with the same coordinates is stored
    pub fn contains(&self, point: &Point) -> bool {
        self.root
            .map(|root| self.descend(root, point).leaf)
            .is_some_and(|leaf| self.nodes[leaf.0].data.anchor_point == *point)
    }

    /// All stored points in `(x, y)` order
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            match node.children {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => points.push(node.data.anchor_point),
            }
        }
        points
    }

    /// Stored points immediately before and after `point` in `(x, y)` order
    ///
    /// `point` itself does not need to be stored and is never returned.
    pub fn neighbours(&self, point: &Point) -> (Option<Point>, Option<Point>) {
        let Some(root) = self.root else {
            return (None, None);
        };
        let descent = self.descend(root, point);
        let reached = self.nodes[descent.leaf.0].data.anchor_point;
        let predecessor = descent
            .predecessor
            .map(|id| self.nodes[id.0].data.anchor_point);
        let successor = descent
            .successor_router
            .and_then(|id| self.nodes[id.0].children)
            .map(|(_, right)| self.nodes[self.leftmost_leaf(right).0].data.anchor_point);

        match point.cmp(&reached) {
            std::cmp::Ordering::Less => (predecessor, Some(reached)),
            std::cmp::Ordering::Equal => (predecessor, successor),
            std::cmp::Ordering::Greater => (Some(reached), successor),
        }
    }

    /// Remove every point
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.root = None;
        self.len = 0;
    }

    /// Insert a point and update the chains of all its ancestors
    ///
    /// A failed bridge search rolls the insert back. A `CorruptedTree` error
    /// from `validate_after_update` is reported after the insert is applied.
    pub fn insert(&mut self, point: Point) -> Result<()> {
        if !point.is_finite() {
            return Err(DynamicHullError::NonFiniteCoordinate { point });
        }

        let Some(root) = self.root else {
            let leaf = self.alloc_leaf(point);
            self.root = Some(leaf);
            self.len = 1;
            log::debug!("Inserted {} into an empty tree", point);
            return self.check_after_update();
        };

        let leaf = self.descend(root, &point).leaf;
        let existing = self.nodes[leaf.0].data.anchor_point;
        if existing == point {
            return Err(DynamicHullError::DuplicatePoint { point });
        }

        let new_leaf = self.alloc_leaf(point);
        let parent = self.nodes[leaf.0].parent;
        let children = if point < existing {
            (new_leaf, leaf)
        } else {
            (leaf, new_leaf)
        };
        let router = self.alloc_router(parent, children);
        self.replace_child(parent, leaf, router);
        self.len += 1;

        if let Err(err) = self.up(new_leaf) {
            log::warn!("Insert of {} failed ({}), rolling back", point, err);
            self.replace_child(parent, router, leaf);
            self.free(router);
            self.free(new_leaf);
            self.len -= 1;
            self.restore_from(leaf);
            return Err(err);
        }

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Inserted {} ({} points, height {})",
                point,
                self.len,
                self.height()
            );
        }
        self.check_after_update()
    }

    /// Delete the point with the same coordinates and return the stored copy
    ///
    /// Failures roll back the same way as in [`HullTree::insert`].
    pub fn delete(&mut self, point: &Point) -> Result<Point> {
        let detached = self.detach(point)?;
        self.finish_delete(detached)
    }

    /// Unlink the leaf of `point` and recompute the chains above it
    ///
    /// The leaf and its router keep their arena slots until
    /// [`HullTree::finish_delete`] or [`HullTree::reattach`] is called, and
    /// no other update may happen in between.
    pub(crate) fn detach(&mut self, point: &Point) -> Result<Detached> {
        let root = self.root.ok_or(DynamicHullError::EmptyStructure)?;
        let leaf = self.descend(root, point).leaf;
        let stored = self.nodes[leaf.0].data.anchor_point;
        if stored != *point {
            return Err(DynamicHullError::PointNotFound { point: *point });
        }

        let Some(parent) = self.nodes[leaf.0].parent else {
            self.root = None;
            self.len = 0;
            return Ok(Detached {
                point: stored,
                leaf,
                router: None,
            });
        };

        let (left, right) = self.children_of(parent)?;
        let sibling = if left == leaf { right } else { left };
        let grandparent = self.nodes[parent.0].parent;
        self.replace_child(grandparent, parent, sibling);
        self.len -= 1;

        let detached = Detached {
            point: stored,
            leaf,
            router: Some((parent, sibling)),
        };
        if let Err(err) = self.up(sibling) {
            log::warn!("Delete of {} failed ({}), rolling back", stored, err);
            if let Err(restore) = self.reattach(detached) {
                log::error!("Failed to restore chains after rollback: {}", restore);
            }
            return Err(err);
        }
        Ok(detached)
    }

    /// Put a detached leaf back where it was and recompute its ancestors
    ///
    /// The merges redone here are the ones that built the tree before the
    /// leaf was detached.
    pub(crate) fn reattach(&mut self, detached: Detached) -> Result<()> {
        let Some((parent, sibling)) = detached.router else {
            if self.root.is_some() {
                return Err(DynamicHullError::CorruptedTree(format!(
                    "cannot reattach {} as root of a non-empty tree",
                    detached.point
                )));
            }
            self.root = Some(detached.leaf);
            self.len = 1;
            return Ok(());
        };

        let grandparent = self.nodes[sibling.0].parent;
        self.replace_child(grandparent, sibling, parent);
        self.nodes[sibling.0].parent = Some(parent);
        self.len += 1;
        self.up(detached.leaf)
    }

    /// Release the slots of a detached leaf and return its point
    pub(crate) fn finish_delete(&mut self, detached: Detached) -> Result<Point> {
        self.free(detached.leaf);
        if let Some((parent, _)) = detached.router {
            self.free(parent);
        }
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Deleted {} ({} points, height {})",
                detached.point,
                self.len,
                self.height()
            );
        }
        self.check_after_update().map(|()| detached.point)
    }

    /// Check every structural and geometric invariant of the tree
    pub fn validate(&self) -> Result<()> {
        let corrupted = |msg: String| Err(DynamicHullError::CorruptedTree(msg));

        let Some(root) = self.root else {
            if self.len != 0 {
                return corrupted(format!("empty tree reports {} points", self.len));
            }
            return Ok(());
        };
        if self.nodes[root.0].parent.is_some() {
            return corrupted(format!("root {:?} has a parent", root));
        }
        if self.nodes[root.0].data.subtree_chain != self.nodes[root.0].data.merged_chain {
            return corrupted("root subtree chain differs from its merged chain".to_string());
        }

        let mut leaves: Vec<Point> = Vec::with_capacity(self.len);
        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > self.nodes.len() {
                return corrupted("cycle in the tree".to_string());
            }
            let node = &self.nodes[id.0];
            let chain = &node.data.merged_chain;
            check_chain(chain).map_err(|msg| {
                DynamicHullError::CorruptedTree(format!("node {:?}: {}", id, msg))
            })?;

            let Some((left, right)) = node.children else {
                if chain.len() != 1 || chain[0] != node.data.anchor_point {
                    return corrupted(format!("leaf {:?} chain is not its own point", id));
                }
                if node.data.left_most_right != id {
                    return corrupted(format!("leaf {:?} does not reference itself", id));
                }
                if let Some(last) = leaves.last()
                    && *last >= node.data.anchor_point
                {
                    return corrupted(format!(
                        "leaf {} is out of order after {}",
                        node.data.anchor_point, last
                    ));
                }
                leaves.push(node.data.anchor_point);
                continue;
            };

            for child in [left, right] {
                if self.nodes[child.0].parent != Some(id) {
                    return corrupted(format!("child {:?} is not linked to {:?}", child, id));
                }
            }

            let split = node.data.bridge_index;
            if split >= chain.len() {
                return corrupted(format!("router {:?} bridge index out of range", id));
            }
            let left_data = &self.nodes[left.0].data;
            let right_data = &self.nodes[right.0].data;
            let left_ok = left_data.merged_chain.len() > split
                && left_data.merged_chain[..=split] == chain[..=split]
                && left_data.merged_chain[split + 1..] == left_data.subtree_chain[..];
            let right_tail = &chain[split + 1..];
            let right_ok = right_data.merged_chain.len() >= right_tail.len()
                && right_data.merged_chain.ends_with(right_tail)
                && right_data.merged_chain[..right_data.merged_chain.len() - right_tail.len()]
                    == right_data.subtree_chain[..];
            if !left_ok || !right_ok {
                return corrupted(format!("router {:?} chain does not split at its bridge", id));
            }

            let expected = self.rightmost_leaf(left);
            if node.data.left_most_right != expected
                || node.data.anchor_point != self.nodes[expected.0].data.anchor_point
            {
                return corrupted(format!("router {:?} has a stale routing key", id));
            }

            stack.push(right);
            stack.push(left);
        }

        if leaves.len() != self.len {
            return corrupted(format!(
                "{} leaves reachable but {} points recorded",
                leaves.len(),
                self.len
            ));
        }
        if visited + self.free_list.len() != self.nodes.len() {
            return corrupted("arena slots leaked".to_string());
        }
        Ok(())
    }

    /// Reassemble the chain of every node from the root downwards
    ///
    /// Nodes are listed in pre-order. Each child chain is built from the
    /// parent's chain split at its bridge plus the child's hidden fragment,
    /// so this only reads the stored fragments.
    pub fn expand_children_for_render(&self) -> Vec<RenderChain> {
        let mut chains = Vec::with_capacity(self.nodes.len());
        let mut stack = match self.root {
            Some(root) => vec![(root, 0, self.nodes[root.0].data.subtree_chain.clone())],
            None => Vec::new(),
        };

        while let Some((id, depth, chain)) = stack.pop() {
            let node = &self.nodes[id.0];
            if let Some((left, right)) = node.children {
                let split = (node.data.bridge_index + 1).min(chain.len());

                let mut right_chain = self.nodes[right.0].data.subtree_chain.clone();
                right_chain.extend_from_slice(&chain[split..]);
                let mut left_chain = chain[..split].to_vec();
                left_chain.extend_from_slice(&self.nodes[left.0].data.subtree_chain);

                stack.push((right, depth + 1, right_chain));
                stack.push((left, depth + 1, left_chain));
            }
            chains.push(RenderChain {
                node: id,
                depth,
                is_leaf: node.is_leaf(),
                chain,
            });
        }
        chains
    }

    pub(crate) fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        self.nodes[id.0].children
    }

    pub(crate) fn anchor_point(&self, id: NodeId) -> Point {
        self.nodes[id.0].data.anchor_point
    }

    pub(crate) fn merged_chain(&self, id: NodeId) -> &[Point] {
        &self.nodes[id.0].data.merged_chain
    }

    pub(crate) fn bridge_index(&self, id: NodeId) -> usize {
        self.nodes[id.0].data.bridge_index
    }

    /// Walk from `root` to the leaf where `point` is or would be stored
    fn descend(&self, root: NodeId, point: &Point) -> Descent {
        let mut descent = Descent {
            leaf: root,
            predecessor: None,
            successor_router: None,
        };
        while let Some((left, right)) = self.nodes[descent.leaf.0].children {
            let data = &self.nodes[descent.leaf.0].data;
            if *point <= data.anchor_point {
                descent.successor_router = Some(descent.leaf);
                descent.leaf = left;
            } else {
                descent.predecessor = Some(data.left_most_right);
                descent.leaf = right;
            }
        }
        descent
    }

    /// Recompute the chains on the path from `start` to the root
    fn up(&mut self, start: NodeId) -> Result<()> {
        let node = &mut self.nodes[start.0];
        if node.is_leaf() {
            node.data.merged_chain = vec![node.data.anchor_point];
            node.data.bridge_index = 0;
            node.data.left_most_right = start;
        }

        let mut current = start;
        while let Some(parent) = self.nodes[current.0].parent {
            self.recompute(parent)?;
            current = parent;
        }

        let data = &mut self.nodes[current.0].data;
        data.subtree_chain = data.merged_chain.clone();
        Ok(())
    }

    /// Bridge the chains of both children of a router
    fn recompute(&mut self, id: NodeId) -> Result<()> {
        let (left, right) = self.children_of(id)?;
        let merge = merge_chains_bounded(
            &self.nodes[left.0].data.merged_chain,
            &self.nodes[right.0].data.merged_chain,
            self.config.bridge_iteration_factor,
        )?;
        let merged_chain = merge.merged();
        let left_most_right = self.rightmost_leaf(left);
        let anchor_point = self.nodes[left_most_right.0].data.anchor_point;

        self.nodes[left.0].data.subtree_chain = merge.suffix_left;
        self.nodes[right.0].data.subtree_chain = merge.prefix_right;
        let data = &mut self.nodes[id.0].data;
        data.merged_chain = merged_chain;
        data.bridge_index = merge.bridge_index;
        data.left_most_right = left_most_right;
        data.anchor_point = anchor_point;
        Ok(())
    }

    /// Recompute chains after a rolled back edit
    fn restore_from(&mut self, start: NodeId) {
        if let Err(err) = self.up(start) {
            log::error!("Failed to restore chains after rollback: {}", err);
        }
    }

    fn check_after_update(&self) -> Result<()> {
        if self.config.validate_after_update {
            self.validate()
        } else {
            Ok(())
        }
    }

    fn children_of(&self, id: NodeId) -> Result<(NodeId, NodeId)> {
        self.nodes[id.0].children.ok_or_else(|| {
            DynamicHullError::CorruptedTree(format!("router {:?} has no children", id))
        })
    }

    fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some((left, _)) = self.nodes[id.0].children {
            id = left;
        }
        id
    }

    fn rightmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some((_, right)) = self.nodes[id.0].children {
            id = right;
        }
        id
    }

    /// Point the slot of `old` (a child of `parent`, or the root) at `new`
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            Some(parent) => {
                if let Some((left, right)) = &mut self.nodes[parent.0].children {
                    if *left == old {
                        *left = new;
                    } else if *right == old {
                        *right = new;
                    }
                }
            }
            None => self.root = Some(new),
        }
        self.nodes[new.0].parent = parent;
    }

    fn alloc_leaf(&mut self, point: Point) -> NodeId {
        let id = self.next_id();
        self.place(TreeNode::leaf(id, point));
        id
    }

    fn alloc_router(&mut self, parent: Option<NodeId>, children: (NodeId, NodeId)) -> NodeId {
        let id = self.next_id();
        let (left, right) = children;
        let anchor = self.nodes[left.0].data.anchor_point;
        // Chains, key and bridge are filled in by the next `up`.
        let mut node = TreeNode::leaf(left, anchor);
        node.parent = parent;
        node.children = Some(children);
        self.place(node);
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        id
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.free_list.last().copied().unwrap_or(self.nodes.len()))
    }

    fn place(&mut self, node: TreeNode) {
        match self.free_list.pop() {
            Some(index) => self.nodes[index] = node,
            None => self.nodes.push(node),
        }
    }

    fn free(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.children = None;
        node.data.subtree_chain = Vec::new();
        node.data.merged_chain = Vec::new();
        self.free_list.push(id.0);
    }
}

/// Check that a chain is strictly increasing and turns clockwise everywhere
fn check_chain(chain: &[Point]) -> std::result::Result<(), String> {
    if chain.is_empty() {
        return Err("empty chain".to_string());
    }
    if let Some(pair) = chain.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(format!("chain is not increasing at {}", pair[1]));
    }
    if let Some(triple) = chain
        .windows(3)
        .find(|triple| orientation(&triple[0], &triple[1], &triple[2]) >= 0.0)
    {
        return Err(format!("chain is not strictly convex at {}", triple[1]));
    }
    Ok(())
}
