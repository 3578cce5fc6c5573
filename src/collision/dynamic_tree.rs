//! A self-balancing binary tree of padded axis-aligned bounding boxes,
//! the broadphase spatial index.
//!
//! Nodes live in a flat arena addressed by [`NodeId`] handles with a free
//! list, so parent/child links are plain indices rather than pointers. The
//! insertion heuristic and rotation scheme follow Box2D's b2DynamicTree,
//! with a perimeter cost metric.

use std::collections::HashMap;

use log::warn;

use crate::collision::aabb::BoundingBox;
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;
use crate::math::ray::Ray;
use crate::objects::body::Body;

/// Handle to a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

const NULL_NODE: NodeId = NodeId(u32::MAX);

impl NodeId {
    fn is_null(self) -> bool {
        self == NULL_NODE
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    /// Leaves are 0; internal nodes are 1 + max child height.
    height: i32,
    bounds: BoundingBox,
    /// Index of the tracked body; `None` for internal nodes.
    body: Option<usize>,
}

impl TreeNode {
    fn new() -> Self {
        Self {
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: 0,
            bounds: BoundingBox::new(0.0, 0.0, 0.0, 0.0),
            body: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_null() && self.right.is_null()
    }
}

/// Dynamic AABB tree over tracked bodies.
///
/// Every leaf's stored bounds are padded, so a body only needs reinsertion
/// once its true bounds escape the padded box.
pub struct DynamicTree {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: NodeId,
    /// Tracked body index to its leaf node.
    leaves: HashMap<usize, NodeId>,
}

impl Default for DynamicTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NULL_NODE,
            leaves: HashMap::new(),
        }
    }

    fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    fn allocate_node(&mut self) -> NodeId {
        if let Some(id) = self.free.pop() {
            *self.node_mut(id) = TreeNode::new();
            id
        } else {
            self.nodes.push(TreeNode::new());
            NodeId((self.nodes.len() - 1) as u32)
        }
    }

    fn free_node(&mut self, id: NodeId) {
        *self.node_mut(id) = TreeNode::new();
        self.free.push(id);
    }

    /// Number of tracked bodies.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Height of the root, 0 for an empty tree.
    pub fn height(&self) -> i32 {
        if self.root.is_null() {
            0
        } else {
            self.node(self.root).height
        }
    }

    pub fn is_tracked(&self, index: usize) -> bool {
        self.leaves.contains_key(&index)
    }

    /// The padded bounds stored for a tracked body.
    pub fn leaf_bounds(&self, index: usize) -> Option<BoundingBox> {
        self.leaves.get(&index).map(|&leaf| self.node(leaf).bounds)
    }

    /// Starts tracking a body. Bounds are padded so small movements do not
    /// force reinsertion. Non-finite bounds are rejected: a NaN box would
    /// poison every union on the path to the root.
    pub fn track_body(
        &mut self,
        index: usize,
        body: &Body,
        config: &PhysicsConfig,
    ) -> Result<(), PhysicsError> {
        if self.leaves.contains_key(&index) {
            return Ok(());
        }
        let bounds = body.bounds();
        if !bounds.is_valid() {
            return Err(PhysicsError::InvalidBounds { body: index });
        }

        let leaf = self.allocate_node();
        let node = self.node_mut(leaf);
        node.body = Some(index);
        node.bounds = pad_bounds(bounds, body, config);
        self.leaves.insert(index, leaf);
        self.insert(leaf);
        Ok(())
    }

    /// Stops tracking a body. Untracking a body that is not present is a
    /// silent no-op.
    pub fn untrack_body(&mut self, index: usize) {
        if let Some(leaf) = self.leaves.remove(&index) {
            self.remove(leaf);
            self.free_node(leaf);
        }
    }

    /// Refreshes a tracked body's leaf. Returns true when the leaf had to
    /// be reinserted, false when the stored padded bounds still contain the
    /// body's true bounds.
    ///
    /// A body whose bounds turn non-finite or leave the configured world
    /// bounds is dropped from tracking: it silently stops colliding.
    pub fn update_body(&mut self, index: usize, body: &Body, config: &PhysicsConfig) -> bool {
        let leaf = match self.leaves.get(&index) {
            Some(&leaf) => leaf,
            None => return false,
        };

        let bounds = body.bounds();
        if !bounds.is_valid() {
            warn!(
                "body {} ({:?}) produced non-finite bounds, dropping from collision tracking",
                index,
                body.shape.kind()
            );
            self.untrack_body(index);
            return false;
        }

        if self.node(leaf).bounds.contains(&bounds) {
            return false;
        }

        self.remove(leaf);

        if !config.world_bounds.contains(&bounds) {
            warn!(
                "body {} ({:?}) left the world bounds, dropping from collision tracking",
                index,
                body.shape.kind()
            );
            self.leaves.remove(&index);
            self.free_node(leaf);
            return false;
        }

        self.node_mut(leaf).bounds = pad_bounds(bounds, body, config);
        self.insert(leaf);
        true
    }

    /// Visits every tracked body whose leaf bounds overlap `bounds`,
    /// except the querying body itself. The visitor returning true stops
    /// the traversal early.
    pub fn query(&self, index: usize, bounds: &BoundingBox, mut visit: impl FnMut(usize) -> bool) {
        let mut stack = Vec::new();
        if !self.root.is_null() {
            stack.push(self.root);
        }
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if !node.bounds.overlaps(bounds) {
                continue;
            }
            if node.is_leaf() {
                if let Some(body) = node.body {
                    if body != index && visit(body) {
                        return;
                    }
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Visits every tracked body whose leaf bounds the ray enters within
    /// `max_distance`. The visitor returning true stops the traversal.
    pub fn ray_cast_query(
        &self,
        ray: &Ray,
        max_distance: f64,
        mut visit: impl FnMut(usize) -> bool,
    ) {
        let mut stack = Vec::new();
        if !self.root.is_null() {
            stack.push(self.root);
        }
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if !node.bounds.ray_cast(ray, max_distance) {
                continue;
            }
            if node.is_leaf() {
                if let Some(body) = node.body {
                    if visit(body) {
                        return;
                    }
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    fn insert(&mut self, leaf: NodeId) {
        if self.root.is_null() {
            self.root = leaf;
            self.node_mut(leaf).parent = NULL_NODE;
            return;
        }

        // find the cheapest sibling by the perimeter surface-area heuristic
        let leaf_bounds = self.node(leaf).bounds;
        let mut current = self.root;
        while !self.node(current).is_leaf() {
            let left = self.node(current).left;
            let right = self.node(current).right;

            let area = self.node(current).bounds.perimeter();
            let combined_area = self.node(current).bounds.combine(&leaf_bounds).perimeter();

            // cost of creating a new parent for this node and the leaf
            let cost = 2.0 * combined_area;
            // minimum cost of pushing the leaf further down
            let inheritance_cost = 2.0 * (combined_area - area);

            let left_cost = {
                let combined = leaf_bounds.combine(&self.node(left).bounds);
                if self.node(left).is_leaf() {
                    combined.perimeter() + inheritance_cost
                } else {
                    combined.perimeter() - self.node(left).bounds.perimeter() + inheritance_cost
                }
            };
            let right_cost = {
                let combined = leaf_bounds.combine(&self.node(right).bounds);
                if self.node(right).is_leaf() {
                    combined.perimeter() + inheritance_cost
                } else {
                    combined.perimeter() - self.node(right).bounds.perimeter() + inheritance_cost
                }
            };

            if cost < left_cost && cost < right_cost {
                break;
            }
            current = if left_cost < right_cost { left } else { right };
        }

        // splice a new parent in between
        let sibling = current;
        let old_parent = self.node(sibling).parent;
        let combined = leaf_bounds.combine(&self.node(sibling).bounds);
        let height = self.node(sibling).height + 1;
        let new_parent = self.allocate_node();
        {
            let node = self.node_mut(new_parent);
            node.parent = old_parent;
            node.bounds = combined;
            node.height = height;
            node.left = sibling;
            node.right = leaf;
        }
        self.node_mut(sibling).parent = new_parent;
        self.node_mut(leaf).parent = new_parent;

        if old_parent.is_null() {
            self.root = new_parent;
        } else if self.node(old_parent).left == sibling {
            self.node_mut(old_parent).left = new_parent;
        } else {
            self.node_mut(old_parent).right = new_parent;
        }

        self.refresh_upward(self.node(leaf).parent);
    }

    fn remove(&mut self, leaf: NodeId) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.node(leaf).parent;
        let grandparent = self.node(parent).parent;
        let sibling = if self.node(parent).left == leaf {
            self.node(parent).right
        } else {
            self.node(parent).left
        };
        assert!(
            !sibling.is_null(),
            "tree invariant violated: leaf's parent has no second child"
        );

        if grandparent.is_null() {
            self.root = sibling;
            self.node_mut(sibling).parent = NULL_NODE;
            self.free_node(parent);
        } else {
            if self.node(grandparent).left == parent {
                self.node_mut(grandparent).left = sibling;
            } else {
                self.node_mut(grandparent).right = sibling;
            }
            self.node_mut(sibling).parent = grandparent;
            self.free_node(parent);
            self.refresh_upward(grandparent);
        }
    }

    /// Walks from `start` to the root, rebalancing and refreshing each
    /// ancestor's height and bounds.
    fn refresh_upward(&mut self, start: NodeId) {
        let mut current = start;
        while !current.is_null() {
            current = self.balance(current);

            let left = self.node(current).left;
            let right = self.node(current).right;
            assert!(
                !left.is_null() && !right.is_null(),
                "tree invariant violated: internal node missing a child"
            );

            let height = 1 + self.node(left).height.max(self.node(right).height);
            let bounds = self.node(left).bounds.combine(&self.node(right).bounds);
            let node = self.node_mut(current);
            node.height = height;
            node.bounds = bounds;

            current = node.parent;
        }
    }

    /// Single AVL-style rotation when the subtree heights differ by more
    /// than one. Returns the node now occupying this position.
    fn balance(&mut self, a: NodeId) -> NodeId {
        assert!(!a.is_null(), "cannot balance a null node");

        if self.node(a).is_leaf() || self.node(a).height < 2 {
            return a;
        }

        let b = self.node(a).left;
        let c = self.node(a).right;
        let balance = self.node(c).height - self.node(b).height;

        // rotate the right child up
        if balance > 1 {
            let f = self.node(c).left;
            let g = self.node(c).right;

            // swap c with its parent a
            let a_parent = self.node(a).parent;
            self.node_mut(c).left = a;
            self.node_mut(c).parent = a_parent;
            self.node_mut(a).parent = c;
            if a_parent.is_null() {
                self.root = c;
            } else if self.node(a_parent).left == a {
                self.node_mut(a_parent).left = c;
            } else {
                self.node_mut(a_parent).right = c;
            }

            if self.node(f).height > self.node(g).height {
                self.node_mut(c).right = f;
                self.node_mut(a).right = g;
                self.node_mut(g).parent = a;

                let a_bounds = self.node(b).bounds.combine(&self.node(g).bounds);
                let c_bounds = a_bounds.combine(&self.node(f).bounds);
                let a_height = 1 + self.node(b).height.max(self.node(g).height);
                let c_height = 1 + a_height.max(self.node(f).height);
                self.node_mut(a).bounds = a_bounds;
                self.node_mut(a).height = a_height;
                self.node_mut(c).bounds = c_bounds;
                self.node_mut(c).height = c_height;
            } else {
                self.node_mut(c).right = g;
                self.node_mut(a).right = f;
                self.node_mut(f).parent = a;

                let a_bounds = self.node(b).bounds.combine(&self.node(f).bounds);
                let c_bounds = a_bounds.combine(&self.node(g).bounds);
                let a_height = 1 + self.node(b).height.max(self.node(f).height);
                let c_height = 1 + a_height.max(self.node(g).height);
                self.node_mut(a).bounds = a_bounds;
                self.node_mut(a).height = a_height;
                self.node_mut(c).bounds = c_bounds;
                self.node_mut(c).height = c_height;
            }
            return c;
        }

        // rotate the left child up
        if balance < -1 {
            let d = self.node(b).left;
            let e = self.node(b).right;

            let a_parent = self.node(a).parent;
            self.node_mut(b).left = a;
            self.node_mut(b).parent = a_parent;
            self.node_mut(a).parent = b;
            if a_parent.is_null() {
                self.root = b;
            } else if self.node(a_parent).left == a {
                self.node_mut(a_parent).left = b;
            } else {
                self.node_mut(a_parent).right = b;
            }

            if self.node(d).height > self.node(e).height {
                self.node_mut(b).right = d;
                self.node_mut(a).left = e;
                self.node_mut(e).parent = a;

                let a_bounds = self.node(c).bounds.combine(&self.node(e).bounds);
                let b_bounds = a_bounds.combine(&self.node(d).bounds);
                let a_height = 1 + self.node(c).height.max(self.node(e).height);
                let b_height = 1 + a_height.max(self.node(d).height);
                self.node_mut(a).bounds = a_bounds;
                self.node_mut(a).height = a_height;
                self.node_mut(b).bounds = b_bounds;
                self.node_mut(b).height = b_height;
            } else {
                self.node_mut(b).right = e;
                self.node_mut(a).left = d;
                self.node_mut(d).parent = a;

                let a_bounds = self.node(c).bounds.combine(&self.node(d).bounds);
                let b_bounds = a_bounds.combine(&self.node(e).bounds);
                let a_height = 1 + self.node(c).height.max(self.node(d).height);
                let b_height = 1 + a_height.max(self.node(e).height);
                self.node_mut(a).bounds = a_bounds;
                self.node_mut(a).height = a_height;
                self.node_mut(b).bounds = b_bounds;
                self.node_mut(b).height = b_height;
            }
            return b;
        }

        a
    }
}

/// Pads tight bounds by the configured constant margin, plus an extra
/// margin along the direction of travel so fast bodies stay contained
/// slightly longer.
fn pad_bounds(bounds: BoundingBox, body: &Body, config: &PhysicsConfig) -> BoundingBox {
    let mut padded = bounds;
    padded.left -= config.bounds_padding;
    padded.top -= config.bounds_padding;
    padded.right += config.bounds_padding;
    padded.bottom += config.bounds_padding;

    let vel_dx = body.vel.x * config.dynamic_tree_velocity_multiplier;
    let vel_dy = body.vel.y * config.dynamic_tree_velocity_multiplier;
    if vel_dx < 0.0 {
        padded.left += vel_dx;
    } else {
        padded.right += vel_dx;
    }
    if vel_dy < 0.0 {
        padded.top += vel_dy;
    } else {
        padded.bottom += vel_dy;
    }
    padded
}
