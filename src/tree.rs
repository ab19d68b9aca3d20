//! Tree Model - arena of mind-map nodes
//!
//! Nodes are addressed by `NodeId` handles. The shape is fixed once built;
//! only the cached subtree size and the base/world positions change.

use serde::Serialize;
use std::ops::{Add, AddAssign, Sub};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Failed to load document {path}: {reason}")]
    DocumentLoad { path: String, reason: String },
    #[error("Document has no root node")]
    EmptyTree,
    #[error("Tree has no root")]
    InvalidTree,
}

/// 3D point / offset in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        let d = *self - *other;
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }
}

impl Add for Point3 {
    type Output = Point3;

    fn add(self, rhs: Point3) -> Point3 {
        Point3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point3 {
    fn add_assign(&mut self, rhs: Point3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Handle to a node inside a `Tree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One mind-map entry
#[derive(Debug, Clone)]
pub struct Node {
    pub text: String,
    pub children: Vec<NodeId>,
    /// Subtree size, valid after `compute_sizes`
    pub size: usize,
    /// Position from the static layout pass
    pub base: Point3,
    /// Position for the current frame
    pub world: Point3,
}

impl Node {
    fn new(text: String) -> Self {
        Self {
            text,
            children: Vec::new(),
            size: 1,
            base: Point3::ORIGIN,
            world: Point3::ORIGIN,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Tree {
    /// Tree with a single root node
    pub fn new(root_text: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_text.into())],
            root: Some(NodeId(0)),
        }
    }

    /// Append a child at the end of `parent`'s children
    pub fn push_child(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(text.into()));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Insert a child in front of `parent`'s existing children
    pub fn prepend_child(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(text.into()));
        self.nodes[parent.0].children.insert(0, id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Node ids in draw order (pre-order over the stored child order)
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Reverse so the first child is visited first
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Number of cones, i.e. non-leaf nodes
    pub fn cone_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_leaf()).count()
    }

    /// Number of levels below the root (0 for a lone root)
    pub fn depth(&self) -> usize {
        fn depth_of(tree: &Tree, id: NodeId) -> usize {
            tree.children(id)
                .iter()
                .map(|&c| 1 + depth_of(tree, c))
                .max()
                .unwrap_or(0)
        }

        self.root.map(|r| depth_of(self, r)).unwrap_or(0)
    }

    /// Axis-aligned bounds of the base positions as (min, max)
    pub fn base_bounds(&self) -> Option<(Point3, Point3)> {
        bounds(self.nodes.iter().map(|n| n.base))
    }
}

fn bounds(points: impl Iterator<Item = Point3>) -> Option<(Point3, Point3)> {
    let mut result: Option<(Point3, Point3)> = None;
    for p in points {
        let (min, max) = result.get_or_insert((p, p));
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
        max.z = max.z.max(p.z);
    }
    result
}
