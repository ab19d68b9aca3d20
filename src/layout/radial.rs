//! Radial Layout Engine
//!
//! Every non-leaf node owns a ring one `level_height` further along the growth
//! axis. Its children split the ring's full turn into consecutive slices and
//! sit at the middle of their slice.

use std::f32::consts::TAU;

use crate::config::{Allocation, Orientation};
use crate::tree::{NodeId, Point3, Tree, TreeError};

#[derive(Debug, Clone, Copy)]
struct RadialParams {
    orientation: Orientation,
    allocation: Allocation,
    level_height: f32,
    base_radius_factor: f32,
}

/// Assign `base` to every node, root at the origin
///
/// Proportional allocation reads `size`, so `compute_sizes` must run first.
pub fn layout(
    tree: &mut Tree,
    orientation: Orientation,
    allocation: Allocation,
    level_height: f32,
    base_radius_factor: f32,
) -> Result<(), TreeError> {
    let root = tree.root().ok_or(TreeError::InvalidTree)?;
    let params = RadialParams {
        orientation,
        allocation,
        level_height,
        base_radius_factor,
    };

    tree.node_mut(root).base = Point3::ORIGIN;
    place_children(tree, root, Point3::ORIGIN, 0.0, &params);
    Ok(())
}

fn place_children(tree: &mut Tree, id: NodeId, origin: Point3, start_angle: f32, params: &RadialParams) {
    let children = tree.children(id).to_vec();
    if children.is_empty() {
        return;
    }

    let radius = ring_radius(tree, id, params.allocation, params.base_radius_factor);
    let center = ring_center(origin, params.orientation, params.level_height);
    let spans = child_spans(tree, id, params.allocation);

    let mut angle = start_angle;
    for (child, span) in children.into_iter().zip(spans) {
        let child_angle = angle + span / 2.0;
        let position = ring_point(center, params.orientation, radius, child_angle);
        tree.node_mut(child).base = position;

        // The child's own ring starts where the child sits
        place_children(tree, child, position, child_angle, params);
        angle += span;
    }
}

/// Weight a child contributes to its parent's ring
pub fn child_weight(tree: &Tree, id: NodeId, allocation: Allocation) -> f32 {
    match allocation {
        Allocation::Uniform => 1.0,
        Allocation::Proportional => tree.node(id).size as f32,
    }
}

/// Sum of the children's weights (`size - 1` or the child count)
pub fn total_weight(tree: &Tree, id: NodeId, allocation: Allocation) -> f32 {
    tree.children(id)
        .iter()
        .map(|&c| child_weight(tree, c, allocation))
        .sum()
}

/// Radius of the ring carrying `id`'s children
///
/// The +1.0 keeps a single-child ring from collapsing onto the axis.
pub fn ring_radius(tree: &Tree, id: NodeId, allocation: Allocation, base_radius_factor: f32) -> f32 {
    total_weight(tree, id, allocation) * base_radius_factor + 1.0
}

/// Angular span (radians) of each child of `id`, in child order; sums to a full turn
pub fn child_spans(tree: &Tree, id: NodeId, allocation: Allocation) -> Vec<f32> {
    let total = total_weight(tree, id, allocation);
    if total <= 0.0 {
        return Vec::new();
    }

    tree.children(id)
        .iter()
        .map(|&c| TAU * child_weight(tree, c, allocation) / total)
        .collect()
}

/// Center of the ring one level along the growth axis
pub fn ring_center(origin: Point3, orientation: Orientation, level_height: f32) -> Point3 {
    match orientation {
        Orientation::Vertical => Point3::new(origin.x, origin.y - level_height, origin.z),
        Orientation::Horizontal => Point3::new(origin.x + level_height, origin.y, origin.z),
    }
}

/// Point at `angle` on a ring perpendicular to the growth axis
pub fn ring_point(center: Point3, orientation: Orientation, radius: f32, angle: f32) -> Point3 {
    let (sin, cos) = angle.sin_cos();
    match orientation {
        Orientation::Vertical => Point3::new(center.x + radius * sin, center.y, center.z + radius * cos),
        Orientation::Horizontal => Point3::new(center.x, center.y + radius * sin, center.z + radius * cos),
    }
}
