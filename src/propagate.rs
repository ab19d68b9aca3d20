//! Axis-Rotation Propagator
//!
//! Each frame, world positions are rebuilt top-down from the static layout:
//! a child's offset from its parent (in layout space) is rotated about the
//! parent cone's growth axis by that cone's spin, then anchored to the
//! parent's already-rotated world position. Spinning a cone therefore carries
//! its whole subtree rigidly and never disturbs ancestors or siblings.

use serde::Serialize;

use crate::animation::{Animation, Selection};
use crate::config::{LayoutConfig, Orientation};
use crate::layout::{ring_center, ring_radius};
use crate::tree::{NodeId, Point3, Tree};

/// Rotate an offset about the growth axis by `deg` degrees
///
/// Vertical turns (x, z) about Y, horizontal turns (y, z) about X.
pub fn rotate_about_axis(offset: Point3, deg: f32, orientation: Orientation) -> Point3 {
    let (s, c) = deg.to_radians().sin_cos();
    match orientation {
        Orientation::Vertical => Point3::new(
            offset.x * c - offset.z * s,
            offset.y,
            offset.x * s + offset.z * c,
        ),
        Orientation::Horizontal => Point3::new(
            offset.x,
            offset.y * c - offset.z * s,
            offset.y * s + offset.z * c,
        ),
    }
}

/// Assign `world` to every node for the current spin state
///
/// Returns false (and touches nothing) when the tree has no root.
pub fn propagate(tree: &mut Tree, orientation: Orientation, selection: Selection, animation: &Animation) -> bool {
    let Some(root) = tree.root() else {
        return false;
    };

    let origin = tree.node(root).base;
    tree.node_mut(root).world = origin;

    let mut cone_index = 0;
    carry(tree, root, orientation, selection, animation, &mut cone_index);
    true
}

fn carry(
    tree: &mut Tree,
    id: NodeId,
    orientation: Orientation,
    selection: Selection,
    animation: &Animation,
    cone_index: &mut usize,
) {
    let children = tree.children(id).to_vec();
    if children.is_empty() {
        return;
    }

    let spin = animation.spin_for(selection, *cone_index);
    *cone_index += 1;

    let (base, world) = {
        let node = tree.node(id);
        (node.base, node.world)
    };

    for child in children {
        let mut offset = tree.node(child).base - base;
        if spin != 0.0 {
            offset = rotate_about_axis(offset, spin, orientation);
        }
        tree.node_mut(child).world = world + offset;
        carry(tree, child, orientation, selection, animation, cone_index);
    }
}

/// One node as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct NodeFrame<'a> {
    pub id: usize,
    pub text: &'a str,
    pub position: Point3,
}

/// One cone as the renderer sees it
#[derive(Debug, Clone, Serialize)]
pub struct ConeFrame {
    /// Draw-order index, the one selection refers to
    pub index: usize,
    pub node: usize,
    /// Narrow end, at the parent node
    pub apex: Point3,
    pub base_center: Point3,
    pub radius: f32,
    pub height: f32,
    pub selected: bool,
    /// Degrees about the growth axis
    pub spin: f32,
}

/// Everything needed to draw one frame without any layout knowledge
#[derive(Debug, Clone, Serialize)]
pub struct Frame<'a> {
    pub orientation: Orientation,
    pub selection: Selection,
    pub nodes: Vec<NodeFrame<'a>>,
    pub cones: Vec<ConeFrame>,
}

impl<'a> Frame<'a> {
    /// Collect draw records from the world positions left by `propagate`
    pub fn capture(tree: &'a Tree, layout: &LayoutConfig, selection: Selection, animation: &Animation) -> Self {
        let order = tree.pre_order();
        let mut nodes = Vec::with_capacity(order.len());
        let mut cones = Vec::with_capacity(tree.cone_count());

        for id in order {
            let node = tree.node(id);
            nodes.push(NodeFrame {
                id: id.index(),
                text: &node.text,
                position: node.world,
            });

            if node.is_leaf() {
                continue;
            }
            let index = cones.len();
            cones.push(ConeFrame {
                index,
                node: id.index(),
                apex: node.world,
                base_center: ring_center(node.world, layout.orientation, layout.level_height),
                radius: ring_radius(tree, id, layout.allocation, layout.base_radius_factor),
                height: layout.level_height,
                selected: selection.is_selected(index),
                spin: animation.spin_for(selection, index),
            });
        }

        Frame {
            orientation: layout.orientation,
            selection,
            nodes,
            cones,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimationConfig, LayoutConfig};
    use crate::layout::relayout;

    const EPS: f32 = 1e-4;

    fn close(a: Point3, b: Point3) -> bool {
        a.distance(&b) < EPS
    }

    /// root -> [A -> [A1, A2], B -> [B1]], with sizes and layout applied
    fn sample(orientation: Orientation) -> (Tree, LayoutConfig) {
        let mut tree = Tree::new("root");
        let root = tree.root().unwrap();
        let a = tree.push_child(root, "A");
        tree.push_child(a, "A1");
        tree.push_child(a, "A2");
        let b = tree.push_child(root, "B");
        tree.push_child(b, "B1");

        let config = LayoutConfig {
            orientation,
            ..LayoutConfig::default()
        };
        relayout(&mut tree, &config).unwrap();
        (tree, config)
    }

    fn animation(spin_all: f32, spin_single: f32) -> Animation {
        let mut anim = Animation::new(AnimationConfig {
            enabled: true,
            ..AnimationConfig::default()
        });
        anim.spin_all = spin_all;
        anim.spin_single = spin_single;
        anim
    }

    fn find(tree: &Tree, text: &str) -> NodeId {
        tree.pre_order()
            .into_iter()
            .find(|&id| tree.node(id).text == text)
            .unwrap()
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_about_axis(Point3::new(1.0, 2.0, 0.0), 90.0, Orientation::Vertical);
        assert!(close(v, Point3::new(0.0, 2.0, 1.0)));

        let h = rotate_about_axis(Point3::new(2.0, 1.0, 0.0), 90.0, Orientation::Horizontal);
        assert!(close(h, Point3::new(2.0, 0.0, 1.0)));
    }

    #[test]
    fn test_identity_when_disabled() {
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let (mut tree, _) = sample(orientation);
            let mut anim = animation(45.0, 90.0);
            anim.enabled = false;

            assert!(propagate(&mut tree, orientation, Selection::All, &anim));
            for node in tree.nodes() {
                assert_eq!(node.world, node.base);
            }
        }
    }

    #[test]
    fn test_identity_when_spins_zero() {
        let (mut tree, _) = sample(Orientation::Vertical);
        let anim = animation(0.0, 0.0);
        propagate(&mut tree, Orientation::Vertical, Selection::Single(1), &anim);
        for node in tree.nodes() {
            assert!(close(node.world, node.base));
        }
    }

    #[test]
    fn test_single_cone_spin_is_rigid() {
        let (mut tree, _) = sample(Orientation::Vertical);
        // Cone 1 is A's cone (pre-order: root, A, B)
        let anim = animation(0.0, 37.0);
        propagate(&mut tree, Orientation::Vertical, Selection::Single(1), &anim);

        let a = find(&tree, "A");
        for &c in tree.children(a) {
            let expected = tree.node(a).world
                + rotate_about_axis(tree.node(c).base - tree.node(a).base, 37.0, Orientation::Vertical);
            assert!(close(tree.node(c).world, expected));
            // Rotation about Y keeps the height
            assert!((tree.node(c).world.y - tree.node(c).base.y).abs() < EPS);
        }

        for text in ["root", "A", "B", "B1"] {
            let node = tree.node(find(&tree, text));
            assert!(close(node.world, node.base), "{} moved", text);
        }
    }

    #[test]
    fn test_ancestor_spin_carries_descendants() {
        let (mut tree, _) = sample(Orientation::Horizontal);
        let anim = animation(0.0, 60.0);
        propagate(&mut tree, Orientation::Horizontal, Selection::Single(0), &anim);

        let root = tree.root().unwrap();
        let root_pos = tree.node(root).base;
        assert!(close(tree.node(root).world, root_pos));

        for &child in tree.children(root) {
            let node = tree.node(child);
            let expected = root_pos + rotate_about_axis(node.base - root_pos, 60.0, Orientation::Horizontal);
            assert!(close(node.world, expected));
            assert!((node.world.x - node.base.x).abs() < EPS);

            // Grandchildren keep their unspun offsets, anchored to the moved parent
            for &grandchild in tree.children(child) {
                let g = tree.node(grandchild);
                assert!(close(g.world, node.world + (g.base - node.base)));
            }
        }
    }

    #[test]
    fn test_nested_spins_compose() {
        let (mut tree, _) = sample(Orientation::Vertical);
        let anim = animation(30.0, 0.0);
        propagate(&mut tree, Orientation::Vertical, Selection::All, &anim);

        let root = tree.root().unwrap();
        let a = find(&tree, "A");
        let a1 = find(&tree, "A1");

        let a_world = tree.node(root).base
            + rotate_about_axis(tree.node(a).base - tree.node(root).base, 30.0, Orientation::Vertical);
        let a1_world = a_world
            + rotate_about_axis(tree.node(a1).base - tree.node(a).base, 30.0, Orientation::Vertical);
        assert!(close(tree.node(a).world, a_world));
        assert!(close(tree.node(a1).world, a1_world));
    }

    #[test]
    fn test_two_leaves_quarter_turn() {
        let mut tree = Tree::new("root");
        let root = tree.root().unwrap();
        let a = tree.push_child(root, "A");
        let b = tree.push_child(root, "B");
        let config = LayoutConfig::default();
        relayout(&mut tree, &config).unwrap();

        let anim = animation(0.0, 90.0);
        propagate(&mut tree, Orientation::Vertical, Selection::Single(0), &anim);

        let root_base = tree.node(root).base;
        assert!(close(tree.node(root).world, root_base));
        // A starts at +X (angle pi/2), B at -X; a quarter turn sends them to +Z / -Z
        assert!(close(tree.node(a).world - root_base, Point3::new(0.0, -5.0, 2.0)));
        assert!(close(tree.node(b).world - root_base, Point3::new(0.0, -5.0, -2.0)));
    }

    #[test]
    fn test_frame_cones_follow_draw_order() {
        let (mut tree, config) = sample(Orientation::Vertical);
        let anim = animation(10.0, 20.0);
        let selection = Selection::Single(2);
        propagate(&mut tree, config.orientation, selection, &anim);

        let frame = Frame::capture(&tree, &config, selection, &anim);
        assert_eq!(frame.nodes.len(), 6);
        assert_eq!(frame.cones.len(), tree.cone_count());

        let owners: Vec<&str> = frame
            .cones
            .iter()
            .map(|c| tree.nodes().nth(c.node).unwrap().text.as_str())
            .collect();
        assert_eq!(owners, ["root", "A", "B"]);

        let selected: Vec<bool> = frame.cones.iter().map(|c| c.selected).collect();
        assert_eq!(selected, [false, false, true]);
        assert_eq!(frame.cones[2].spin, 20.0);
        assert_eq!(frame.cones[0].spin, 0.0);

        let root_cone = &frame.cones[0];
        assert!((root_cone.radius - 2.0).abs() < EPS);
        assert_eq!(root_cone.height, config.level_height);
        assert!(close(root_cone.base_center, root_cone.apex - Point3::new(0.0, config.level_height, 0.0)));
    }

    #[test]
    fn test_empty_tree_skips_frame() {
        let mut tree = Tree::default();
        assert!(!propagate(&mut tree, Orientation::Vertical, Selection::All, &animation(1.0, 1.0)));
    }
}
