//! Vertical Normalizer

use crate::config::Orientation;
use crate::tree::{Point3, Tree};

/// Lowest base y over all nodes
pub fn min_base_y(tree: &Tree) -> Option<f32> {
    tree.nodes().map(|n| n.base.y).reduce(f32::min)
}

/// Lift a vertical tree so its lowest node sits at `bottom_margin`
///
/// Returns the applied shift; horizontal trees are left alone (shift 0).
pub fn normalize_vertical(tree: &mut Tree, orientation: Orientation, bottom_margin: f32) -> f32 {
    if orientation != Orientation::Vertical {
        return 0.0;
    }
    let Some(min_y) = min_base_y(tree) else {
        return 0.0;
    };

    let shift = bottom_margin - min_y;
    shift_base(tree, Point3::new(0.0, shift, 0.0));
    shift
}

/// Translate every base position
pub fn shift_base(tree: &mut Tree, delta: Point3) {
    for node in tree.nodes_mut() {
        node.base += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Allocation;
    use crate::layout::{compute_sizes, layout};

    fn laid_out(orientation: Orientation) -> Tree {
        let mut tree = Tree::new("root");
        let root = tree.root().unwrap();
        let a = tree.push_child(root, "A");
        tree.push_child(root, "B");
        tree.push_child(a, "A1");
        compute_sizes(&mut tree).unwrap();
        layout(&mut tree, orientation, Allocation::Uniform, 5.0, 0.5).unwrap();
        tree
    }

    #[test]
    fn test_lowest_node_lands_on_margin() {
        let mut tree = laid_out(Orientation::Vertical);
        assert!((min_base_y(&tree).unwrap() - (-10.0)).abs() < 1e-5);

        let shift = normalize_vertical(&mut tree, Orientation::Vertical, 4.0);
        assert!((shift - 14.0).abs() < 1e-5);
        assert!((min_base_y(&tree).unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_two_leaves_example() {
        let mut tree = Tree::new("root");
        let root = tree.root().unwrap();
        tree.push_child(root, "A");
        tree.push_child(root, "B");
        compute_sizes(&mut tree).unwrap();
        layout(&mut tree, Orientation::Vertical, Allocation::Uniform, 5.0, 0.5).unwrap();

        normalize_vertical(&mut tree, Orientation::Vertical, 4.0);
        for &c in tree.children(root) {
            assert!((tree.node(c).base.y - 4.0).abs() < 1e-5);
        }
        assert!((tree.node(root).base.y - 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_idempotent() {
        let mut tree = laid_out(Orientation::Vertical);
        normalize_vertical(&mut tree, Orientation::Vertical, 4.0);
        let once: Vec<Point3> = tree.nodes().map(|n| n.base).collect();

        let second = normalize_vertical(&mut tree, Orientation::Vertical, 4.0);
        assert!(second.abs() < 1e-5);
        for (node, before) in tree.nodes().zip(once) {
            assert!(node.base.distance(&before) < 1e-5);
        }
    }

    #[test]
    fn test_horizontal_untouched() {
        let mut tree = laid_out(Orientation::Horizontal);
        let before: Vec<Point3> = tree.nodes().map(|n| n.base).collect();

        assert_eq!(normalize_vertical(&mut tree, Orientation::Horizontal, 4.0), 0.0);
        let after: Vec<Point3> = tree.nodes().map(|n| n.base).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_tree_no_shift() {
        let mut tree = Tree::default();
        assert_eq!(normalize_vertical(&mut tree, Orientation::Vertical, 4.0), 0.0);
    }
}
