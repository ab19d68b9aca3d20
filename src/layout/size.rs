//! Subtree Size Aggregator

use crate::tree::{NodeId, Tree, TreeError};

/// Set `size` on every node (1 + sum of children) and return the root's size
pub fn compute_sizes(tree: &mut Tree) -> Result<usize, TreeError> {
    let root = tree.root().ok_or(TreeError::InvalidTree)?;
    Ok(size_of(tree, root))
}

fn size_of(tree: &mut Tree, id: NodeId) -> usize {
    let children = tree.children(id).to_vec();
    let size = 1 + children.into_iter().map(|c| size_of(tree, c)).sum::<usize>();
    tree.node_mut(id).size = size;
    size
}
