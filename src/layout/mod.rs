//! Layout passes - subtree sizes, radial placement, vertical normalization
//!
//! - size: bottom-up subtree sizes (weights for proportional allocation)
//! - radial: top-down base positions on rings around the growth axis
//! - normalize: lift a vertical tree so it sits above the ground plane

pub mod normalize;
pub mod radial;
pub mod size;

pub use normalize::*;
pub use radial::*;
pub use size::*;

use crate::config::LayoutConfig;
use crate::tree::{Tree, TreeError};

/// Run the full static pipeline: sizes, placement, then normalization
///
/// Returns the root's subtree size.
pub fn relayout(tree: &mut Tree, config: &LayoutConfig) -> Result<usize, TreeError> {
    let total = compute_sizes(tree)?;
    layout(
        tree,
        config.orientation,
        config.allocation,
        config.level_height,
        config.base_radius_factor,
    )?;
    let shift = normalize_vertical(tree, config.orientation, config.bottom_margin);

    tracing::debug!(
        nodes = total,
        orientation = ?config.orientation,
        allocation = ?config.allocation,
        shift,
        "Layout recomputed"
    );
    Ok(total)
}
