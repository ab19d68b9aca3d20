//! Application State - single owner of the tree, layout toggles and animation
//!
//! Created once at startup, mutated only by the control loop (commands and
//! timer ticks), dropped at exit.

use tracing::{debug, info};

use crate::animation::{Animation, Selection};
use crate::config::{AnimationConfig, LayoutConfig, Orientation};
use crate::layout::relayout;
use crate::propagate::{propagate, Frame};
use crate::tree::{Tree, TreeError};

/// User-level commands, independent of any key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetOrientation(Orientation),
    ToggleProportional,
    CycleSelection,
    ToggleAnimation,
    Slower,
    Faster,
    Quit,
}

/// Whether the control loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Scene {
    pub tree: Tree,
    pub layout: LayoutConfig,
    pub selection: Selection,
    pub animation: Animation,
    cone_count: usize,
}

impl Scene {
    /// Lay out `tree` once; refuses a tree without a root
    pub fn new(mut tree: Tree, layout: LayoutConfig, animation: AnimationConfig) -> Result<Self, TreeError> {
        if tree.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        relayout(&mut tree, &layout)?;
        let cone_count = tree.cone_count();

        info!(nodes = tree.len(), cones = cone_count, depth = tree.depth(), "Scene ready");
        Ok(Self {
            tree,
            layout,
            selection: Selection::All,
            animation: Animation::new(animation),
            cone_count,
        })
    }

    pub fn cone_count(&self) -> usize {
        self.cone_count
    }

    pub fn apply(&mut self, command: Command) -> Result<Flow, TreeError> {
        debug!(?command, "Applying command");
        match command {
            Command::SetOrientation(orientation) => {
                self.layout.orientation = orientation;
                self.relayout()?;
            }
            Command::ToggleProportional => {
                self.layout.allocation = self.layout.allocation.toggled();
                self.relayout()?;
            }
            Command::CycleSelection => {
                self.selection = self.selection.cycle(self.cone_count);
                info!(selection = ?self.selection, "Cone selection changed");
            }
            Command::ToggleAnimation => {
                self.animation.toggle();
                info!(enabled = self.animation.enabled, "Animation toggled");
            }
            Command::Slower => {
                self.animation.slower();
                info!(speed = self.animation.speed, "Animation speed");
            }
            Command::Faster => {
                self.animation.faster();
                info!(speed = self.animation.speed, "Animation speed");
            }
            Command::Quit => {
                info!("Quit requested");
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// One animation timer tick
    pub fn tick(&mut self) -> bool {
        self.animation.tick(self.selection, self.layout.orientation)
    }

    /// Propagate spins into world positions and collect the draw records
    pub fn frame(&mut self) -> Option<Frame<'_>> {
        if !self.update_world() {
            return None;
        }
        Some(self.capture())
    }

    /// Recompute world positions for the current spin state
    pub fn update_world(&mut self) -> bool {
        propagate(&mut self.tree, self.layout.orientation, self.selection, &self.animation)
    }

    /// Draw records from the last `update_world`
    pub fn capture(&self) -> Frame<'_> {
        Frame::capture(&self.tree, &self.layout, self.selection, &self.animation)
    }

    fn relayout(&mut self) -> Result<(), TreeError> {
        relayout(&mut self.tree, &self.layout)?;
        self.cone_count = self.tree.cone_count();
        self.selection = self.selection.clamp_to(self.cone_count);
        info!(
            orientation = ?self.layout.orientation,
            allocation = ?self.layout.allocation,
            "Layout changed"
        );
        Ok(())
    }
}
