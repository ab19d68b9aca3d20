//! Selection and spin animation state
//!
//! Cones are addressed by draw-order index (pre-order over non-leaf nodes).
//! Spin angles are in degrees and advance once per timer tick.

use serde::Serialize;

use crate::config::{AnimationConfig, Orientation};

/// Which cone(s) are selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "index")]
pub enum Selection {
    #[default]
    All,
    Single(usize),
}

impl Selection {
    /// All -> 0 -> 1 -> ... -> N-1 -> All
    pub fn cycle(self, cone_count: usize) -> Self {
        if cone_count == 0 {
            return self;
        }
        match self {
            Selection::All => Selection::Single(0),
            Selection::Single(i) if i + 1 < cone_count => Selection::Single(i + 1),
            Selection::Single(_) => Selection::All,
        }
    }

    /// Fall back to All when the index no longer names a cone
    pub fn clamp_to(self, cone_count: usize) -> Self {
        match self {
            Selection::Single(i) if i >= cone_count => {
                tracing::debug!(index = i, cone_count, "Selection out of range, selecting all cones");
                Selection::All
            }
            other => other,
        }
    }

    pub fn is_selected(self, cone_index: usize) -> bool {
        match self {
            Selection::All => true,
            Selection::Single(i) => i == cone_index,
        }
    }
}

/// Spin angles and the knobs driving them
#[derive(Debug, Clone)]
pub struct Animation {
    pub enabled: bool,
    /// Spin applied to every cone while all are selected
    pub spin_all: f32,
    /// Spin applied to the single selected cone
    pub spin_single: f32,
    pub speed: f32,
    /// Whole-scene rotation while all cones spin
    pub scene_yaw: f32,
    pub scene_pitch: f32,
    config: AnimationConfig,
}

impl Animation {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            enabled: config.enabled,
            spin_all: 0.0,
            spin_single: 0.0,
            speed: clamp_speed(config.speed, &config),
            scene_yaw: 0.0,
            scene_pitch: 0.0,
            config,
        }
    }

    pub fn tick_ms(&self) -> u64 {
        self.config.tick_ms.max(1)
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn slower(&mut self) {
        self.set_speed(self.speed * self.config.slower_factor);
    }

    pub fn faster(&mut self) {
        self.set_speed(self.speed * self.config.faster_factor);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_speed(speed, &self.config);
    }

    /// Advance one timer tick; returns whether anything moved
    pub fn tick(&mut self, selection: Selection, orientation: Orientation) -> bool {
        if !self.enabled {
            return false;
        }

        match selection {
            Selection::All => {
                let scene = self.config.scene_step * self.speed;
                match orientation {
                    Orientation::Vertical => self.scene_yaw = wrap_degrees(self.scene_yaw + scene),
                    Orientation::Horizontal => self.scene_pitch = wrap_degrees(self.scene_pitch + scene),
                }
                self.spin_all = wrap_degrees(self.spin_all + self.config.spin_all_step * self.speed);
            }
            Selection::Single(_) => {
                self.spin_single = wrap_degrees(self.spin_single + self.config.spin_single_step * self.speed);
            }
        }
        true
    }

    /// Spin of the cone at `cone_index` for the current frame
    pub fn spin_for(&self, selection: Selection, cone_index: usize) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        match selection {
            Selection::All => self.spin_all,
            Selection::Single(i) if i == cone_index => self.spin_single,
            Selection::Single(_) => 0.0,
        }
    }
}

/// Like `f32::clamp`, but tolerates inverted or NaN bounds
fn clamp_speed(speed: f32, config: &AnimationConfig) -> f32 {
    speed.max(config.min_speed).min(config.max_speed)
}

/// Keep an angle in [0, 360)
pub fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
