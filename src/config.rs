//! Configuration loader - YAML settings + .env overrides

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Direction in which the tree grows away from the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Grows downward, rings lie in the X/Z plane
    #[default]
    Vertical,
    /// Grows rightward, rings lie in the Y/Z plane
    Horizontal,
}

/// How a node's ring is shared among its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allocation {
    /// Equal angular share per child
    #[default]
    Uniform,
    /// Share weighted by subtree size
    Proportional,
}

impl Allocation {
    pub fn toggled(self) -> Self {
        match self {
            Allocation::Uniform => Allocation::Proportional,
            Allocation::Proportional => Allocation::Uniform,
        }
    }
}

/// Where parsed children go relative to their earlier siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildOrder {
    /// Document order
    #[default]
    Append,
    /// Reverse document order
    Prepend,
}

/// Main configuration loaded from conetree.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub animation: AnimationConfig,
    pub viewer: ViewerConfig,
    pub document: DocumentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub orientation: Orientation,
    pub allocation: Allocation,
    /// Distance between a parent and its children's ring
    pub level_height: f32,
    /// Ring radius grows by this much per unit of allocated weight
    pub base_radius_factor: f32,
    /// Height of the lowest node above the ground plane (vertical only)
    pub bottom_margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            allocation: Allocation::Uniform,
            level_height: 5.0,
            base_radius_factor: 0.5,
            bottom_margin: 4.0,
        }
    }
}

/// Spin steps are in degrees per tick, before the speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub tick_ms: u64,
    pub spin_all_step: f32,
    pub spin_single_step: f32,
    pub scene_step: f32,
    pub speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub slower_factor: f32,
    pub faster_factor: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tick_ms: 20,
            spin_all_step: 2.5,
            spin_single_step: 4.0,
            scene_step: 1.0,
            speed: 1.0,
            min_speed: 0.1,
            max_speed: 10.0,
            slower_factor: 0.8,
            faster_factor: 1.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub node_radius: f32,
    pub sphere_subdivisions: u32,
    pub cone_segments: u32,
    pub label_size: f32,
    /// RGBA 0-255
    pub node_color: [u8; 4],
    pub cone_color: [u8; 4],
    pub selected_cone_color: [u8; 4],
    pub label_color: [u8; 4],
    pub background: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            node_radius: 0.2,
            sphere_subdivisions: 10,
            cone_segments: 32,
            label_size: 12.0,
            node_color: [0, 0, 255, 255],
            cone_color: [38, 140, 255, 102],
            selected_cone_color: [51, 255, 89, 178],
            label_color: [255, 255, 255, 255],
            background: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub child_order: ChildOrder,
}

/// Overrides loaded from .env
#[derive(Debug, Clone)]
pub struct Env {
    pub log_dir: String,
    pub screenshot_dir: String,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Reject values that would make layout or animation misbehave
    pub fn validate(&self) -> Result<()> {
        let anim = &self.animation;
        if !anim.min_speed.is_finite() || !anim.max_speed.is_finite() {
            bail!(
                "animation speed bounds must be finite (min_speed={}, max_speed={})",
                anim.min_speed,
                anim.max_speed
            );
        }
        if anim.min_speed <= 0.0 || anim.min_speed > anim.max_speed {
            bail!(
                "animation speed bounds must satisfy 0 < min_speed <= max_speed (min_speed={}, max_speed={})",
                anim.min_speed,
                anim.max_speed
            );
        }
        for (name, value) in [
            ("speed", anim.speed),
            ("slower_factor", anim.slower_factor),
            ("faster_factor", anim.faster_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("animation.{} must be a positive number, got {}", name, value);
            }
        }

        let layout = &self.layout;
        for (name, value) in [
            ("level_height", layout.level_height),
            ("base_radius_factor", layout.base_radius_factor),
            ("bottom_margin", layout.bottom_margin),
        ] {
            if !value.is_finite() {
                bail!("layout.{} must be finite, got {}", name, value);
            }
        }
        Ok(())
    }
}

impl Env {
    /// Load overrides from .env file and the process environment
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Env {
            log_dir: std::env::var("CONETREE_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            screenshot_dir: std::env::var("CONETREE_SCREENSHOT_DIR")
                .unwrap_or_else(|_| "screenshots".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "layout:\n  orientation: horizontal\n  level_height: 3.0\nanimation:\n  tick_ms: 40\n",
        )
        .unwrap();

        assert_eq!(config.layout.orientation, Orientation::Horizontal);
        assert_eq!(config.layout.level_height, 3.0);
        assert_eq!(config.layout.base_radius_factor, 0.5);
        assert_eq!(config.layout.bottom_margin, 4.0);
        assert_eq!(config.animation.tick_ms, 40);
        assert_eq!(config.animation.spin_all_step, 2.5);
        assert_eq!(config.document.child_order, ChildOrder::Append);
    }

    #[test]
    fn test_enum_spelling() {
        let config = Config::from_yaml(
            "layout:\n  allocation: proportional\ndocument:\n  child_order: prepend\n",
        )
        .unwrap();
        assert_eq!(config.layout.allocation, Allocation::Proportional);
        assert_eq!(config.document.child_order, ChildOrder::Prepend);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_speed_bounds_rejected() {
        let config = Config::from_yaml("animation:\n  min_speed: 5.0\n  max_speed: 1.0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_speed"));
    }

    #[test]
    fn test_non_finite_and_non_positive_values_rejected() {
        let config = Config::from_yaml("animation:\n  max_speed: .nan\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_yaml("animation:\n  slower_factor: 0.0\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_yaml("animation:\n  faster_factor: -1.25\n").unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_yaml("layout:\n  level_height: .inf\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_allocation_toggle() {
        assert_eq!(Allocation::Uniform.toggled(), Allocation::Proportional);
        assert_eq!(Allocation::Proportional.toggled(), Allocation::Uniform);
    }
}
