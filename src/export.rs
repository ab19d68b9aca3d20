//! Headless output - frame dumps and tree statistics

use serde::Serialize;

use crate::propagate::Frame;
use crate::scene::Scene;
use crate::tree::Point3;

/// A frame dump as written by `conetree dump`
#[derive(Debug, Serialize)]
pub struct FrameDump<'a> {
    pub generated: String,
    pub source: &'a str,
    pub node_count: usize,
    pub cone_count: usize,
    #[serde(flatten)]
    pub frame: Frame<'a>,
}

/// Serialize the current frame of `scene` as pretty JSON
pub fn frame_json(scene: &mut Scene, source: &str) -> anyhow::Result<String> {
    let node_count = scene.tree.len();
    let cone_count = scene.cone_count();
    let frame = scene
        .frame()
        .ok_or_else(|| anyhow::anyhow!("Scene has no tree to propagate"))?;

    let dump = FrameDump {
        generated: chrono::Local::now().to_rfc3339(),
        source,
        node_count,
        cone_count,
        frame,
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

/// Shape and extent of a laid-out tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub nodes: usize,
    pub cones: usize,
    pub depth: usize,
    /// Subtree size of the root, i.e. every node
    pub root_size: usize,
    pub leaves: usize,
    pub widest_fan_out: usize,
    pub min: Point3,
    pub max: Point3,
}

impl TreeStats {
    pub fn collect(scene: &Scene) -> Option<Self> {
        let tree = &scene.tree;
        let (min, max) = tree.base_bounds()?;
        Some(Self {
            nodes: tree.len(),
            cones: tree.cone_count(),
            depth: tree.depth(),
            root_size: tree.root().map(|r| tree.node(r).size).unwrap_or(0),
            leaves: tree.nodes().filter(|n| n.is_leaf()).count(),
            widest_fan_out: tree.nodes().map(|n| n.children.len()).max().unwrap_or(0),
            min,
            max,
        })
    }

    pub fn print(&self) {
        println!("Nodes:          {}", self.nodes);
        println!("Cones:          {}", self.cones);
        println!("Leaves:         {}", self.leaves);
        println!("Depth:          {}", self.depth);
        println!("Root size:      {}", self.root_size);
        println!("Widest fan-out: {}", self.widest_fan_out);
        println!(
            "Bounds:         ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        );
    }
}
