//! ConeTree - 3D cone tree viewer for mind maps
//!
//! CLI commands:
//! - view: Open the interactive viewer
//! - dump: Write one laid-out frame as JSON
//! - stats: Print tree shape and extent

mod animation;
mod config;
mod export;
mod layout;
mod logging;
mod mindmap;
mod propagate;
mod scene;
mod tree;
mod viewer;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use animation::Selection;
use config::{Allocation, Config, Orientation};
use scene::Scene;

#[derive(Parser)]
#[command(name = "conetree")]
#[command(about = "3D cone tree visualization of mind maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to conetree.yaml config
    #[arg(short, long, default_value = "conetree.yaml", global = true)]
    config: PathBuf,
}

#[derive(Args)]
struct LayoutArgs {
    /// Mind-map file (.mm)
    file: PathBuf,

    /// Grow the tree to the right instead of downward
    #[arg(long)]
    horizontal: bool,

    /// Share rings by subtree size instead of equally
    #[arg(long)]
    proportional: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive 3D viewer
    View {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Lay out the tree and write the renderer-facing frame as JSON
    Dump {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Select a single cone by draw-order index
        #[arg(long)]
        select: Option<usize>,

        /// Spin (degrees) applied to the selected cone(s)
        #[arg(long)]
        spin: Option<f32>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print node/cone counts and bounds
    Stats {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let env = config::Env::load();

    // Initialize logging first
    let _log_guard = logging::init_logging(&env.log_dir)?;
    tracing::info!("ConeTree starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    let config = if cli.config.exists() {
        tracing::info!("Loading config from {:?}", cli.config);
        Config::load(&cli.config)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", cli.config);
        Config::default()
    };
    config.validate()?;

    match cli.command {
        Commands::View { layout } => {
            let scene = load_scene(&config, &layout)?;
            tracing::info!("Launching viewer");
            viewer::run_viewer(scene, config.viewer.clone(), PathBuf::from(&env.screenshot_dir))?;
        }

        Commands::Dump {
            layout,
            select,
            spin,
            output,
        } => {
            let mut scene = load_scene(&config, &layout)?;
            if let Some(index) = select {
                scene.selection = Selection::Single(index).clamp_to(scene.cone_count());
            }
            if let Some(deg) = spin {
                scene.animation.enabled = true;
                match scene.selection {
                    Selection::All => scene.animation.spin_all = animation::wrap_degrees(deg),
                    Selection::Single(_) => scene.animation.spin_single = animation::wrap_degrees(deg),
                }
            }

            let source = layout.file.display().to_string();
            let json = export::frame_json(&mut scene, &source)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote frame to {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Stats { layout } => {
            let scene = load_scene(&config, &layout)?;
            let stats = export::TreeStats::collect(&scene)
                .ok_or_else(|| anyhow::anyhow!("Tree has no nodes"))?;
            println!("{}", layout.file.display());
            stats.print();
        }
    }

    Ok(())
}

/// Parse the document and lay it out with config defaults plus CLI overrides
fn load_scene(config: &Config, args: &LayoutArgs) -> anyhow::Result<Scene> {
    let tree = mindmap::load(&args.file, config.document.child_order)?;

    let mut layout = config.layout;
    if args.horizontal {
        layout.orientation = Orientation::Horizontal;
    }
    if args.proportional {
        layout.allocation = Allocation::Proportional;
    }

    let scene = Scene::new(tree, layout, config.animation)?;
    log_scene(&args.file, &scene);
    Ok(scene)
}

fn log_scene(path: &Path, scene: &Scene) {
    tracing::info!(
        file = %path.display(),
        nodes = scene.tree.len(),
        cones = scene.cone_count(),
        orientation = ?scene.layout.orientation,
        allocation = ?scene.layout.allocation,
        "Mind map laid out"
    );
}
