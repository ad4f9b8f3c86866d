use anyhow::Context;
use bakedscene_common::Color;
use bakedscene_render::DebugTextRenderer;
use bakedscene_tools::SceneInspector;
use bakedscene_viewer::{FrameLoop, ViewerConfig, ViewerContext, load_scene_assets};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bakedscene-cli", about = "Headless tool for the baked scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding house/ and the decoder directory
    #[arg(long, global = true, default_value = "static")]
    asset_dir: PathBuf,

    /// Compressed-geometry decoder directory, relative to the asset directory
    #[arg(long, global = true, default_value = "draco")]
    decoder_dir: PathBuf,

    /// Fog and clear color, e.g. "#263740"
    #[arg(long, global = true)]
    fog_color: Option<Color>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, configuration and asset status
    Info,
    /// Load and assemble the scene, then summarize it
    Inspect {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the frame loop headless with the text renderer
    Render {
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        ticks: u64,
    },
}

fn load_viewer(config: &ViewerConfig) -> anyhow::Result<ViewerContext<DebugTextRenderer>> {
    let mut viewer = ViewerContext::new(config, DebugTextRenderer::default());
    tracing::info!("loading assets from {}", config.asset_dir.display());
    let assets = load_scene_assets(config).context("failed to load scene assets")?;
    let model = viewer
        .install_assets(assets)
        .context("failed to assemble the house model")?;
    tracing::info!("house assembled as node {}", model.short());
    Ok(viewer)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("bakedscene-cli v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ViewerConfig::with_asset_dir(cli.asset_dir);
    config.decoder_dir = cli.decoder_dir;
    if let Some(color) = cli.fog_color {
        config.fog.color = color;
    }

    match cli.command {
        Commands::Info => {
            println!("bakedscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("asset dir: {}", config.asset_dir.display());
            for path in config.required_files() {
                let status = if path.is_file() { "ok" } else { "MISSING" };
                println!("  {:<8}{}", status, path.display());
            }
            println!("decoder dir: {}", config.decoder().decoder_dir.display());
            println!(
                "fog: color={} near={:.1} far={:.1}",
                config.fog.color, config.fog.near, config.fog.far
            );
            let cam = &config.camera;
            println!(
                "camera: fov={:.0} near={} far={} pos=({:.1}, {:.1}, {:.1})",
                cam.fov_degrees, cam.near, cam.far, cam.position.x, cam.position.y, cam.position.z
            );
            let c = &config.controls;
            println!(
                "controls: damping={} ({}) zoom={} polar=[{}, {}]",
                c.enable_damping, c.damping_factor, c.enable_zoom, c.min_polar_angle, c.max_polar_angle
            );
        }
        Commands::Inspect { json } => {
            let viewer = load_viewer(&config)?;
            let summary = SceneInspector::summary(&viewer.scene, &viewer.camera);
            let nodes = SceneInspector::list_nodes(&viewer.scene);
            if json {
                let doc = serde_json::json!({
                    "summary": serde_json::to_value(&summary)?,
                    "nodes": serde_json::to_value(&nodes)?,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{summary}");
                for node in &nodes {
                    println!("  {node}");
                }
            }
        }
        Commands::Render { ticks } => {
            let mut viewer = load_viewer(&config)?;
            let mut frames = FrameLoop::default();
            tracing::info!("rendering {ticks} frames");
            let ran = frames.run_with(&mut viewer, ticks, |output| print!("{output}"));
            let stats = frames.stats();
            tracing::info!("frame loop stopped after {ran} ticks");
            println!(
                "rendered {ran} frames in {:.3}s",
                stats.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}
