mod app;
mod graph;
mod render;
mod scene;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::{Launch, RevealGraphApp};
use crate::scene::SceneConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph data file (center, nodes, connections, visualSettings).
    #[arg(long, default_value = "data/graph.json")]
    data: PathBuf,

    /// Entity id to center the first disclosure episode on.
    #[arg(long)]
    focus: Option<String>,

    /// JSON file overriding simulation and timing constants.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start in the all-entities view.
    #[arg(long)]
    show_all: bool,

    /// Overlay the disclosure state and reveal queue length.
    #[arg(long)]
    debug: bool,

    /// Seed for reveal shuffles.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    info!(data = %args.data.display(), focus = ?args.focus, "starting");

    let launch = Launch {
        data_path: args.data,
        config,
        deep_link: args.focus,
        show_all: args.show_all,
        debug: args.debug,
        seed: args.seed,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "reveal-graph",
        options,
        Box::new(move |cc| Ok(Box::new(RevealGraphApp::new(cc, launch)))),
    )
    .map_err(|error| anyhow!("{error}"))
}
