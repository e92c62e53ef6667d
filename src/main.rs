//! cubedeck - Rust demo harness for a tactile cube toy platform
//!
//! Tracks cube lifecycle (connect/disconnect/reconnect), mirrors the
//! neighbor adjacency reported by the hardware, gates scene entry on asset
//! loading, and turns edge changes into side-bar drawing and sound cues.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod events;
mod hw;
mod neighborhood;
mod runtime;
mod sets;

use crate::config::AppConfig;
use crate::hw::{ConsoleAudio, ConsoleSurface, Scenario, ScenarioPlayer, SimLoader};
use crate::runtime::Runtime;

/// Number of completion polls the simulated asset transfer takes.
const SIM_LOADER_POLLS: u32 = 8;

/// Cubedeck - cube lifecycle and adjacency demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Scenario file, overriding the one named in the config
    #[arg(long)]
    scenario: Option<String>,

    /// Stop after this many frames (default: run until Ctrl+C)
    #[arg(long)]
    frames: Option<u64>,

    /// Print the parsed scenario and exit
    #[arg(long)]
    list_scenario: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("Starting cubedeck...");

    // A missing config file is fine for the demo: defaults cover everything.
    let config = if Path::new(&args.config).exists() {
        let config = AppConfig::load(&args.config).await?;
        info!("Configuration loaded from {}", args.config);
        config
    } else {
        warn!("Config file {} not found, using defaults", args.config);
        AppConfig::default()
    };

    let scenario_path = args.scenario.as_ref().or(config.scenario.as_ref());
    let scenario = match scenario_path {
        Some(path) => {
            let scenario = Scenario::load(path, config.capacity).await?;
            info!("Scenario loaded from {}", path);
            scenario
        }
        None => {
            info!("No scenario configured, using the built-in demo");
            Scenario::demo()
        }
    };

    if args.list_scenario {
        print_scenario(&scenario);
        return Ok(());
    }

    run_app(config, scenario, args.frames, shutdown_signal()).await?;

    info!("cubedeck shutdown complete");
    Ok(())
}

async fn run_app(
    config: AppConfig,
    scenario: Scenario,
    max_frames: Option<u64>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let (tx, rx) = mpsc::channel(256);

    let surface = Arc::new(ConsoleSurface::new());
    let audio = Arc::new(ConsoleAudio::new());
    let loader = Arc::new(SimLoader::new(SIM_LOADER_POLLS));

    let mut runtime = Runtime::new(&config, surface, audio, loader, rx);

    let music_volume = config.audio.music.then_some(config.audio.music_volume);
    runtime.startup(&scenario.initial, music_volume).await?;

    let frame_interval = Duration::from_millis(config.timing.frame_ms);
    let player = ScenarioPlayer::spawn(scenario, tx, frame_interval);

    info!("Ready, entering frame loop");
    runtime.run(frame_interval, max_frames, shutdown).await?;

    player.abort();
    Ok(())
}

fn print_scenario(scenario: &Scenario) {
    use colored::*;

    println!("\n{}", "=== Scenario ===".bold().cyan());
    println!(
        "  initial cubes: {}",
        format!("{:?}", scenario.initial).green()
    );
    println!("  steps: {}", scenario.steps.len().to_string().green());
    for step in &scenario.steps {
        println!(
            "  frame {}: {:?}",
            format!("{:>4}", step.frame).yellow(),
            step.event
        );
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
