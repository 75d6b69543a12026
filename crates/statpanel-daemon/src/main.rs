//! Statpanel Daemon
//!
//! Drives an SPI status display with an I2C touch panel: renders the screens
//! described by the layout, navigates on touch and sleeps when idle.

mod app;
mod clock;
mod config;
mod device;
mod layout;
mod monitor;
mod rendering;
mod screenshot;
mod sources;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clock::SystemClock;
use config::Config;
use layout::Layout;
use monitor::{Command, LoopSettings, Monitor};
use rendering::ScreenRenderer;
use statpanel_hw::{CoordinateMapper, MirrorConvention, Orientation};

#[derive(Parser)]
#[command(name = "statpaneld")]
#[command(about = "System status display daemon")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Daemon configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the panel (default)
    Run,
    /// Render every screen to PNG files
    Screenshots {
        /// Regenerate whenever the layout file changes
        #[arg(long)]
        watch: bool,
    },
    /// Validate the layout against the data source registry
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&cli.config).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", cli.config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Screenshots { watch } => screenshots(config, watch).await,
        Commands::Check => check(config),
    }
}

/// Logs layout problems and returns how many were found.
fn validate(layout: &Layout, registry: &sources::Registry) -> usize {
    let issues = registry.validate(layout);
    for issue in &issues {
        warn!("Layout problem: {}", issue);
    }
    issues.len()
}

fn logical_size(config: &Config) -> (u16, u16) {
    Orientation::from_degrees(config.display.orientation).dimensions()
}

async fn run(config: Config) -> Result<()> {
    let layout = Layout::load_or_empty(Path::new(&config.layout));
    let registry = sources::builtin();
    validate(&layout, &registry);
    info!(
        "{} screens, sleep after {:?}",
        layout.screens.len(),
        layout.inactivity_timeout()
    );

    let orientation = Orientation::from_degrees(config.display.orientation);
    let mirror: MirrorConvention = config.touch.mirror.parse().unwrap_or_else(|e| {
        warn!("{}; using none", e);
        MirrorConvention::None
    });
    let renderer = ScreenRenderer::new(layout, Path::new(&config.assets), orientation.dimensions())?;

    let mut display = device::open_display(&config.display)?;
    monitor::power_on(&mut display);
    let touch = device::open_touch(&config.touch, &config.display.gpio_chip)?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down"),
        }
        signal_stop.store(true, Ordering::SeqCst);
    });

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    // Plain thread: a blocked stdin read must not hold up runtime shutdown
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().eq_ignore_ascii_case("s") && command_tx.send(Command::Screenshot).is_err() {
                break;
            }
        }
    });
    info!("Type 's' and Enter to take a screenshot");

    let mut monitor = Monitor::new(
        display,
        touch,
        SystemClock,
        CoordinateMapper::new(orientation, mirror),
        renderer,
        Box::new(registry),
        LoopSettings {
            poll_interval: config.poll_interval(),
            debounce: config.debounce(),
            screenshots: config.screenshots.clone().into(),
        },
    );
    monitor.run(&stop, &mut command_rx).await;
    info!("Cleanup complete");
    Ok(())
}

async fn screenshots(config: Config, watch: bool) -> Result<()> {
    let layout_path = Path::new(&config.layout);
    let assets = Path::new(&config.assets);
    let out = Path::new(&config.screenshots);
    let size = logical_size(&config);
    let registry = sources::builtin();

    let layout = Layout::load(layout_path)?;
    validate(&layout, &registry);
    let mut renderer = ScreenRenderer::new(layout, assets, size)?;
    screenshot::generate_all(&mut renderer, &registry, out)?;

    if watch {
        screenshot::watch(layout_path, assets, out, size, &registry).await?;
    }
    Ok(())
}

fn check(config: Config) -> Result<()> {
    let layout = Layout::load(Path::new(&config.layout))?;
    let registry = sources::builtin();
    let problems = validate(&layout, &registry);

    if let Err(e) = config.touch.mirror.parse::<MirrorConvention>() {
        error!("{}", e);
        bail!("Configuration is invalid");
    }
    if problems > 0 {
        bail!("{} layout problem(s) found", problems);
    }
    info!(
        "{} ok: {} screens, data sources: {}",
        config.layout,
        layout.screens.len(),
        registry.names().join(", ")
    );
    Ok(())
}
