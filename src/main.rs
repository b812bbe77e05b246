// Headless demo runner for the `window_mosaic` library: plays an image
// sequence against the in-memory surface backend and logs what a real
// window-system backend would be doing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use window_mosaic::pipeline::{FsImageSource, InMemorySurfaceFactory};
use window_mosaic::{Player, PlayerConfig};

/// Play an image sequence as a mosaic of on-screen surfaces covering each
/// frame's dark regions.
#[derive(Debug, Parser)]
#[command(name = "window_mosaic", version, about)]
struct Args {
    /// Folder containing the image sequence (jpg/jpeg/png/bmp).
    folder: PathBuf,
    /// Display width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,
    /// Display height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,
    /// Sampling step in pixels per grid cell (20-50 recommended).
    #[arg(long, default_value_t = 25)]
    step_size: u32,
    /// Brightness below which a cell counts as dark (0.0-1.0).
    #[arg(long, default_value_t = 0.4)]
    threshold: f32,
    /// Pool growth ratio that triggers a full surface rebuild.
    #[arg(long, default_value_t = 1.9)]
    reset_ratio: f64,
    /// Frame interval in milliseconds (40 = 25 fps).
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,
    /// Keep the process alive after the sequence finishes.
    #[arg(long)]
    stay_open: bool,
    /// Log every frame instead of just playback milestones.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to install logger")?;

    let config = PlayerConfig {
        display_width: args.width,
        display_height: args.height,
        step_size: args.step_size,
        brightness_threshold: args.threshold,
        reset_ratio: args.reset_ratio,
        frame_interval: Duration::from_millis(args.interval_ms),
        auto_close_when_finished: !args.stay_open,
    };

    let mut player = Player::new(
        config.clone(),
        &args.folder,
        FsImageSource,
        InMemorySurfaceFactory::new(),
    )
    .with_context(|| format!("cannot play {}", args.folder.display()))?;

    player.run().await?;
    info!(
        "surface churn: {} created, {} destroyed, {} moved",
        player.pipeline().factory().created,
        player.pipeline().factory().destroyed,
        player.pipeline().factory().repositioned,
    );

    if !config.auto_close_when_finished {
        info!("sequence finished; waiting for ctrl-c");
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
