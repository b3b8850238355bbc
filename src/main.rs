//! # Pipes Main Entry Point
//!
//! Opens a macroquad window, starts the obstacle manager and drives it once per
//! frame.

use clap::Parser;
use log::{error, info, warn};
use macroquad::prelude::*;
use pipes::{
    GraphicsContext, MacroquadRenderer, ObstacleConfig, ObstacleManager, ObstacleResult,
    Scoreboard,
};
use std::path::PathBuf;

/// Command line arguments for the pipes demo.
#[derive(Parser, Debug)]
#[command(name = "pipes")]
#[command(about = "Scrolling obstacles for a side-scrolling arcade game")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for obstacle generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Pipes".to_string(),
        window_width: pipes::config::PLAYFIELD_WIDTH,
        window_height: pipes::config::PLAYFIELD_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> ObstacleResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting pipes v{}", pipes::VERSION);

    let mut config = match &args.config {
        Some(path) => ObstacleConfig::from_json_file(path)?,
        None => ObstacleConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    run_game(config).await
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }
}

/// Runs the main game loop.
async fn run_game(config: ObstacleConfig) -> ObstacleResult<()> {
    // Hosts the spawner; the game loop itself stays on the macroquad thread
    let runtime = tokio::runtime::Runtime::new()?;

    let graphics = GraphicsContext::new(MacroquadRenderer::new());
    let obstacles = ObstacleManager::new(graphics.clone(), config, runtime.handle())?;
    let mut score = Scoreboard::new();

    info!("Press SPACE to restart, ESC to quit");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            info!("Player quit the game");
            break;
        }
        if is_key_pressed(KeyCode::Space) {
            obstacles.restart();
            score.restart();
        }

        clear_background(SKYBLUE);

        // Draw calls queued from other threads land in this frame
        graphics.pump();

        obstacles.update(&mut score);
        if let Err(e) = obstacles.paint() {
            warn!("Skipping obstacle frame: {}", e);
        }

        draw_text(
            &format!("Score: {}  Best: {}", score.points(), score.best()),
            10.0,
            30.0,
            30.0,
            WHITE,
        );

        next_frame().await;
    }

    runtime.block_on(obstacles.destroy());
    if graphics.pump() > 0 {
        error!("Graphics jobs were still queued at shutdown");
    }

    info!("Game loop ended");
    Ok(())
}
