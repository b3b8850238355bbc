//! # Generation Module
//!
//! Playfield configuration and the spawn policy for new obstacles.
//!
//! All playfield geometry lives in [`ObstacleConfig`], which is handed to both the
//! spawner and the painting code, so nothing downstream hard-codes sizes.

use crate::config;
use crate::game::Obstacle;
use crate::{ObstacleError, ObstacleResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the obstacle subsystem.
///
/// Controls the playfield geometry, obstacle sizes, spawn cadence and scroll
/// speed. Every field has a classic default, so a JSON file only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Playfield width; new obstacles appear at this x
    pub playfield_width: i32,
    /// Playfield height; upright obstacles stand on this line
    pub playfield_height: i32,
    /// Width of every obstacle
    pub obstacle_width: i32,
    /// Shortest obstacle height
    pub min_height: i32,
    /// Heights are drawn from `[min_height, min_height + height_span)`
    pub height_span: i32,
    /// Milliseconds between spawns
    pub spawn_interval_ms: u64,
    /// Distance travelled per update tick
    pub speed: i32,
    /// Sprite used for every obstacle
    pub texture_path: PathBuf,
    /// Seed for reproducible spawns; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl ObstacleConfig {
    /// Creates the classic 800x600 configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipes::ObstacleConfig;
    ///
    /// let config = ObstacleConfig::new();
    /// assert_eq!(config.playfield_width, 800);
    /// assert_eq!(config.speed, 2);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            playfield_width: config::PLAYFIELD_WIDTH,
            playfield_height: config::PLAYFIELD_HEIGHT,
            obstacle_width: config::OBSTACLE_WIDTH,
            min_height: config::MIN_OBSTACLE_HEIGHT,
            height_span: config::OBSTACLE_HEIGHT_SPAN,
            spawn_interval_ms: config::SPAWN_INTERVAL_MS,
            speed: config::SCROLL_SPEED,
            texture_path: PathBuf::from(config::TEXTURE_PATH),
            seed: None,
        }
    }

    /// Classic configuration with a fixed seed.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new()
        }
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> ObstacleResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> ObstacleResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Time between two spawns.
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> ObstacleResult<()> {
        let positive = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("obstacle_width", self.obstacle_width),
            ("height_span", self.height_span),
            ("speed", self.speed),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, value)| *value <= 0) {
            return Err(ObstacleError::InvalidConfig(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }

        let bounded = [
            ("playfield_width", self.playfield_width),
            ("playfield_height", self.playfield_height),
            ("obstacle_width", self.obstacle_width),
            ("min_height", self.min_height),
            ("height_span", self.height_span),
            ("speed", self.speed),
        ];
        if let Some((name, value)) = bounded.iter().find(|(_, value)| *value > config::MAX_EXTENT) {
            return Err(ObstacleError::InvalidConfig(format!(
                "{} must be at most {}, got {}",
                name,
                config::MAX_EXTENT,
                value
            )));
        }

        match self.min_height.checked_add(self.height_span) {
            Some(tallest) if tallest <= config::MAX_EXTENT => {}
            _ => {
                return Err(ObstacleError::InvalidConfig(format!(
                    "min_height + height_span must be at most {}",
                    config::MAX_EXTENT
                )))
            }
        }

        if self.min_height < 0 {
            return Err(ObstacleError::InvalidConfig(format!(
                "min_height must not be negative, got {}",
                self.min_height
            )));
        }

        if self.spawn_interval_ms == 0 {
            return Err(ObstacleError::InvalidConfig(
                "spawn_interval_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for procedural generators.
///
/// The spawner is generic over this trait, so alternative spawn policies can be
/// plugged in without touching the manager.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &ObstacleConfig, rng: &mut StdRng) -> ObstacleResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &ObstacleConfig) -> ObstacleResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Spawn policy: right edge, random height, coin-flip orientation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomObstacleGenerator;

impl RandomObstacleGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<Obstacle> for RandomObstacleGenerator {
    fn generate(&self, config: &ObstacleConfig, rng: &mut StdRng) -> ObstacleResult<Obstacle> {
        let obstacle = Obstacle::spawn(config, rng);
        self.validate(&obstacle, config)?;
        Ok(obstacle)
    }

    fn validate(&self, obstacle: &Obstacle, config: &ObstacleConfig) -> ObstacleResult<()> {
        let heights = config.min_height..config.min_height.saturating_add(config.height_span);
        if !heights.contains(&obstacle.height()) {
            return Err(ObstacleError::InvalidConfig(format!(
                "obstacle height {} outside {:?}",
                obstacle.height(),
                heights
            )));
        }
        if obstacle.width() != config.obstacle_width || obstacle.x() != config.playfield_width {
            return Err(ObstacleError::InvalidConfig(
                "obstacle does not match playfield geometry".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RandomObstacleGenerator"
    }
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates the spawn RNG, seeded from the config when it carries a seed.
    pub fn create_rng(config: &ObstacleConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
