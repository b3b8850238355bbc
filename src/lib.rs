//! # Pipes
//!
//! Obstacle ("pipe") management for a side-scrolling arcade game.
//!
//! ## Architecture Overview
//!
//! The crate is organized around a small number of cooperating pieces:
//!
//! - **Obstacle Manager**: owns the live obstacles, runs the periodic spawner and
//!   exposes the per-frame `update` / `paint` operations
//! - **Obstacle**: a single pipe with its own position lock
//! - **Generation**: playfield configuration and the random spawn policy
//! - **Rendering**: the renderer abstraction and the dispatcher that marshals every
//!   graphics call onto the thread owning the graphics context
//!
//! ## Concurrency
//!
//! The spawner runs as a tokio task that appends to the collection while the game
//! loop updates and paints it. The collection sits behind a reader/writer lock and
//! every obstacle guards its own position with a second, finer lock. Locks are
//! always taken in the order collection → obstacle.

pub mod game;
pub mod generation;
pub mod rendering;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use rendering::*;

/// Core error type for the obstacle subsystem.
#[derive(thiserror::Error, Debug)]
pub enum ObstacleError {
    /// The obstacle texture could not be loaded or decoded
    #[error("could not load texture '{name}': {source}")]
    ResourceLoad {
        name: String,
        #[source]
        source: BackendError,
    },

    /// A draw call failed
    #[error("could not draw obstacle: {source}")]
    Render {
        #[source]
        source: BackendError,
    },

    /// The thread owning the graphics context is no longer accepting work
    #[error("graphics context is unavailable")]
    GraphicsUnavailable,

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type ObstacleResult<T> = Result<T, ObstacleError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Classic playfield constants.
pub mod config {
    /// Playfield width; obstacles spawn at this x coordinate
    pub const PLAYFIELD_WIDTH: i32 = 800;

    /// Playfield height; non-inverted obstacles stand on this line
    pub const PLAYFIELD_HEIGHT: i32 = 600;

    /// Width of every obstacle
    pub const OBSTACLE_WIDTH: i32 = 50;

    /// Shortest obstacle height
    pub const MIN_OBSTACLE_HEIGHT: i32 = 100;

    /// Size of the random range added on top of the minimum height
    pub const OBSTACLE_HEIGHT_SPAN: i32 = 300;

    /// Milliseconds between two spawns
    pub const SPAWN_INTERVAL_MS: u64 = 1000;

    /// Horizontal distance travelled per update tick
    pub const SCROLL_SPEED: i32 = 2;

    /// Sprite used for every obstacle
    pub const TEXTURE_PATH: &str = "resources/imgs/pipe.png";

    /// Largest accepted playfield extent, obstacle size or speed
    pub const MAX_EXTENT: i32 = 1 << 20;
}
