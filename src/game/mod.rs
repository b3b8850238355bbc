//! # Game Module
//!
//! Obstacle entities and their lifecycle management.
//!
//! This module contains the moving parts of the subsystem:
//! - Obstacle entities with their own position lock
//! - The obstacle manager owning the live collection
//! - The cancellable background spawner
//! - The score collaborator credited for every cleared obstacle

pub mod manager;
pub mod obstacle;
pub mod score;
pub mod spawner;

pub use manager::*;
pub use obstacle::*;
pub use score::*;
pub use spawner::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Axis-aligned rectangle in playfield units.
///
/// # Examples
///
/// ```
/// use pipes::Rect;
///
/// let rect = Rect::new(10, 450, 50, 150);
/// assert_eq!(rect.right(), 60);
/// assert_eq!(rect.bottom(), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// X coordinate one past the right edge.
    pub fn right(self) -> i32 {
        self.x + self.w
    }

    /// Y coordinate one past the bottom edge.
    pub fn bottom(self) -> i32 {
        self.y + self.h
    }
}

/// Unique identifier for obstacles.
pub type ObstacleId = Uuid;

/// Creates a new unique obstacle ID.
pub fn new_obstacle_id() -> ObstacleId {
    Uuid::new_v4()
}
