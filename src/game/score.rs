//! # Score
//!
//! Collaborator credited once for every obstacle that scrolls off the playfield.

use serde::{Deserialize, Serialize};

/// Receives a point for every cleared obstacle.
pub trait Score {
    /// Credits one point.
    fn increase(&mut self);
}

/// Simple point counter that remembers the best run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    points: u32,
    best: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points in the current run.
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Highest point total seen so far.
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Starts a new run, keeping the best score.
    pub fn restart(&mut self) {
        self.points = 0;
    }
}

impl Score for Scoreboard {
    fn increase(&mut self) {
        self.points += 1;
        self.best = self.best.max(self.points);
    }
}
