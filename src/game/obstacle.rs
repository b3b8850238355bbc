//! # Obstacle
//!
//! A single pipe. Size and orientation are fixed at spawn; the horizontal
//! position is the only mutable state and sits behind the obstacle's own lock.

use crate::game::{new_obstacle_id, ObstacleId, Rect};
use crate::generation::ObstacleConfig;
use crate::rendering::{DrawParams, Flip, GraphicsContext, Renderer, TextureId};
use crate::{ObstacleError, ObstacleResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// A pipe moving from the right edge of the playfield towards the left.
#[derive(Debug)]
pub struct Obstacle {
    id: ObstacleId,
    x: RwLock<i32>,
    h: i32,
    w: i32,
    inverted: bool,
}

/// Copy of an obstacle's state taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub id: ObstacleId,
    pub x: i32,
    pub h: i32,
    pub w: i32,
    pub inverted: bool,
}

impl ObstacleSnapshot {
    /// Destination rectangle and mirroring for this obstacle.
    ///
    /// Upright pipes stand on the bottom edge; inverted pipes hang from the top
    /// and are flipped vertically.
    pub fn placement(&self, playfield_height: i32) -> (Rect, Flip) {
        if self.inverted {
            (Rect::new(self.x, 0, self.w, self.h), Flip::Vertical)
        } else {
            (
                Rect::new(self.x, playfield_height - self.h, self.w, self.h),
                Flip::None,
            )
        }
    }
}

impl Obstacle {
    /// Creates an obstacle with explicit geometry.
    pub fn new(x: i32, h: i32, w: i32, inverted: bool) -> Self {
        Self {
            id: new_obstacle_id(),
            x: RwLock::new(x),
            h,
            w,
            inverted,
        }
    }

    /// Spawns an obstacle at the right edge of the playfield.
    ///
    /// Height is `min_height` plus a uniform draw from `[0, height_span)` and the
    /// obstacle is inverted with probability one half.
    ///
    /// # Examples
    ///
    /// ```
    /// use pipes::{Obstacle, ObstacleConfig};
    ///
    /// let config = ObstacleConfig::default();
    /// let obstacle = Obstacle::spawn(&config, &mut rand::thread_rng());
    /// assert_eq!(obstacle.x(), 800);
    /// assert_eq!(obstacle.width(), 50);
    /// assert!((100..400).contains(&obstacle.height()));
    /// ```
    pub fn spawn<G: Rng>(config: &ObstacleConfig, rng: &mut G) -> Self {
        Self::new(
            config.playfield_width,
            config.min_height + rng.gen_range(0..config.height_span),
            config.obstacle_width,
            rng.gen_bool(0.5),
        )
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    /// Current horizontal position.
    pub fn x(&self) -> i32 {
        *self.x.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Moves the obstacle left by `speed` and returns the new position.
    pub fn advance(&self, speed: i32) -> i32 {
        let mut x = self.x.write().unwrap_or_else(PoisonError::into_inner);
        *x = x.saturating_sub(speed);
        *x
    }

    /// True once the right edge has passed the left edge of the playfield.
    pub fn is_off_screen(&self) -> bool {
        self.x().saturating_add(self.w) <= 0
    }

    /// Copies the current state under the position lock.
    pub fn snapshot(&self) -> ObstacleSnapshot {
        let x = self.x.read().unwrap_or_else(PoisonError::into_inner);
        ObstacleSnapshot {
            id: self.id,
            x: *x,
            h: self.h,
            w: self.w,
            inverted: self.inverted,
        }
    }

    /// Draws the obstacle with `texture` through the graphics thread.
    ///
    /// Issues exactly one textured-rectangle draw.
    pub fn paint<R>(
        &self,
        graphics: &GraphicsContext<R>,
        texture: TextureId,
        playfield_height: i32,
    ) -> ObstacleResult<()>
    where
        R: Renderer + Send + 'static,
    {
        let (dest, flip) = self.snapshot().placement(playfield_height);
        let params = DrawParams::new(dest, flip);

        graphics
            .run(move |renderer| renderer.copy_ex(texture, &params))?
            .map_err(|source| ObstacleError::Render { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;
    use crate::rendering::RecordingRenderer;
    use std::path::Path;

    #[test]
    fn test_spawn_policy() {
        let config = ObstacleConfig::for_testing(7);
        let mut rng = create_rng(&config);

        for _ in 0..500 {
            let obstacle = Obstacle::spawn(&config, &mut rng);
            assert_eq!(obstacle.x(), 800);
            assert_eq!(obstacle.width(), 50);
            assert!(obstacle.height() >= 100 && obstacle.height() < 400);
        }
    }

    #[test]
    fn test_spawn_produces_both_orientations() {
        let config = ObstacleConfig::for_testing(11);
        let mut rng = create_rng(&config);

        let inverted = (0..200)
            .filter(|_| Obstacle::spawn(&config, &mut rng).is_inverted())
            .count();
        assert!(inverted > 0 && inverted < 200);
    }

    #[test]
    fn test_advance_only_moves_x() {
        let obstacle = Obstacle::new(10, 150, 50, false);
        assert_eq!(obstacle.advance(2), 8);

        let snapshot = obstacle.snapshot();
        assert_eq!(snapshot.x, 8);
        assert_eq!(snapshot.h, 150);
        assert_eq!(snapshot.w, 50);
        assert!(!snapshot.inverted);
    }

    #[test]
    fn test_off_screen_boundary() {
        let obstacle = Obstacle::new(-49, 150, 50, false);
        assert!(!obstacle.is_off_screen());
        obstacle.advance(1);
        assert!(obstacle.is_off_screen());
    }

    #[test]
    fn test_extreme_positions_saturate() {
        let obstacle = Obstacle::new(i32::MIN + 1, 150, 50, false);
        assert_eq!(obstacle.advance(2), i32::MIN);
        assert!(obstacle.is_off_screen());

        let obstacle = Obstacle::new(i32::MAX, 150, 50, false);
        assert!(!obstacle.is_off_screen());
    }

    #[test]
    fn test_placement_upright() {
        let obstacle = Obstacle::new(300, 150, 50, false);
        let (rect, flip) = obstacle.snapshot().placement(600);
        assert_eq!(rect, Rect::new(300, 450, 50, 150));
        assert_eq!(flip, Flip::None);
    }

    #[test]
    fn test_placement_inverted() {
        let obstacle = Obstacle::new(300, 220, 50, true);
        let (rect, flip) = obstacle.snapshot().placement(600);
        assert_eq!(rect, Rect::new(300, 0, 50, 220));
        assert_eq!(flip, Flip::Vertical);
    }

    #[test]
    fn test_paint_issues_single_draw() {
        let graphics = GraphicsContext::new(RecordingRenderer::new());
        let texture = graphics
            .run(|r| r.load_texture(Path::new("pipe.png")))
            .unwrap()
            .unwrap();

        let obstacle = Obstacle::new(120, 200, 50, true);
        obstacle.paint(&graphics, texture, 600).unwrap();

        graphics.with_renderer(|r| {
            let calls = r.draw_calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].texture, texture);
            assert_eq!(calls[0].params.dest, Rect::new(120, 0, 50, 200));
            assert_eq!(calls[0].params.flip, Flip::Vertical);
            assert_eq!(calls[0].params.source, None);
            assert_eq!(calls[0].params.rotation, 0.0);
        });
    }

    #[test]
    fn test_paint_wraps_draw_failure() {
        let graphics = GraphicsContext::new(RecordingRenderer::new().failing_draws_after(0));
        let texture = graphics
            .run(|r| r.load_texture(Path::new("pipe.png")))
            .unwrap()
            .unwrap();

        let err = Obstacle::new(120, 200, 50, false)
            .paint(&graphics, texture, 600)
            .unwrap_err();
        assert!(matches!(err, ObstacleError::Render { .. }));
        assert!(err.to_string().contains("invalid renderer state"));
    }
}
