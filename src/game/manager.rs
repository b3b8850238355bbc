//! # Obstacle Manager
//!
//! Owns the live obstacle collection, the shared obstacle texture and the
//! background spawner.
//!
//! The collection sits behind a reader/writer lock: the spawner, `update` and
//! `restart` take it exclusively, `paint` and the inspection helpers take it
//! shared. `update` additionally takes each obstacle's own lock while moving it,
//! always after the collection lock.

use crate::game::{Obstacle, ObstacleSnapshot, Score, SharedObstacles, Spawner};
use crate::generation::{utils, Generator, ObstacleConfig, RandomObstacleGenerator};
use crate::rendering::{GraphicsContext, Renderer, TextureId};
use crate::{ObstacleError, ObstacleResult};
use log::{debug, info, warn};
use std::sync::{Arc, PoisonError, RwLockReadGuard, RwLockWriteGuard};
use tokio::runtime::Handle;

/// Lifecycle and rendering orchestration for every obstacle on screen.
///
/// # Examples
///
/// ```
/// use pipes::{GraphicsContext, ObstacleConfig, ObstacleManager, RecordingRenderer, Scoreboard};
///
/// # tokio_test::block_on(async {
/// let graphics = GraphicsContext::new(RecordingRenderer::new());
/// let manager = ObstacleManager::new(
///     graphics,
///     ObstacleConfig::for_testing(1),
///     &tokio::runtime::Handle::current(),
/// )
/// .unwrap();
///
/// let mut score = Scoreboard::new();
/// manager.update(&mut score);
/// manager.paint().unwrap();
/// manager.destroy().await;
/// # });
/// ```
pub struct ObstacleManager<R: Renderer + Send + 'static> {
    graphics: GraphicsContext<R>,
    texture: Option<TextureId>,
    config: ObstacleConfig,
    obstacles: SharedObstacles,
    spawner: Option<Spawner>,
}

impl<R: Renderer + Send + 'static> ObstacleManager<R> {
    /// Loads the obstacle texture and starts spawning on `runtime`.
    ///
    /// Fails with [`ObstacleError::ResourceLoad`] when the texture cannot be
    /// loaded or decoded; no spawner is started in that case.
    pub fn new(
        graphics: GraphicsContext<R>,
        config: ObstacleConfig,
        runtime: &Handle,
    ) -> ObstacleResult<Self> {
        Self::with_generator(graphics, config, runtime, RandomObstacleGenerator::new())
    }

    /// Like [`new`](Self::new) with a custom spawn policy.
    pub fn with_generator<G>(
        graphics: GraphicsContext<R>,
        config: ObstacleConfig,
        runtime: &Handle,
        generator: G,
    ) -> ObstacleResult<Self>
    where
        G: Generator<Obstacle> + Send + 'static,
    {
        config.validate()?;

        let path = config.texture_path.clone();
        let texture = graphics
            .run(move |renderer| renderer.load_texture(&path))?
            .map_err(|source| ObstacleError::ResourceLoad {
                name: config.texture_path.display().to_string(),
                source,
            })?;
        info!(
            "Loaded obstacle texture {} as {:?}",
            config.texture_path.display(),
            texture
        );

        let obstacles = SharedObstacles::default();
        let spawner = Spawner::start(
            runtime,
            Arc::clone(&obstacles),
            generator,
            config.clone(),
            utils::create_rng(&config),
        );

        Ok(Self {
            graphics,
            texture: Some(texture),
            config,
            obstacles,
            spawner: Some(spawner),
        })
    }

    pub fn config(&self) -> &ObstacleConfig {
        &self.config
    }

    /// Handle of the shared obstacle texture.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Draws every obstacle in spawn order.
    ///
    /// The collection stays read-locked for the whole pass. The first draw
    /// failure is returned and later obstacles are skipped for this frame.
    pub fn paint(&self) -> ObstacleResult<()> {
        let texture = self.texture.ok_or(ObstacleError::GraphicsUnavailable)?;
        let obstacles = self.read();

        for obstacle in obstacles.iter() {
            obstacle.paint(&self.graphics, texture, self.config.playfield_height)?;
        }
        Ok(())
    }

    /// Advances every obstacle by the configured speed and drops those that
    /// left the playfield, crediting `score` once per dropped obstacle.
    pub fn update(&self, score: &mut impl Score) {
        let mut obstacles = self.write();

        let mut kept = Vec::with_capacity(obstacles.len());
        for obstacle in obstacles.drain(..) {
            let x = obstacle.advance(self.config.speed);
            if x.saturating_add(obstacle.width()) > 0 {
                kept.push(obstacle);
            } else {
                debug!("Obstacle {} cleared at x={}", obstacle.id(), x);
                score.increase();
            }
        }
        *obstacles = kept;
    }

    /// Removes every obstacle. The spawner keeps running.
    pub fn restart(&self) {
        let mut obstacles = self.write();
        debug!("Restart cleared {} obstacles", obstacles.len());
        obstacles.clear();
    }

    /// Appends an obstacle as if it had just been spawned.
    pub fn insert(&self, obstacle: Obstacle) {
        self.write().push(Arc::new(obstacle));
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copies the state of every obstacle in spawn order.
    pub fn snapshot(&self) -> Vec<ObstacleSnapshot> {
        self.read().iter().map(|o| o.snapshot()).collect()
    }

    /// Shared handles to the live obstacles.
    ///
    /// The handles stay valid after the obstacles leave the collection, so they
    /// can be inspected without holding the collection lock.
    pub fn obstacles(&self) -> Vec<Arc<Obstacle>> {
        self.read().clone()
    }

    /// True while the spawner task is alive.
    pub fn is_spawning(&self) -> bool {
        self.spawner.as_ref().is_some_and(Spawner::is_running)
    }

    /// Stops the spawner, waits for it, then releases the texture.
    ///
    /// When called off the graphics owner thread, the owner must keep pumping
    /// until this returns.
    pub async fn destroy(mut self) {
        if let Some(spawner) = self.spawner.take() {
            spawner.shutdown().await;
        }

        self.write().clear();

        if let Some(texture) = self.texture.take() {
            match self
                .graphics
                .run(move |renderer| renderer.destroy_texture(texture))
            {
                Ok(()) => info!("Obstacle manager destroyed"),
                Err(e) => warn!("Could not release obstacle texture: {}", e),
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Obstacle>>> {
        self.obstacles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Obstacle>>> {
        self.obstacles.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Renderer + Send + 'static> Drop for ObstacleManager<R> {
    fn drop(&mut self) {
        if self.spawner.is_none() && self.texture.is_none() {
            return;
        }

        warn!("Obstacle manager dropped without destroy()");
        if let Some(mut spawner) = self.spawner.take() {
            spawner.cancel();
        }
        if let Some(texture) = self.texture.take() {
            if let Err(e) = self
                .graphics
                .post(move |renderer| renderer.destroy_texture(texture))
            {
                warn!("Could not release obstacle texture: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Rect, Scoreboard};
    use crate::rendering::{Flip, RecordingRenderer};

    /// Generator that never produces anything, keeping the collection under test control.
    struct NoSpawns;

    impl Generator<Obstacle> for NoSpawns {
        fn generate(
            &self,
            _: &ObstacleConfig,
            _: &mut rand::rngs::StdRng,
        ) -> ObstacleResult<Obstacle> {
            Err(ObstacleError::InvalidConfig("spawning disabled".to_string()))
        }

        fn validate(&self, _: &Obstacle, _: &ObstacleConfig) -> ObstacleResult<()> {
            Ok(())
        }

        fn generator_type(&self) -> &'static str {
            "NoSpawns"
        }
    }

    fn quiet_manager(renderer: RecordingRenderer) -> ObstacleManager<RecordingRenderer> {
        ObstacleManager::with_generator(
            GraphicsContext::new(renderer),
            ObstacleConfig::for_testing(1),
            &Handle::current(),
            NoSpawns,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_update_moves_and_keeps() {
        let manager = quiet_manager(RecordingRenderer::new());
        manager.insert(Obstacle::new(10, 150, 50, false));

        let mut score = Scoreboard::new();
        manager.update(&mut score);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].x, 8);
        assert_eq!(snapshot[0].h, 150);
        assert_eq!(score.points(), 0);

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_update_drops_off_screen_and_scores_once() {
        let manager = quiet_manager(RecordingRenderer::new());
        manager.insert(Obstacle::new(-48, 150, 50, false));
        manager.insert(Obstacle::new(-47, 150, 50, true));

        let mut score = Scoreboard::new();
        manager.update(&mut score);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.snapshot()[0].x, -49);
        assert_eq!(score.points(), 1);

        manager.update(&mut score);
        assert!(manager.is_empty());
        assert_eq!(score.points(), 2);

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_update_at_coordinate_limits() {
        let manager = quiet_manager(RecordingRenderer::new());
        manager.insert(Obstacle::new(i32::MAX, 150, 50, false));
        manager.insert(Obstacle::new(i32::MIN + 1, 150, 50, false));

        let mut score = Scoreboard::new();
        manager.update(&mut score);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].x, i32::MAX - 2);
        assert_eq!(score.points(), 1);

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_update_preserves_order() {
        let manager = quiet_manager(RecordingRenderer::new());
        let first = Obstacle::new(-49, 100, 50, false);
        let second = Obstacle::new(300, 120, 50, false);
        let third = Obstacle::new(600, 140, 50, true);
        let expected = vec![second.id(), third.id()];
        manager.insert(first);
        manager.insert(second);
        manager.insert(third);

        manager.update(&mut Scoreboard::new());

        let ids: Vec<_> = manager.snapshot().iter().map(|s| s.id).collect();
        assert_eq!(ids, expected);

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_paint_draws_each_obstacle_in_order() {
        let manager = quiet_manager(RecordingRenderer::new());
        manager.insert(Obstacle::new(100, 150, 50, false));
        manager.insert(Obstacle::new(400, 250, 50, true));

        manager.paint().unwrap();

        let texture = manager.texture().unwrap();
        manager.graphics.with_renderer(|r| {
            let calls = r.draw_calls();
            assert_eq!(calls.len(), 2);
            assert!(calls.iter().all(|c| c.texture == texture));
            assert_eq!(calls[0].params.dest, Rect::new(100, 450, 50, 150));
            assert_eq!(calls[0].params.flip, Flip::None);
            assert_eq!(calls[1].params.dest, Rect::new(400, 0, 50, 250));
            assert_eq!(calls[1].params.flip, Flip::Vertical);
        });

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_paint_stops_at_first_failure() {
        let manager = quiet_manager(RecordingRenderer::new().failing_draws_after(1));
        for x in [100, 200, 300] {
            manager.insert(Obstacle::new(x, 150, 50, false));
        }

        let err = manager.paint().unwrap_err();
        assert!(matches!(err, ObstacleError::Render { .. }));
        assert_eq!(manager.graphics.with_renderer(|r| r.draw_calls().len()), 1);

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_restart_clears_and_paints_nothing() {
        let manager = quiet_manager(RecordingRenderer::new());
        for x in [100, 200, 300] {
            manager.insert(Obstacle::new(x, 150, 50, false));
        }

        manager.restart();
        assert!(manager.is_empty());

        manager.paint().unwrap();
        assert!(manager.graphics.with_renderer(|r| r.draw_calls().is_empty()));

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_obstacle_handles_outlive_removal() {
        let manager = quiet_manager(RecordingRenderer::new());
        manager.insert(Obstacle::new(-49, 150, 50, false));

        let handles = manager.obstacles();
        manager.update(&mut Scoreboard::new());

        assert!(manager.is_empty());
        assert_eq!(handles[0].x(), -51);
        assert!(handles[0].is_off_screen());

        manager.destroy().await;
    }

    #[tokio::test]
    async fn test_load_failure_aborts_construction() {
        let result = ObstacleManager::new(
            GraphicsContext::new(RecordingRenderer::new().failing_loads()),
            ObstacleConfig::for_testing(1),
            &Handle::current(),
        );

        match result {
            Err(ObstacleError::ResourceLoad { name, .. }) => {
                assert_eq!(name, "resources/imgs/pipe.png");
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("construction should fail"),
        }
    }

    #[tokio::test]
    async fn test_destroy_releases_texture_once() {
        let graphics = GraphicsContext::new(RecordingRenderer::new());
        let manager = ObstacleManager::with_generator(
            graphics.clone(),
            ObstacleConfig::for_testing(1),
            &Handle::current(),
            NoSpawns,
        )
        .unwrap();
        let texture = manager.texture().unwrap();
        assert!(manager.is_spawning());

        manager.destroy().await;

        graphics.with_renderer(|r| {
            assert_eq!(r.destroyed_textures(), &[texture]);
            assert_eq!(r.live_textures(), 0);
        });
    }

    #[tokio::test]
    async fn test_drop_without_destroy_releases_texture() {
        let graphics = GraphicsContext::new(RecordingRenderer::new());
        let manager = quiet_manager_with(&graphics);
        drop(manager);

        graphics.with_renderer(|r| {
            assert_eq!(r.destroyed_textures().len(), 1);
            assert_eq!(r.live_textures(), 0);
        });
    }

    fn quiet_manager_with(
        graphics: &GraphicsContext<RecordingRenderer>,
    ) -> ObstacleManager<RecordingRenderer> {
        ObstacleManager::with_generator(
            graphics.clone(),
            ObstacleConfig::for_testing(1),
            &Handle::current(),
            NoSpawns,
        )
        .unwrap()
    }
}
