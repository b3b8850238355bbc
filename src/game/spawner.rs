//! # Spawner
//!
//! Background task that appends one freshly generated obstacle to the shared
//! collection every spawn interval until it is cancelled.

use crate::game::Obstacle;
use crate::generation::{Generator, ObstacleConfig};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Obstacle collection shared between the manager and the spawner.
pub type SharedObstacles = Arc<RwLock<Vec<Arc<Obstacle>>>>;

/// Owned handle to a running spawner task.
///
/// Dropping the handle cancels the task without waiting for it; use
/// [`Spawner::shutdown`] to wait for the task to finish.
#[derive(Debug)]
pub struct Spawner {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Spawner {
    /// Starts spawning into `obstacles` on `runtime`.
    ///
    /// The first obstacle is appended immediately, then one per interval. The
    /// collection lock is held only for the append itself.
    pub fn start<G>(
        runtime: &Handle,
        obstacles: SharedObstacles,
        generator: G,
        config: ObstacleConfig,
        mut rng: StdRng,
    ) -> Self
    where
        G: Generator<Obstacle> + Send + 'static,
    {
        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let period = config.spawn_interval();

        let task = runtime.spawn(async move {
            info!(
                "Spawner started ({} every {:?})",
                generator.generator_type(),
                period
            );

            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit cancel and when the handle is dropped
                    _ = &mut cancelled => break,
                    _ = ticker.tick() => {
                        let obstacle = match generator.generate(&config, &mut rng) {
                            Ok(obstacle) => obstacle,
                            Err(e) => {
                                warn!("Skipping spawn: {}", e);
                                continue;
                            }
                        };
                        debug!(
                            "Spawned obstacle {} (h={}, inverted={})",
                            obstacle.id(),
                            obstacle.height(),
                            obstacle.is_inverted()
                        );
                        obstacles
                            .write()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(Arc::new(obstacle));
                    }
                }
            }

            info!("Spawner stopped");
        });

        Self {
            cancel: Some(cancel),
            task,
        }
    }

    /// True until the task has exited.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Asks the task to stop without waiting for it.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The task may already be gone
            let _ = cancel.send(());
        }
    }

    /// Cancels the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Err(e) = (&mut self.task).await {
            warn!("Spawner task ended abnormally: {}", e);
        }
    }
}
