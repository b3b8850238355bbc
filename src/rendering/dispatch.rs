//! # Graphics Dispatch
//!
//! Marshals renderer calls onto the thread that owns the graphics context.
//!
//! Calls made on the owner thread run inline. Calls made anywhere else are
//! queued and the caller blocks until the owner drains the queue with
//! [`GraphicsContext::pump`]. When the owner thread exits the queue is closed:
//! pending and later calls fail with [`ObstacleError::GraphicsUnavailable`].

use crate::rendering::Renderer;
use crate::{ObstacleError, ObstacleResult};
use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

type Job<R> = Box<dyn FnOnce(&mut R) + Send>;

struct Shared<R> {
    renderer: Mutex<R>,
    owner: ThreadId,
    jobs: Mutex<Sender<Job<R>>>,
    // Taken when the owner thread exits, dropping every queued job with it
    queue: Mutex<Option<Receiver<Job<R>>>>,
}

impl<R> Shared<R> {
    fn close(&self) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Closes a context's queue when dropped with its owner thread's locals.
struct OwnerGuard(Box<dyn Fn()>);

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        (self.0)();
    }
}

thread_local! {
    static OWNED_CONTEXTS: RefCell<Vec<OwnerGuard>> = const { RefCell::new(Vec::new()) };
}

/// Handle to a renderer bound to its owner thread.
///
/// Cloning is cheap; all clones target the same renderer and queue.
pub struct GraphicsContext<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for GraphicsContext<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Renderer + Send + 'static> GraphicsContext<R> {
    /// Wraps `renderer`, making the calling thread its owner.
    pub fn new(renderer: R) -> Self {
        let (sender, receiver) = mpsc::channel();
        let shared = Arc::new(Shared {
            renderer: Mutex::new(renderer),
            owner: thread::current().id(),
            jobs: Mutex::new(sender),
            queue: Mutex::new(Some(receiver)),
        });

        let owned: Weak<Shared<R>> = Arc::downgrade(&shared);
        OWNED_CONTEXTS.with(|contexts| {
            contexts.borrow_mut().push(OwnerGuard(Box::new(move || {
                if let Some(shared) = owned.upgrade() {
                    shared.close();
                }
            })));
        });

        Self { shared }
    }

    /// Returns true when called from the owner thread.
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.shared.owner
    }

    /// Runs `f` against the renderer on the owner thread and returns its result.
    ///
    /// Off the owner thread this blocks until the owner calls [`pump`](Self::pump).
    pub fn run<T, F>(&self, f: F) -> ObstacleResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut R) -> T + Send + 'static,
    {
        if self.is_owner_thread() {
            return Ok(f(&mut self.renderer()));
        }

        let (reply, result) = mpsc::sync_channel(1);
        self.post(move |renderer| {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply.send(f(renderer));
        })?;
        result.recv().map_err(|_| ObstacleError::GraphicsUnavailable)
    }

    /// Queues `f` for the owner thread without waiting for it.
    ///
    /// On the owner thread `f` runs immediately.
    pub fn post<F>(&self, f: F) -> ObstacleResult<()>
    where
        F: FnOnce(&mut R) + Send + 'static,
    {
        if self.is_owner_thread() {
            f(&mut self.renderer());
            return Ok(());
        }

        self.shared
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(Box::new(f))
            .map_err(|_| ObstacleError::GraphicsUnavailable)
    }

    /// Executes every queued job. Must be called on the owner thread.
    ///
    /// Returns the number of jobs executed.
    pub fn pump(&self) -> usize {
        debug_assert!(self.is_owner_thread(), "pump called off the owner thread");

        let queue = self
            .shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = queue.as_ref() else {
            return 0;
        };
        let mut executed = 0;
        while let Ok(job) = queue.try_recv() {
            job(&mut self.renderer());
            executed += 1;
        }
        executed
    }

    /// Direct access to the renderer for owner-thread code such as the game loop.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        debug_assert!(self.is_owner_thread(), "renderer accessed off the owner thread");
        f(&mut self.renderer())
    }

    fn renderer(&self) -> MutexGuard<'_, R> {
        self.shared
            .renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
