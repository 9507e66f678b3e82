//! `CanvasHandle`: the producer's grip on one canvas worker.

use crate::command::{Command, CommandEnvelope, PresentationTime};
use crate::error::CanvasError;
use crate::surface::{FrameLog, SurfaceConfig};
use crate::worker::{handoff, spawn_worker, Enqueued, HandoffQueue, WorkerOptions, WorkerStats};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;

/// Configuration for a canvas.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Maximum number of in-flight commands.
    pub queue_capacity: usize,
    /// Surface the worker builds before anything else.
    pub setup: SurfaceConfig,
    /// Worker thread tuning.
    pub worker: WorkerOptions,
}

impl CanvasConfig {
    /// Default configuration on a headless surface recording into `log`.
    pub fn headless(log: FrameLog) -> Self {
        Self {
            setup: SurfaceConfig::headless(log),
            ..Self::default()
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            setup: SurfaceConfig::default(),
            worker: WorkerOptions {
                name: "vizrelay-canvas".to_string(),
                ..WorkerOptions::default()
            },
        }
    }
}

/// Process-unique canvas identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanvasId(u64);

impl CanvasId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas-{}", self.0)
    }
}

type WorkerHandle = JoinHandle<Result<WorkerStats, CanvasError>>;

/// Producer-side façade for a canvas worker.
///
/// Owns the handoff queue and the worker thread. Scheduling is best-effort:
/// commands may be dropped on backpressure or staleness, and nothing is
/// reported back beyond the [`Enqueued`] outcome.
pub struct CanvasHandle {
    id: CanvasId,
    name: String,
    queue: HandoffQueue,
    worker: Mutex<Option<WorkerHandle>>,
}

impl CanvasHandle {
    /// Create the queue, enqueue the setup command and start the worker.
    ///
    /// The handle is not registered anywhere; see
    /// [`CanvasRegistry::open`](crate::CanvasRegistry::open).
    pub fn spawn(config: CanvasConfig) -> Result<Self, CanvasError> {
        let CanvasConfig {
            queue_capacity,
            setup,
            worker,
        } = config;
        let (queue, receiver) = handoff(queue_capacity);

        // The queue is fresh, so the setup command always fits.
        queue.enqueue(CommandEnvelope::now(Command::Setup(setup)));

        let id = CanvasId::next();
        let name = worker.name.clone();
        let handle = spawn_worker(receiver, worker).map_err(CanvasError::Spawn)?;
        tracing::debug!(%id, %name, capacity = queue.capacity(), "canvas opened");

        Ok(Self {
            id,
            name,
            queue,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Identifier of this canvas.
    pub const fn id(&self) -> CanvasId {
        self.id
    }

    /// Worker thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedule a command for immediate presentation.
    pub fn schedule(&self, command: impl Into<Command>) -> Enqueued {
        self.schedule_at(command, PresentationTime::now())
    }

    /// Schedule a command with explicit timing.
    ///
    /// Blocks for at most `time.max_queue_time()` if the queue is full.
    pub fn schedule_at(&self, command: impl Into<Command>, time: PresentationTime) -> Enqueued {
        self.queue.enqueue(CommandEnvelope::new(command, time))
    }

    /// Ask the worker to stop.
    ///
    /// The terminate command never expires and waits for room as long as it
    /// takes, so it is delivered even under heavy backpressure.
    pub fn close(&self) -> Enqueued {
        tracing::debug!(id = %self.id, "closing canvas");
        self.queue.enqueue(CommandEnvelope::terminate())
    }

    /// Whether the queue looked empty when asked.
    ///
    /// A hint only. The worker may still hold deferred commands, and other
    /// producers may push at any moment; never use this to synchronize.
    pub fn done(&self) -> bool {
        self.queue.is_empty()
    }

    /// A producer handle onto the same queue, for use from other threads.
    pub fn queue(&self) -> HandoffQueue {
        self.queue.clone()
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.lock_worker()
            .as_ref()
            .map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit.
    ///
    /// Returns `None` if another caller already joined it.
    pub fn join(&self) -> Option<Result<WorkerStats, CanvasError>> {
        let handle = self.lock_worker().take()?;
        Some(handle.join().unwrap_or(Err(CanvasError::WorkerPanicked)))
    }

    fn lock_worker(&self) -> std::sync::MutexGuard<'_, Option<WorkerHandle>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CanvasHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
