//! Error types for canvas workers.
//!
//! Queue-boundary outcomes (a full queue, a stale command, an empty queue)
//! are not errors; they are logged and absorbed where they happen. Only
//! failures that end a worker, or stop one from starting, show up here.

use std::io;
use std::time::Duration;

/// Errors raised while starting or running a canvas worker.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// No setup command arrived before the bootstrap deadline.
    #[error("worker received no setup command within {0:?}")]
    BootstrapTimeout(Duration),

    /// The first command a worker received was not a setup command.
    #[error("worker expected a setup command first, got `{0}`")]
    UnexpectedBootstrap(&'static str),

    /// Every producer handle was dropped before the worker bootstrapped.
    #[error("command queue disconnected")]
    Disconnected,

    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// The rendering surface failed.
    #[error("surface error: {0}")]
    Surface(#[from] io::Error),

    /// A frame was presented before any surface was set up.
    #[error("no surface has been set up")]
    NoSurface,

    /// The worker thread panicked.
    #[error("worker thread panicked")]
    WorkerPanicked,
}
