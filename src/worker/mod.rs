//! Worker: the frame-paced consumer side of a canvas.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  CommandEnvelope  ┌──────────────┐  tick   ┌──────────────────┐
//! │ Producers │ ────────────────▶ │ HandoffQueue │ ──────▶ │    WorkerLoop    │
//! └───────────┘  (bounded, FIFO)  └──────────────┘         │                  │
//!                                                          │ due ──▶ dispatch │
//!                                                          │ future ─▶ defer  │
//!                                                          └────────┬─────────┘
//!                                                                   │
//!                                              ┌────────────────────┴───┐
//!                                              │ DeferredScheduler      │
//!                                              │ (runs entries by pts)  │
//!                                              └────────────────────────┘
//! ```
//!
//! Everything below the queue runs on one thread: no command ever overlaps
//! another, and the [`WorkerContext`] needs no locking.

mod context;
mod dispatch;
mod pacer;
mod queue;
mod scheduler;
mod worker_loop;

pub use context::{AxisGizmo, FrameInfo, Markers, Scene, SceneObject, WorkerContext};
pub use dispatch::dispatch;
pub use pacer::FramePacer;
pub use queue::{handoff, Enqueued, HandoffQueue, HandoffReceiver};
pub use scheduler::DeferredScheduler;
pub use worker_loop::{
    spawn_worker, Promotion, TickReport, WorkerLoop, WorkerOptions, WorkerStats, DEFAULT_DRAIN_BUDGET,
};
