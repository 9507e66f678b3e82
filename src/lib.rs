//! # Vizrelay
//!
//! Presentation-time command relay for frame-paced visualization workers.
//!
//! Producers issue time-stamped drawing commands ("draw this now" or "draw
//! this at time T"). A worker thread consumes them at a fixed tick rate,
//! discarding commands that went stale in the queue and holding back
//! commands scheduled for the future.
//!
//! ## Core Concepts
//!
//! - **Presentation time**: every command carries its creation time, target
//!   presentation time and staleness tolerance
//! - **Bounded handoff**: producers wait a bounded time for room, then drop
//! - **Bounded ticks**: each tick inspects at most a fixed number of queued
//!   commands, whatever the backlog
//! - **Deferred execution**: future commands wait in a presentation-ordered
//!   scheduler on the worker
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use vizrelay::{CanvasConfig, CanvasHandle, PresentationTime, Rgb, Scatter};
//!
//! let canvas = CanvasHandle::spawn(CanvasConfig::default())?;
//! canvas.schedule(Scatter::new(vec![[0.0, 0.0, 0.0]]).key("x"));
//! canvas.schedule_at(
//!     Scatter::new(vec![[1.0, 0.0, 0.0]]).key("x").color(Rgb::RED),
//!     PresentationTime::at(Duration::from_secs(2)),
//! );
//! canvas.close();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod canvas;
pub mod command;
pub mod draw;
mod error;
pub mod surface;
pub mod worker;

// Re-exports for convenience
pub use canvas::{CanvasConfig, CanvasHandle, CanvasId, CanvasRegistry, CurrentGuard};
pub use command::{Axes, Command, CommandEnvelope, PresentationTime, Rgb, Scatter};
pub use error::CanvasError;
pub use surface::{Camera, FrameLog, Surface, SurfaceConfig};
pub use worker::{Enqueued, WorkerContext, WorkerLoop, WorkerOptions, WorkerStats};
