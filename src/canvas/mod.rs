//! Canvas: the producer-facing side of a worker.
//!
//! - [`CanvasHandle`]: owns a handoff queue and the worker thread behind it
//! - [`CanvasRegistry`]: tracks live canvases and the scoped current canvas

mod handle;
mod registry;

pub use handle::{CanvasConfig, CanvasHandle, CanvasId};
pub use registry::{CanvasRegistry, CurrentGuard};
