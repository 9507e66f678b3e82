//! Drawing helpers that target the global registry's current canvas.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use vizrelay::{draw, Axes, PresentationTime, Rgb, Scatter};
//!
//! draw::axes(Axes::new().key("world").scale(0.25), None)?;
//! draw::axes(
//!     Axes::new().key("world"),
//!     Some(PresentationTime::at(Duration::from_secs(1))),
//! )?;
//! draw::scatter(Scatter::new(points).color(Rgb::GREEN).key("x"), None)?;
//! ```

use crate::canvas::{CanvasHandle, CanvasRegistry};
use crate::command::{Axes, Command, PresentationTime, Scatter};
use crate::error::CanvasError;
use crate::worker::Enqueued;
use std::sync::Arc;
use std::time::Duration;

/// Timing for a command presented `delta` from now.
pub fn dt(delta: Duration) -> PresentationTime {
    PresentationTime::at(delta)
}

/// Schedule any command on the current canvas. `None` means "now".
pub fn schedule(
    command: impl Into<Command>,
    time: Option<PresentationTime>,
) -> Result<Enqueued, CanvasError> {
    let registry = CanvasRegistry::global();
    match time {
        Some(time) => registry.schedule_at(command, time),
        None => registry.schedule(command),
    }
}

/// Plot or update a keyed set of points on the current canvas.
pub fn scatter(scatter: Scatter, time: Option<PresentationTime>) -> Result<Enqueued, CanvasError> {
    schedule(scatter, time)
}

/// Draw or update a keyed axis gizmo on the current canvas.
pub fn axes(axes: Axes, time: Option<PresentationTime>) -> Result<Enqueued, CanvasError> {
    schedule(axes, time)
}

/// The global current canvas, opened on first use.
pub fn current_canvas() -> Result<Arc<CanvasHandle>, CanvasError> {
    CanvasRegistry::global().current()
}

/// Run `f` with `canvas` as the global current canvas.
pub fn with_canvas<R>(canvas: &Arc<CanvasHandle>, f: impl FnOnce(&Arc<CanvasHandle>) -> R) -> R {
    CanvasRegistry::global().with_current(canvas, f)
}

/// Ask every canvas in the global registry to stop.
pub fn close_all() {
    CanvasRegistry::global().close_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasConfig;
    use crate::command::Rgb;
    use crate::surface::FrameLog;
    use std::thread;
    use std::time::Instant;

    // The only test in the crate that touches the global registry.
    #[test]
    fn test_global_helpers_draw_on_current_canvas() {
        let log = FrameLog::new();
        let mut config = CanvasConfig::headless(log.clone());
        config.worker.target_fps = 200;
        assert!(CanvasRegistry::init_global(config));

        let canvas = current_canvas().unwrap();
        assert!(Arc::ptr_eq(&canvas, &current_canvas().unwrap()));

        assert!(axes(Axes::new().key("world").scale(0.25), None).unwrap().is_accepted());
        let points = vec![[0.1, 0.2, 0.3], [-0.5, 0.0, 1.0]];
        let outcome = scatter(
            Scatter::new(points).key("x").parent("world").color(Rgb::GREEN),
            Some(dt(Duration::from_millis(50))),
        );
        assert!(outcome.unwrap().is_accepted());

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let drawn = log.last().is_some_and(|frame| {
                frame.object("x").is_some_and(|x| x.parent.as_deref() == Some("world"))
            });
            if drawn {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        let frame = log.last().unwrap();
        assert_eq!(frame.object("world").map(|w| w.size), Some(250));
        assert_eq!(frame.object("x").map(|x| x.size), Some(2));

        close_all();
        assert!(canvas.join().unwrap().is_ok());
    }
}
