//! `HeadlessSurface`: a surface that draws nothing and remembers everything.

use super::Surface;
use crate::error::CanvasError;
use crate::worker::Scene;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One object as it looked in a presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Object kind (`"markers"` or `"axes"`).
    pub kind: &'static str,
    /// Parent key, if attached to another object.
    pub parent: Option<String>,
    /// Number of points (markers) or the axis scale rounded to thousandths (axes).
    pub size: usize,
}

/// A presented frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Worker frame number at presentation.
    pub frame: u64,
    /// Objects in key order.
    pub objects: Vec<ObjectSummary>,
}

impl FrameSummary {
    /// Look up an object by key.
    pub fn object(&self, key: &str) -> Option<&ObjectSummary> {
        self.objects.iter().find(|object| object.key == key)
    }
}

#[derive(Debug, Default)]
struct LogState {
    frames: Vec<FrameSummary>,
    closed: bool,
}

/// Shared record of what a headless surface presented.
///
/// Clones observe the same log, so a producer can keep one and hand the
/// other to the worker inside a setup command.
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    state: Arc<Mutex<LogState>>,
}

impl FrameLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All presented frames, oldest first.
    pub fn frames(&self) -> Vec<FrameSummary> {
        self.lock().frames.clone()
    }

    /// The most recently presented frame.
    pub fn last(&self) -> Option<FrameSummary> {
        self.lock().frames.last().cloned()
    }

    /// Number of presented frames.
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    /// Whether nothing has been presented yet.
    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    /// Whether the owning surface was closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn push(&self, frame: FrameSummary) {
        self.lock().frames.push(frame);
    }

    fn mark_closed(&self) {
        self.lock().closed = true;
    }
}

/// Surface that records a [`FrameSummary`] per presented frame.
pub struct HeadlessSurface {
    log: FrameLog,
}

impl HeadlessSurface {
    /// Create a surface recording into `log`.
    pub const fn new(log: FrameLog) -> Self {
        Self { log }
    }
}

impl Surface for HeadlessSurface {
    fn present(&mut self, scene: &Scene<'_>) -> Result<(), CanvasError> {
        let objects = scene
            .objects()
            .map(|(key, object)| ObjectSummary {
                key: key.to_string(),
                kind: object.kind(),
                parent: object.parent().map(str::to_string),
                size: object.magnitude(),
            })
            .collect();

        self.log.push(FrameSummary {
            frame: scene.frame().frame,
            objects,
        });
        Ok(())
    }

    fn close(&mut self) {
        self.log.mark_closed();
    }
}
