//! Worker-local state that commands mutate.
//!
//! Keys name persistent scene objects. They are identities inside one worker
//! and are never shared with producers: two canvases may both own a `"x"`
//! object without ever seeing each other's.

use crate::command::Rgb;
use crate::error::CanvasError;
use crate::surface::Surface;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A keyed marker set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Markers {
    /// Point positions.
    pub points: Vec<[f32; 3]>,
    /// Marker color.
    pub color: Rgb,
    /// Marker size.
    pub size: f32,
    /// Parent object key.
    pub parent: Option<String>,
}

/// A keyed XYZ axis gizmo.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisGizmo {
    /// Axis length.
    pub scale: f32,
    /// Parent object key.
    pub parent: Option<String>,
}

/// A persistent object in a worker's scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// Point markers.
    Markers(Markers),
    /// Axis gizmo.
    Axes(AxisGizmo),
}

impl SceneObject {
    /// Short kind name.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Markers(_) => "markers",
            Self::Axes(_) => "axes",
        }
    }

    /// Parent object key.
    pub fn parent(&self) -> Option<&str> {
        match self {
            Self::Markers(markers) => markers.parent.as_deref(),
            Self::Axes(axes) => axes.parent.as_deref(),
        }
    }

    fn detach(&mut self) {
        match self {
            Self::Markers(markers) => markers.parent = None,
            Self::Axes(axes) => axes.parent = None,
        }
    }

    /// Point count for markers, scale in thousandths for axes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn magnitude(&self) -> usize {
        match self {
            Self::Markers(markers) => markers.points.len(),
            Self::Axes(axes) => (axes.scale.abs() * 1000.0).round() as usize,
        }
    }
}

/// Frame timing information visible to commands.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    /// Tick number since the worker started.
    pub frame: u64,
    /// Time the current tick started.
    pub now: Instant,
    /// Time since the previous tick.
    pub dt: Duration,
}

impl FrameInfo {
    /// Frame zero at `now`.
    pub const fn start(now: Instant) -> Self {
        Self {
            frame: 0,
            now,
            dt: Duration::ZERO,
        }
    }
}

/// Read-only view of a worker's scene, handed to surfaces.
pub struct Scene<'a> {
    objects: &'a HashMap<String, SceneObject>,
    frame: FrameInfo,
}

impl<'a> Scene<'a> {
    /// Objects in key order.
    pub fn objects(&self) -> impl Iterator<Item = (&'a str, &'a SceneObject)> {
        let mut objects: Vec<_> = self
            .objects
            .iter()
            .map(|(key, object)| (key.as_str(), object))
            .collect();
        objects.sort_unstable_by_key(|(key, _)| *key);
        objects.into_iter()
    }

    /// Objects attached to `parent`, in key order.
    pub fn children(&self, parent: &str) -> Vec<(&'a str, &'a SceneObject)> {
        self.objects()
            .filter(|(_, object)| object.parent() == Some(parent))
            .collect()
    }

    /// Look up an object by key.
    pub fn get(&self, key: &str) -> Option<&'a SceneObject> {
        self.objects.get(key)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Timing of the frame being presented.
    pub const fn frame(&self) -> FrameInfo {
        self.frame
    }
}

/// Mutable, worker-local state: the surface, keyed scene objects and frame timing.
pub struct WorkerContext {
    objects: HashMap<String, SceneObject>,
    surface: Option<Box<dyn Surface>>,
    frame: FrameInfo,
    dirty: bool,
    running: bool,
}

impl WorkerContext {
    /// Create an empty context with no surface.
    pub fn new(now: Instant) -> Self {
        Self {
            objects: HashMap::new(),
            surface: None,
            frame: FrameInfo::start(now),
            dirty: false,
            running: true,
        }
    }

    /// Return the object stored under `key`, creating it with `factory` first
    /// if there is none.
    ///
    /// The scene is marked dirty, since callers take the object to change it.
    pub fn ensure_get<F>(&mut self, key: &str, factory: F) -> &mut SceneObject
    where
        F: FnOnce() -> SceneObject,
    {
        self.dirty = true;
        self.objects
            .entry(key.to_string())
            .or_insert_with(factory)
    }

    /// Look up an object.
    pub fn get(&self, key: &str) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Whether an object exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// First object, in key order, that matches `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<(&str, &SceneObject)>
    where
        P: FnMut(&str, &SceneObject) -> bool,
    {
        let mut matches: Vec<_> = self
            .objects
            .iter()
            .filter(|(key, object)| predicate(key, object))
            .map(|(key, object)| (key.as_str(), object))
            .collect();
        matches.sort_unstable_by_key(|(key, _)| *key);
        matches.into_iter().next()
    }

    /// Store `object` under `key`, returning whatever it replaced.
    pub fn replace(&mut self, key: impl Into<String>, object: SceneObject) -> Option<SceneObject> {
        self.dirty = true;
        self.objects.insert(key.into(), object)
    }

    /// Drop the object under `key`. Its children move to the scene root.
    pub fn remove(&mut self, key: &str) -> Option<SceneObject> {
        let removed = self.objects.remove(key)?;
        for object in self.objects.values_mut() {
            if object.parent() == Some(key) {
                object.detach();
            }
        }
        self.dirty = true;
        Some(removed)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether there are no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Current frame timing.
    pub const fn frame(&self) -> FrameInfo {
        self.frame
    }

    pub(crate) fn set_frame(&mut self, frame: FrameInfo) {
        self.frame = frame;
    }

    /// Install the rendering surface, closing any previous one.
    pub fn install_surface(&mut self, surface: Box<dyn Surface>) {
        if let Some(mut previous) = self.surface.replace(surface) {
            previous.close();
        }
        self.dirty = true;
    }

    /// Whether a surface has been set up.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Whether the scene changed since the last presentation.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Present the scene if it changed. Returns whether a frame was shown.
    pub fn present(&mut self) -> Result<bool, CanvasError> {
        if !self.dirty {
            return Ok(false);
        }
        let Some(surface) = self.surface.as_mut() else {
            return Err(CanvasError::NoSurface);
        };
        let scene = Scene {
            objects: &self.objects,
            frame: self.frame,
        };
        surface.present(&scene)?;
        self.dirty = false;
        Ok(true)
    }

    /// Close and drop the surface.
    pub fn close_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.close();
        }
    }

    /// Ask the worker loop to stop after the current tick.
    pub fn request_stop(&mut self) {
        self.running = false;
    }

    /// Whether the worker loop should keep ticking.
    pub const fn is_running(&self) -> bool {
        self.running
    }
}
