//! Typed commands understood by the worker.
//!
//! Each command is a plain value that owns everything it needs, so it can
//! cross the thread boundary by move. The worker dispatches on the variant;
//! producers never ship code, only data.

use crate::surface::SurfaceConfig;

/// Key used when a drawing command does not name its object.
pub const DEFAULT_KEY: &str = "_default";

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Red (255, 0, 0)
    pub const RED: Self = Self::new(255, 0, 0);
    /// Green (0, 200, 0)
    pub const GREEN: Self = Self::new(0, 200, 0);
    /// Blue (64, 96, 255)
    pub const BLUE: Self = Self::new(64, 96, 255);
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Create or update a keyed set of point markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    /// Object key in the worker context.
    pub key: String,
    /// Key of the object this marker set hangs off, if any.
    pub parent: Option<String>,
    /// Point positions.
    pub points: Vec<[f32; 3]>,
    /// Marker color (edge and face).
    pub color: Rgb,
    /// Marker size in surface units.
    pub size: f32,
}

impl Scatter {
    /// Markers at `points` under the default key.
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            parent: None,
            points,
            color: Rgb::WHITE,
            size: 10.0,
        }
    }

    /// Set the object key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the parent object key.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the marker color.
    #[must_use]
    pub const fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Set the marker size.
    #[must_use]
    pub const fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Create or update a keyed XYZ axis gizmo.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    /// Object key in the worker context.
    pub key: String,
    /// Key of the object the gizmo hangs off, if any.
    pub parent: Option<String>,
    /// Length of each axis.
    pub scale: f32,
}

impl Axes {
    /// Unit axes under the default key.
    pub fn new() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            parent: None,
            scale: 1.0,
        }
    }

    /// Set the object key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the parent object key.
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the axis length.
    #[must_use]
    pub const fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands sent to a canvas worker.
#[derive(Debug, Clone)]
pub enum Command {
    /// Build the rendering surface. Must be the first command a worker sees.
    Setup(SurfaceConfig),

    /// Create or update a marker set.
    Scatter(Scatter),

    /// Create or update an axis gizmo.
    Axes(Axes),

    /// Drop a keyed object from the worker context.
    Remove {
        /// Key of the object to drop.
        key: String,
    },

    /// Stop the worker loop.
    Terminate,
}

impl Command {
    /// Short variant name for logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Scatter(_) => "scatter",
            Self::Axes(_) => "axes",
            Self::Remove { .. } => "remove",
            Self::Terminate => "terminate",
        }
    }
}

impl From<Scatter> for Command {
    fn from(scatter: Scatter) -> Self {
        Self::Scatter(scatter)
    }
}

impl From<Axes> for Command {
    fn from(axes: Axes) -> Self {
        Self::Axes(axes)
    }
}

impl From<SurfaceConfig> for Command {
    fn from(config: SurfaceConfig) -> Self {
        Self::Setup(config)
    }
}
