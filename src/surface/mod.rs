//! Surfaces: where a worker's scene ends up.
//!
//! The worker never talks to a windowing or graphics backend directly. A
//! [`Setup`](crate::Command::Setup) command carries a [`SurfaceConfig`]; the
//! worker builds the surface from it and hands the scene over once per dirty
//! frame.
//!
//! Two backends ship with the crate:
//! - [`HeadlessSurface`]: records frame summaries into a [`FrameLog`]
//! - [`TerminalSurface`]: draws the scene into the terminal's alternate screen

mod headless;
mod terminal;

pub use headless::{FrameLog, FrameSummary, HeadlessSurface, ObjectSummary};
pub use terminal::TerminalSurface;

use crate::error::CanvasError;
use crate::worker::Scene;

/// A rendering backend owned by a canvas worker.
pub trait Surface: Send {
    /// Show the current scene.
    fn present(&mut self, scene: &Scene<'_>) -> Result<(), CanvasError>;

    /// Release backend resources. Called once when the worker stops.
    fn close(&mut self) {}
}

/// How scene coordinates are projected onto the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Camera {
    /// Isometric view, the default for 3D scenes.
    #[default]
    Arcball,
    /// Oblique view looking slightly down the z axis.
    Turntable,
    /// Flat x/y view; z is ignored.
    PanZoom,
}

impl Camera {
    /// Project a scene point to surface coordinates (x right, y up).
    pub fn project(self, [x, y, z]: [f32; 3]) -> (f32, f32) {
        match self {
            Self::Arcball => {
                // 30 degree isometric axes.
                let (cos, sin) = (0.866_025_4, 0.5);
                ((x - z) * cos, y + (x + z) * sin * 0.5)
            }
            Self::Turntable => (x - z * 0.35, y - z * 0.35),
            Self::PanZoom => (x, y),
        }
    }
}

/// Which backend a surface is built on.
#[derive(Debug, Clone, Default)]
pub enum Backend {
    /// Render into the terminal.
    #[default]
    Terminal,
    /// Render nowhere; record summaries into the given log.
    Headless(FrameLog),
}

/// Everything a worker needs to build its surface and initial view.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Title shown by the surface, if it has room for one.
    pub title: String,
    /// Initial camera.
    pub camera: Camera,
    /// Backend to build.
    pub backend: Backend,
}

impl SurfaceConfig {
    /// Terminal surface with the default camera.
    pub fn terminal() -> Self {
        Self::default()
    }

    /// Headless surface recording into `log`.
    pub fn headless(log: FrameLog) -> Self {
        Self {
            backend: Backend::Headless(log),
            ..Self::default()
        }
    }

    /// Set the camera.
    #[must_use]
    pub const fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build the configured surface.
    pub fn build(self) -> Result<Box<dyn Surface>, CanvasError> {
        Ok(match self.backend {
            Backend::Terminal => Box::new(TerminalSurface::new(self.title, self.camera)?),
            Backend::Headless(log) => Box::new(HeadlessSurface::new(log)),
        })
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            title: "vizrelay".to_string(),
            camera: Camera::default(),
            backend: Backend::default(),
        }
    }
}
