//! `TerminalSurface`: draws the scene into the terminal's alternate screen.
//!
//! Each frame is assembled as ANSI sequences in a pre-allocated byte buffer
//! and written in a single call, so the terminal never shows a half-drawn
//! frame.

use super::{Camera, Surface};
use crate::command::Rgb;
use crate::error::CanvasError;
use crate::worker::{Scene, SceneObject};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};

/// Samples per axis line.
const AXIS_STEPS: usize = 24;

/// Surface backed by the controlling terminal.
pub struct TerminalSurface {
    stdout: Stdout,
    title: String,
    camera: Camera,
    /// Pre-allocated frame buffer.
    output: Vec<u8>,
    closed: bool,
}

/// Maps projected scene coordinates to terminal cells.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    width: u16,
    height: u16,
    extent: f32,
}

impl Viewport {
    /// Row 0 is reserved for the title.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell(self, (x, y): (f32, f32)) -> Option<(u16, u16)> {
        let cols = f32::from(self.width.saturating_sub(1));
        let rows = f32::from(self.height.saturating_sub(2));
        let col = (x / self.extent).mul_add(0.5, 0.5) * cols;
        let row = (0.5 - 0.5 * (y / self.extent)) * rows + 1.0;
        if !(0.0..=cols).contains(&col) || !(1.0..=rows + 1.0).contains(&row) {
            return None;
        }
        Some((col.round() as u16, row.round() as u16))
    }
}

impl TerminalSurface {
    /// Enter the alternate screen and hide the cursor.
    pub fn new(title: String, camera: Camera) -> Result<Self, CanvasError> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self {
            stdout,
            title,
            camera,
            output: Vec::with_capacity(65536),
            closed: false,
        })
    }

    /// Largest projected coordinate, so the whole scene fits on screen.
    fn extent(&self, scene: &Scene<'_>) -> f32 {
        let mut extent = 1.0_f32;
        for (_, object) in scene.objects() {
            match object {
                SceneObject::Markers(markers) => {
                    for point in &markers.points {
                        let (x, y) = self.camera.project(*point);
                        extent = extent.max(x.abs()).max(y.abs());
                    }
                }
                SceneObject::Axes(axes) => extent = extent.max(axes.scale.abs()),
            }
        }
        extent * 1.05
    }

    fn put(&mut self, (col, row): (u16, u16), color: Rgb, glyph: char) {
        let _ = write!(
            self.output,
            "\x1b[{};{}H\x1b[38;2;{};{};{}m{glyph}",
            row + 1,
            col + 1,
            color.r,
            color.g,
            color.b
        );
    }

    fn draw_axes(&mut self, viewport: Viewport, scale: f32) {
        let arms = [
            ([1.0, 0.0, 0.0], Rgb::RED, '-'),
            ([0.0, 1.0, 0.0], Rgb::GREEN, '|'),
            ([0.0, 0.0, 1.0], Rgb::BLUE, '/'),
        ];
        for (direction, color, glyph) in arms {
            for step in 0..=AXIS_STEPS {
                #[allow(clippy::cast_precision_loss)]
                let t = scale * step as f32 / AXIS_STEPS as f32;
                let point = direction.map(|component| component * t);
                if let Some(cell) = viewport.cell(self.camera.project(point)) {
                    self.put(cell, color, glyph);
                }
            }
        }
    }

    fn draw_markers(&mut self, viewport: Viewport, points: &[[f32; 3]], color: Rgb, size: f32) {
        let glyph = if size >= 8.0 { '●' } else { '•' };
        for point in points {
            if let Some(cell) = viewport.cell(self.camera.project(*point)) {
                self.put(cell, color, glyph);
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn present(&mut self, scene: &Scene<'_>) -> Result<(), CanvasError> {
        let (width, height) = terminal::size()?;
        let viewport = Viewport {
            width,
            height,
            extent: self.extent(scene),
        };

        self.output.clear();
        self.output.extend_from_slice(b"\x1b[0m\x1b[2J\x1b[1;1H");
        let _ = write!(
            self.output,
            "{} | frame {} | {} objects",
            self.title,
            scene.frame().frame,
            scene.len()
        );

        for (_, object) in scene.objects() {
            match object {
                SceneObject::Axes(axes) => self.draw_axes(viewport, axes.scale),
                SceneObject::Markers(markers) => {
                    self.draw_markers(viewport, &markers.points, markers.color, markers.size);
                }
            }
        }
        self.output.extend_from_slice(b"\x1b[0m");

        self.stdout.write_all(&self.output)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = execute!(self.stdout, cursor::Show, LeaveAlternateScreen);
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.close();
    }
}
