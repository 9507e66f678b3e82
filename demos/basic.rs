//! Basic Demo: axes that grow, two point clouds, and a short animation.
//!
//! Everything is scheduled up front with presentation times; the canvas
//! worker plays it back at 60 fps.
//!
//! Run with `--headless` to record frames instead of drawing to the terminal.

use std::error::Error;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vizrelay::{draw, Axes, CanvasConfig, CanvasRegistry, FrameLog, Rgb, Scatter};

/// A small deterministic cloud of `n` points around the origin.
fn cloud(n: usize, seed: f32) -> Vec<[f32; 3]> {
    (0..n)
        .map(|i| {
            let t = i as f32 * 0.7 + seed;
            [t.sin() * 0.8, (t * 1.3).cos() * 0.8, (t * 0.5).sin() * 0.8]
        })
        .collect()
}

fn basic() -> Result<(), Box<dyn Error>> {
    draw::axes(Axes::new().key("world").scale(0.25), None)?;

    // Scale to 1.0 after one second
    draw::axes(Axes::new().key("world").scale(1.0), Some(draw::dt(Duration::from_secs(1))))?;

    let xyz = cloud(10, 0.0);
    draw::scatter(Scatter::new(xyz.clone()).color(Rgb::GREEN).key("x"), None)?;
    draw::scatter(
        Scatter::new(cloud(10, 3.0)).color(Rgb::RED).key("y"),
        Some(draw::dt(Duration::from_secs(2))),
    )?;

    for i in 0..30u16 {
        let shift = f32::from(i) * 0.01;
        let moved = xyz.iter().map(|[x, y, z]| [x + shift, *y, *z]).collect();
        draw::scatter(
            Scatter::new(moved).color(Rgb::GREEN).key("x"),
            Some(draw::dt(Duration::from_millis(u64::from(i) * 10))),
        )?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let headless = std::env::args().any(|arg| arg == "--headless");

    // Log lines would tear the alternate screen, so stay quiet there.
    let default_filter = if headless { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let log = FrameLog::new();
    if headless {
        CanvasRegistry::init_global(CanvasConfig::headless(log.clone()));
    }

    basic()?;

    thread::sleep(Duration::from_secs(3));
    draw::close_all();
    for result in CanvasRegistry::global().join_all() {
        let stats = result?;
        println!(
            "ticks={} executed={} deferred={} stale={} frames={}",
            stats.ticks, stats.executed, stats.deferred, stats.stale_dropped, stats.frames_presented
        );
    }

    if let Some(frame) = log.last() {
        println!("last frame #{}:", frame.frame);
        for object in &frame.objects {
            println!("  {} ({}) size={} parent={:?}", object.key, object.kind, object.size, object.parent);
        }
    }

    Ok(())
}
