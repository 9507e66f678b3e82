//! Executes commands against a worker context.

use super::context::{AxisGizmo, Markers, SceneObject, WorkerContext};
use crate::command::{Axes, Command, Scatter};
use crate::error::CanvasError;

/// Execute one command.
///
/// Only a failing `Setup` returns an error; drawing commands always succeed.
pub fn dispatch(ctx: &mut WorkerContext, command: Command) -> Result<(), CanvasError> {
    match command {
        Command::Setup(config) => {
            let surface = config.build()?;
            ctx.install_surface(surface);
        }
        Command::Scatter(scatter) => apply_scatter(ctx, scatter),
        Command::Axes(axes) => apply_axes(ctx, axes),
        Command::Remove { key } => {
            if ctx.remove(&key).is_none() {
                tracing::debug!(%key, "remove: no such object");
            }
        }
        Command::Terminate => ctx.request_stop(),
    }
    Ok(())
}

/// Resolve a parent key; unknown parents attach to the scene root.
fn resolve_parent(ctx: &WorkerContext, key: &str, parent: Option<String>) -> Option<String> {
    let parent = parent?;
    if parent == key {
        tracing::debug!(key, "object cannot parent itself, attaching to root");
        return None;
    }
    if ctx.contains(&parent) {
        Some(parent)
    } else {
        tracing::debug!(key, %parent, "unknown parent, attaching to root");
        None
    }
}

// The parent is fixed when an object is created; updates keep it.

fn apply_scatter(ctx: &mut WorkerContext, scatter: Scatter) {
    let Scatter {
        key,
        parent,
        points,
        color,
        size,
    } = scatter;
    let parent = resolve_parent(ctx, &key, parent);

    let object = ctx.ensure_get(&key, || {
        SceneObject::Markers(Markers {
            parent,
            ..Markers::default()
        })
    });
    if let SceneObject::Markers(existing) = object {
        existing.points = points;
        existing.color = color;
        existing.size = size;
    } else {
        tracing::debug!(%key, "replacing axes with markers");
        let parent = object.parent().map(str::to_string);
        *object = SceneObject::Markers(Markers {
            points,
            color,
            size,
            parent,
        });
    }
}

fn apply_axes(ctx: &mut WorkerContext, axes: Axes) {
    let Axes { key, parent, scale } = axes;
    let parent = resolve_parent(ctx, &key, parent);

    let object = ctx.ensure_get(&key, || {
        SceneObject::Axes(AxisGizmo {
            parent,
            ..AxisGizmo::default()
        })
    });
    if let SceneObject::Axes(existing) = object {
        existing.scale = scale;
    } else {
        tracing::debug!(%key, "replacing markers with axes");
        let parent = object.parent().map(str::to_string);
        *object = SceneObject::Axes(AxisGizmo { scale, parent });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Rgb;
    use crate::surface::{FrameLog, SurfaceConfig};
    use std::time::Instant;

    #[test]
    fn test_scatter_creates_then_updates() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Scatter::new(vec![[0.0; 3]]).key("x").into()).unwrap();
        dispatch(
            &mut ctx,
            Scatter::new(vec![[1.0; 3]; 4]).key("x").color(Rgb::RED).into(),
        )
        .unwrap();

        assert_eq!(ctx.len(), 1);
        match ctx.get("x") {
            Some(SceneObject::Markers(markers)) => {
                assert_eq!(markers.points.len(), 4);
                assert_eq!(markers.color, Rgb::RED);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_scatter_default_key() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Scatter::new(vec![]).into()).unwrap();
        assert!(ctx.contains(crate::command::DEFAULT_KEY));
    }

    #[test]
    fn test_parent_resolution() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Axes::new().key("world").into()).unwrap();
        dispatch(&mut ctx, Scatter::new(vec![]).key("a").parent("world").into()).unwrap();
        dispatch(&mut ctx, Scatter::new(vec![]).key("b").parent("missing").into()).unwrap();
        dispatch(&mut ctx, Axes::new().key("c").parent("c").into()).unwrap();

        assert_eq!(ctx.get("a").and_then(SceneObject::parent), Some("world"));
        assert_eq!(ctx.get("b").and_then(SceneObject::parent), None);
        assert_eq!(ctx.get("c").and_then(SceneObject::parent), None);
    }

    #[test]
    fn test_parent_fixed_at_creation() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Axes::new().key("world").into()).unwrap();
        dispatch(&mut ctx, Axes::new().key("other").into()).unwrap();
        dispatch(&mut ctx, Scatter::new(vec![]).key("x").parent("world").into()).unwrap();

        dispatch(&mut ctx, Scatter::new(vec![[0.0; 3]; 2]).key("x").parent("other").into()).unwrap();
        dispatch(&mut ctx, Scatter::new(vec![[0.0; 3]; 3]).key("x").into()).unwrap();

        assert_eq!(ctx.get("x").and_then(SceneObject::parent), Some("world"));
        assert_eq!(ctx.get("x").map(SceneObject::magnitude), Some(3));
    }

    #[test]
    fn test_axes_replace_markers_under_same_key() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Scatter::new(vec![[0.0; 3]]).key("k").into()).unwrap();
        dispatch(&mut ctx, Axes::new().key("k").scale(0.25).into()).unwrap();
        assert_eq!(ctx.get("k").map(SceneObject::kind), Some("axes"));
        assert_eq!(ctx.get("k").map(SceneObject::magnitude), Some(250));
    }

    #[test]
    fn test_setup_installs_surface() {
        let mut ctx = WorkerContext::new(Instant::now());
        assert!(!ctx.has_surface());
        dispatch(&mut ctx, SurfaceConfig::headless(FrameLog::new()).into()).unwrap();
        assert!(ctx.has_surface());
    }

    #[test]
    fn test_remove_and_terminate() {
        let mut ctx = WorkerContext::new(Instant::now());
        dispatch(&mut ctx, Axes::new().key("world").into()).unwrap();
        dispatch(&mut ctx, Command::Remove { key: "world".to_string() }).unwrap();
        dispatch(&mut ctx, Command::Remove { key: "world".to_string() }).unwrap();
        assert!(ctx.is_empty());

        dispatch(&mut ctx, Command::Terminate).unwrap();
        assert!(!ctx.is_running());
    }
}
