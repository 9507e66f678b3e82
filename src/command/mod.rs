//! Commands: what producers send and when it should be presented.
//!
//! This module contains:
//! - [`PresentationTime`]: creation time, presentation timestamp and staleness tolerance
//! - [`CommandEnvelope`]: a command paired with its presentation time
//! - [`Command`]: the typed variants a worker knows how to execute
//! - [`Scatter`], [`Axes`], [`Rgb`]: drawing command payloads

mod envelope;
mod primitive;
mod time;

pub use envelope::CommandEnvelope;
pub use primitive::{Axes, Command, Rgb, Scatter, DEFAULT_KEY};
pub use time::PresentationTime;
