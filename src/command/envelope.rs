//! `CommandEnvelope`: a command paired with its presentation time.

use super::primitive::Command;
use super::time::PresentationTime;

/// A command in flight between a producer and a canvas worker.
///
/// Consumed exactly once by the worker: executed, deferred then executed,
/// or dropped.
#[derive(Debug, Clone)]
pub struct CommandEnvelope {
    /// When the command was created and when it should be presented.
    pub time: PresentationTime,
    /// The command itself.
    pub command: Command,
}

impl CommandEnvelope {
    /// Wrap a command with explicit timing.
    pub fn new(command: impl Into<Command>, time: PresentationTime) -> Self {
        Self {
            time,
            command: command.into(),
        }
    }

    /// Wrap a command to be presented immediately.
    pub fn now(command: impl Into<Command>) -> Self {
        Self::new(command, PresentationTime::now())
    }

    /// The shutdown envelope: never stale, never dropped by backpressure.
    pub fn terminate() -> Self {
        Self::new(Command::Terminate, PresentationTime::unbounded())
    }
}
