//! `FramePacer`: fixed-rate timing for the worker loop.
//!
//! The pacer runs on the worker thread itself. Each call to
//! [`FramePacer::wait`] sleeps until the next deadline and returns the time
//! the tick fired; frame numbers and `dt` are kept by the worker loop. When
//! the worker falls behind, missed deadlines are skipped rather than replayed
//! in a burst.

use std::thread;
use std::time::{Duration, Instant};

/// Sleeps the calling thread to a fixed tick rate.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    next_tick: Instant,
}

impl FramePacer {
    /// Pace at `fps` ticks per second, starting one interval from `start`.
    ///
    /// A rate of zero is treated as one tick per second.
    pub fn new(fps: u32, start: Instant) -> Self {
        let interval = Duration::from_secs(1) / fps.max(1);
        Self {
            interval,
            next_tick: start + interval,
        }
    }

    /// Time between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep until the next tick is due and return when it fired.
    pub fn wait(&mut self) -> Instant {
        let now = Instant::now();
        if now < self.next_tick {
            thread::sleep(self.next_tick - now);
        }
        self.advance(Instant::now())
    }

    /// Record a tick at `now` and schedule the next deadline.
    pub fn advance(&mut self, now: Instant) -> Instant {
        self.next_tick += self.interval;

        // Behind schedule: drop the backlog instead of bursting.
        if self.next_tick < now {
            self.next_tick = now + self.interval;
        }
        now
    }
}
