//! Presentation time: when a command was created and when it should show.
//!
//! Every command carries a [`PresentationTime`]. The worker uses it twice:
//! once to decide whether the command went stale while queued, and once to
//! decide whether it runs now or waits for its presentation timestamp.

use std::time::{Duration, Instant};

/// Immutable timing information attached to every command.
///
/// `pts` may precede `created` (the command is already due) or follow it
/// (the command is deferred until `pts` arrives).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationTime {
    /// Monotonic creation timestamp.
    created: Instant,
    /// Target presentation timestamp.
    pts: Instant,
    /// Staleness tolerance, also used as the producer's enqueue timeout.
    max_queue_time: Duration,
}

impl PresentationTime {
    /// Staleness tolerance used when none is supplied (one second).
    pub const DEFAULT_MAX_QUEUE_TIME: Duration = Duration::from_secs(1);

    /// Tolerance that never expires and never gives up on a full queue.
    pub const UNBOUNDED: Duration = Duration::MAX;

    /// Present as soon as possible.
    pub fn now() -> Self {
        Self::created_at(Instant::now())
    }

    /// Present `delta` after now.
    pub fn at(delta: Duration) -> Self {
        Self::now().delayed_by(delta)
    }

    /// Present as if scheduled `delta` before now.
    ///
    /// The resulting command is already due when it is dequeued.
    pub fn earlier(delta: Duration) -> Self {
        Self::now().advanced_by(delta)
    }

    /// Timing for a command created at an explicit instant.
    ///
    /// `pts` equals `created`. Mostly useful with a recorded clock.
    pub const fn created_at(created: Instant) -> Self {
        Self {
            created,
            pts: created,
            max_queue_time: Self::DEFAULT_MAX_QUEUE_TIME,
        }
    }

    /// Timing that survives any amount of queueing and backpressure.
    ///
    /// Used for shutdown so it is never dropped.
    pub fn unbounded() -> Self {
        Self::now().with_max_queue_time(Self::UNBOUNDED)
    }

    /// Shift `pts` later by `delta`.
    ///
    /// Saturates at the latest instant the platform clock can represent, so
    /// an oversized delay still lands in the future.
    #[must_use]
    pub fn delayed_by(mut self, delta: Duration) -> Self {
        self.pts = saturating_add(self.pts, delta);
        self
    }

    /// Shift `pts` earlier by `delta`.
    ///
    /// Clamps at `created` when the platform clock cannot represent the
    /// earlier instant; either way the command is due on arrival.
    #[must_use]
    pub fn advanced_by(mut self, delta: Duration) -> Self {
        self.pts = self.pts.checked_sub(delta).unwrap_or(self.created);
        self
    }

    /// Replace the staleness tolerance.
    #[must_use]
    pub const fn with_max_queue_time(mut self, max_queue_time: Duration) -> Self {
        self.max_queue_time = max_queue_time;
        self
    }

    /// Creation timestamp.
    #[inline]
    pub const fn created(&self) -> Instant {
        self.created
    }

    /// Presentation timestamp.
    #[inline]
    pub const fn pts(&self) -> Instant {
        self.pts
    }

    /// Staleness tolerance and enqueue timeout.
    #[inline]
    pub const fn max_queue_time(&self) -> Duration {
        self.max_queue_time
    }

    /// Whether this tolerance never expires.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max_queue_time == Self::UNBOUNDED
    }

    /// Time elapsed since creation, zero if `now` precedes it.
    #[inline]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created)
    }

    /// Whether the command aged past its own tolerance at `now`.
    #[inline]
    pub fn is_stale(&self, now: Instant) -> bool {
        self.age(now) > self.max_queue_time
    }

    /// Whether the presentation timestamp has arrived at `now`.
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.pts <= now
    }
}

/// `base + delta`, clamped to the latest representable `Instant`.
fn saturating_add(base: Instant, mut delta: Duration) -> Instant {
    let mut instant = base;
    while !delta.is_zero() {
        match instant.checked_add(delta) {
            Some(later) => instant = later,
            None => delta /= 2,
        }
    }
    instant
}

impl Default for PresentationTime {
    fn default() -> Self {
        Self::now()
    }
}
