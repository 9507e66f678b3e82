//! `HandoffQueue`: the bounded FIFO between producers and a canvas worker.
//!
//! Producers block on a full queue for at most the command's own
//! `max_queue_time`, then give up and drop it. A slow or stalled worker
//! therefore never wedges or crashes a producer. The worker side only ever
//! polls.

use crate::command::CommandEnvelope;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError};
use std::cell::Cell;
use std::time::Duration;

/// What happened to an enqueued envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The envelope is in the queue.
    Accepted,
    /// The queue stayed full past the envelope's `max_queue_time`.
    DroppedFull,
    /// The worker is gone; nothing will ever read the envelope.
    Disconnected,
}

impl Enqueued {
    /// Whether the envelope made it into the queue.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Producer side of a handoff queue. Cheap to clone; safe to share between threads.
#[derive(Debug, Clone)]
pub struct HandoffQueue {
    sender: Sender<CommandEnvelope>,
}

/// Consumer side of a handoff queue. Owned by exactly one worker.
#[derive(Debug)]
pub struct HandoffReceiver {
    receiver: Receiver<CommandEnvelope>,
    disconnected: Cell<bool>,
}

/// Create a handoff queue holding at most `capacity` envelopes.
///
/// A capacity of zero is raised to one; the queue always has room to buffer
/// the setup command before a worker exists.
pub fn handoff(capacity: usize) -> (HandoffQueue, HandoffReceiver) {
    let (sender, receiver) = bounded(capacity.max(1));
    (
        HandoffQueue { sender },
        HandoffReceiver {
            receiver,
            disconnected: Cell::new(false),
        },
    )
}

impl HandoffQueue {
    /// Push an envelope, waiting up to its `max_queue_time` for room.
    ///
    /// Drops are logged here and reported through the return value; they
    /// are never errors for the caller.
    pub fn enqueue(&self, envelope: CommandEnvelope) -> Enqueued {
        let command = envelope.command.name();
        let result = if envelope.time.is_unbounded() {
            self.sender.send(envelope).map_err(|_| SendTimeoutError::Disconnected(()))
        } else {
            let timeout = envelope.time.max_queue_time();
            self.sender
                .send_timeout(envelope, timeout)
                .map_err(|err| match err {
                    SendTimeoutError::Timeout(_) => SendTimeoutError::Timeout(()),
                    SendTimeoutError::Disconnected(_) => SendTimeoutError::Disconnected(()),
                })
        };

        match result {
            Ok(()) => Enqueued::Accepted,
            Err(SendTimeoutError::Timeout(())) => {
                tracing::warn!(command, capacity = self.capacity(), "queue full, dropping command");
                Enqueued::DroppedFull
            }
            Err(SendTimeoutError::Disconnected(())) => {
                tracing::warn!(command, "worker disconnected, dropping command");
                Enqueued::Disconnected
            }
        }
    }

    /// Number of envelopes currently queued. A snapshot, stale on return.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Whether the queue looked empty at the moment of the call.
    ///
    /// A hint only: another producer may push, or the worker may pop,
    /// before the caller acts on the answer.
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Maximum number of queued envelopes.
    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(usize::MAX)
    }
}

impl HandoffReceiver {
    /// Pop the next envelope without blocking.
    ///
    /// `None` means the queue is empty (or every producer is gone); both are
    /// ordinary outcomes for a tick.
    pub fn dequeue_nonblocking(&self) -> Option<CommandEnvelope> {
        match self.receiver.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.disconnected.set(true);
                None
            }
        }
    }

    /// Whether a dequeue found the queue empty with every producer gone.
    ///
    /// Once true, no envelope will ever arrive again.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.get()
    }

    /// Wait up to `timeout` for an envelope. Only used at bootstrap.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<CommandEnvelope, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Number of envelopes currently queued.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, PresentationTime};
    use std::thread;
    use std::time::Instant;

    fn envelope(max_queue_time: Duration) -> CommandEnvelope {
        CommandEnvelope::new(
            Command::Remove { key: "x".to_string() },
            PresentationTime::now().with_max_queue_time(max_queue_time),
        )
    }

    #[test]
    fn test_full_queue_drops_immediately_with_zero_tolerance() {
        let (queue, rx) = handoff(2);
        assert_eq!(queue.enqueue(envelope(Duration::ZERO)), Enqueued::Accepted);
        assert_eq!(queue.enqueue(envelope(Duration::ZERO)), Enqueued::Accepted);
        assert_eq!(queue.enqueue(envelope(Duration::ZERO)), Enqueued::DroppedFull);
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn test_full_queue_waits_then_drops() {
        let (queue, _rx) = handoff(1);
        assert!(queue.enqueue(envelope(Duration::ZERO)).is_accepted());

        let start = Instant::now();
        let outcome = queue.enqueue(envelope(Duration::from_millis(50)));
        assert_eq!(outcome, Enqueued::DroppedFull);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_blocked_enqueue_succeeds_when_room_frees() {
        let (queue, rx) = handoff(1);
        assert!(queue.enqueue(envelope(Duration::ZERO)).is_accepted());

        let consumer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let first = rx.dequeue_nonblocking();
            (first.is_some(), rx)
        });

        assert_eq!(queue.enqueue(envelope(Duration::from_secs(2))), Enqueued::Accepted);
        let (popped, _rx) = consumer.join().unwrap();
        assert!(popped);
    }

    #[test]
    fn test_unbounded_enqueue_waits_for_room() {
        let (queue, rx) = handoff(1);
        assert!(queue.enqueue(envelope(Duration::ZERO)).is_accepted());

        let consumer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut seen = Vec::new();
            let deadline = Instant::now() + Duration::from_secs(2);
            while seen.len() < 2 && Instant::now() < deadline {
                if let Some(envelope) = rx.dequeue_nonblocking() {
                    seen.push(envelope.command.name());
                }
            }
            seen
        });

        assert_eq!(queue.enqueue(CommandEnvelope::terminate()), Enqueued::Accepted);
        assert_eq!(consumer.join().unwrap(), vec!["remove", "terminate"]);
    }

    #[test]
    fn test_fifo_order() {
        let (queue, rx) = handoff(4);
        for key in ["a", "b", "c"] {
            queue.enqueue(CommandEnvelope::now(Command::Remove { key: key.to_string() }));
        }
        let keys: Vec<_> = std::iter::from_fn(|| rx.dequeue_nonblocking())
            .map(|envelope| match envelope.command {
                Command::Remove { key } => key,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_dequeue_returns_none() {
        let (_queue, rx) = handoff(4);
        assert!(rx.dequeue_nonblocking().is_none());
        assert!(rx.is_empty());
    }

    #[test]
    fn test_disconnected_producers_drain_first() {
        let (queue, rx) = handoff(4);
        queue.enqueue(CommandEnvelope::now(Command::Terminate));
        drop(queue);
        assert!(rx.dequeue_nonblocking().is_some());
        assert!(!rx.is_disconnected());
        assert!(rx.dequeue_nonblocking().is_none());
        assert!(rx.is_disconnected());
    }

    #[test]
    fn test_disconnected_worker() {
        let (queue, rx) = handoff(4);
        drop(rx);
        assert_eq!(queue.enqueue(CommandEnvelope::now(Command::Terminate)), Enqueued::Disconnected);
        assert_eq!(queue.enqueue(CommandEnvelope::terminate()), Enqueued::Disconnected);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (queue, _rx) = handoff(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.enqueue(envelope(Duration::ZERO)).is_accepted());
    }

    #[test]
    fn test_concurrent_producers_never_exceed_capacity() {
        let (queue, rx) = handoff(3);
        let producers: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.enqueue(envelope(Duration::from_millis(10))))
            })
            .collect();
        let accepted = producers
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|outcome| outcome.is_accepted())
            .count();
        assert_eq!(accepted, 3);
        assert_eq!(rx.len(), 3);
    }
}
