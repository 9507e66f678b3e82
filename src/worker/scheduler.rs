//! `DeferredScheduler`: holds commands until their presentation time.
//!
//! Entries are kept in a min-heap ordered by `(pts, sequence)`, so due
//! entries come out in presentation order and ties keep insertion order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

struct Entry<T> {
    pts: Instant,
    seq: u64,
    payload: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pts == other.pts && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.pts, self.seq).cmp(&(other.pts, other.seq))
    }
}

/// Worker-local store of payloads keyed by absolute presentation time.
pub struct DeferredScheduler<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> DeferredScheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Hold `payload` until `pts`.
    pub fn schedule_at(&mut self, pts: Instant, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Entry { pts, seq, payload }));
    }

    /// Remove and run every entry with `pts <= now`, earliest first.
    ///
    /// Never blocks and never runs an entry early. Returns how many ran.
    pub fn run_due_nonblocking<F>(&mut self, now: Instant, mut run: F) -> usize
    where
        F: FnMut(T),
    {
        let mut ran = 0;
        while let Some(payload) = self.pop_due(now) {
            run(payload);
            ran += 1;
        }
        ran
    }

    /// Remove the earliest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        if self.heap.peek()?.0.pts > now {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| entry.payload)
    }

    /// Presentation time of the earliest pending entry.
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(entry)| entry.pts)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for DeferredScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    #[test]
    fn test_nothing_runs_early() {
        let t0 = Instant::now();
        let mut scheduler = DeferredScheduler::new();
        scheduler.schedule_at(secs(t0, 2), "a");

        let mut ran = Vec::new();
        assert_eq!(scheduler.run_due_nonblocking(secs(t0, 1), |p| ran.push(p)), 0);
        assert!(ran.is_empty());
        assert_eq!(scheduler.len(), 1);

        assert_eq!(scheduler.run_due_nonblocking(secs(t0, 2), |p| ran.push(p)), 1);
        assert_eq!(ran, vec!["a"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_runs_in_pts_order() {
        let t0 = Instant::now();
        let mut scheduler = DeferredScheduler::new();
        scheduler.schedule_at(secs(t0, 3), "c");
        scheduler.schedule_at(secs(t0, 1), "a");
        scheduler.schedule_at(secs(t0, 2), "b");
        scheduler.schedule_at(secs(t0, 9), "late");

        let mut ran = Vec::new();
        scheduler.run_due_nonblocking(secs(t0, 5), |p| ran.push(p));
        assert_eq!(ran, vec!["a", "b", "c"]);
        assert_eq!(scheduler.next_due(), Some(secs(t0, 9)));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let t0 = Instant::now();
        let mut scheduler = DeferredScheduler::new();
        for payload in ["first", "second", "third"] {
            scheduler.schedule_at(secs(t0, 1), payload);
        }
        let mut ran = Vec::new();
        scheduler.run_due_nonblocking(secs(t0, 1), |p| ran.push(p));
        assert_eq!(ran, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_scheduler() {
        let mut scheduler: DeferredScheduler<()> = DeferredScheduler::default();
        assert!(scheduler.pop_due(Instant::now()).is_none());
        assert!(scheduler.next_due().is_none());
    }
}
