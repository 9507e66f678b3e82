//! `WorkerLoop`: the fixed-rate consumer behind every canvas.
//!
//! Each tick does a bounded amount of work regardless of backlog:
//!
//! 1. Pop up to `drain_budget` envelopes, discarding stale ones, and stop at
//!    the first fresh one.
//! 2. Run that envelope now if its presentation time has arrived, otherwise
//!    hand it to the deferred scheduler.
//! 3. Run every deferred command whose presentation time has arrived.
//!
//! At most one freshly dequeued command is promoted per tick. Stale entries
//! are thrown away rather than kept, so a backlog still drains under load.

use super::context::{FrameInfo, WorkerContext};
use super::dispatch::dispatch;
use super::pacer::FramePacer;
use super::queue::HandoffReceiver;
use super::scheduler::DeferredScheduler;
use crate::command::{Command, CommandEnvelope};
use crate::error::CanvasError;
use crossbeam_channel::RecvTimeoutError;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Envelopes inspected per tick when none is given.
pub const DEFAULT_DRAIN_BUDGET: usize = 100;

/// Tuning for a worker loop.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Thread name.
    pub name: String,
    /// Ticks per second.
    pub target_fps: u32,
    /// How long to wait for the setup command before giving up.
    pub bootstrap_timeout: Duration,
    /// Maximum envelopes popped per tick.
    pub drain_budget: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            name: "vizrelay-worker".to_string(),
            target_fps: 60,
            bootstrap_timeout: Duration::from_secs(1),
            drain_budget: DEFAULT_DRAIN_BUDGET,
        }
    }
}

/// Counters accumulated over a worker's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Ticks run.
    pub ticks: u64,
    /// Commands executed, immediately or after deferral.
    pub executed: u64,
    /// Commands handed to the deferred scheduler.
    pub deferred: u64,
    /// Envelopes discarded as stale.
    pub stale_dropped: u64,
    /// Ticks that spent their whole drain budget on stale envelopes.
    pub budget_exhaustions: u64,
    /// Frames presented to the surface.
    pub frames_presented: u64,
    /// Commands that failed to execute.
    pub failed: u64,
}

/// What happened to the fresh envelope found during a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// No fresh envelope was found.
    Idle,
    /// The envelope was due and ran this tick.
    Executed,
    /// The envelope is waiting in the deferred scheduler.
    Deferred,
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Envelopes popped from the queue.
    pub popped: usize,
    /// Popped envelopes discarded as stale.
    pub stale_dropped: usize,
    /// Fate of the fresh envelope, if any.
    pub promotion: Promotion,
    /// Deferred commands that came due and ran.
    pub ran_due: usize,
    /// Whether a frame was presented.
    pub presented: bool,
}

/// The consumer side of a canvas: queue, deferred scheduler and context.
pub struct WorkerLoop {
    queue: HandoffReceiver,
    scheduler: DeferredScheduler<Command>,
    context: WorkerContext,
    drain_budget: usize,
    stats: WorkerStats,
}

impl WorkerLoop {
    /// Wrap an already prepared context. A drain budget of zero is raised to one.
    pub fn new(queue: HandoffReceiver, context: WorkerContext, drain_budget: usize) -> Self {
        Self {
            queue,
            scheduler: DeferredScheduler::new(),
            context,
            drain_budget: drain_budget.max(1),
            stats: WorkerStats::default(),
        }
    }

    /// Wait for the setup command and build the surface from it.
    ///
    /// The first envelope a worker receives must be a setup command and must
    /// arrive within `timeout`; anything else is fatal.
    pub fn bootstrap(
        queue: HandoffReceiver,
        timeout: Duration,
        drain_budget: usize,
    ) -> Result<Self, CanvasError> {
        let envelope = match queue.dequeue_timeout(timeout) {
            Ok(envelope) => envelope,
            Err(RecvTimeoutError::Timeout) => return Err(CanvasError::BootstrapTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => return Err(CanvasError::Disconnected),
        };
        let config = match envelope.command {
            Command::Setup(config) => config,
            other => return Err(CanvasError::UnexpectedBootstrap(other.name())),
        };

        let mut context = WorkerContext::new(Instant::now());
        dispatch(&mut context, Command::Setup(config))?;
        Ok(Self::new(queue, context, drain_budget))
    }

    /// Run one tick at `now`.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let previous = self.context.frame();
        self.context.set_frame(FrameInfo {
            frame: self.stats.ticks,
            now,
            dt: now.saturating_duration_since(previous.now),
        });
        self.stats.ticks += 1;

        let (popped, stale_dropped, fresh) = self.drain(now);

        let promotion = match fresh {
            None => Promotion::Idle,
            Some(envelope) if envelope.time.is_due(now) => {
                execute(&mut self.context, &mut self.stats, envelope.command);
                Promotion::Executed
            }
            Some(envelope) => {
                self.scheduler.schedule_at(envelope.time.pts(), envelope.command);
                self.stats.deferred += 1;
                Promotion::Deferred
            }
        };

        let context = &mut self.context;
        let stats = &mut self.stats;
        let ran_due = self
            .scheduler
            .run_due_nonblocking(now, |command| execute(context, stats, command));

        let presented = self.present();

        TickReport {
            popped,
            stale_dropped,
            promotion,
            ran_due,
            presented,
        }
    }

    /// Pop until a fresh envelope turns up, the queue runs dry or the budget
    /// is spent.
    fn drain(&mut self, now: Instant) -> (usize, usize, Option<CommandEnvelope>) {
        let mut popped = 0;
        let mut stale = 0;
        let mut fresh = None;

        while popped < self.drain_budget {
            let Some(envelope) = self.queue.dequeue_nonblocking() else {
                break;
            };
            popped += 1;
            if envelope.time.is_stale(now) {
                stale += 1;
                continue;
            }
            fresh = Some(envelope);
            break;
        }

        self.stats.stale_dropped += stale as u64;
        if stale == self.drain_budget {
            self.stats.budget_exhaustions += 1;
            tracing::info!(dropped = stale, "drain budget spent on stale commands");
        } else if stale > 0 {
            tracing::debug!(dropped = stale, "discarded stale commands");
        }

        (popped, stale, fresh)
    }

    fn present(&mut self) -> bool {
        if !self.context.has_surface() {
            return false;
        }
        match self.context.present() {
            Ok(presented) => {
                if presented {
                    self.stats.frames_presented += 1;
                }
                presented
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to present frame");
                false
            }
        }
    }

    /// Tick at the configured rate until a terminate command runs, or until
    /// every producer is gone and nothing is left to run.
    pub fn run(mut self, target_fps: u32) -> WorkerStats {
        let mut pacer = FramePacer::new(target_fps, Instant::now());

        while self.context.is_running() {
            let now = pacer.wait();
            self.tick(now);

            if self.queue.is_disconnected() && self.scheduler.is_empty() {
                tracing::debug!("all producers gone, stopping worker");
                break;
            }
        }

        self.context.close_surface();
        tracing::debug!(stats = ?self.stats, "worker stopped");
        self.stats
    }

    /// The worker-local context.
    pub const fn context(&self) -> &WorkerContext {
        &self.context
    }

    /// Mutable access to the worker-local context.
    pub fn context_mut(&mut self) -> &mut WorkerContext {
        &mut self.context
    }

    /// Number of commands waiting for their presentation time.
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    /// Presentation time of the earliest deferred command.
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Lifetime counters.
    pub const fn stats(&self) -> WorkerStats {
        self.stats
    }
}

fn execute(context: &mut WorkerContext, stats: &mut WorkerStats, command: Command) {
    let name = command.name();
    stats.executed += 1;
    if let Err(err) = dispatch(context, command) {
        stats.failed += 1;
        tracing::error!(command = name, error = %err, "command failed");
    }
}

/// Spawn a worker thread that bootstraps from `queue` and runs until terminated.
///
/// The thread's result carries the final counters, or the error that kept the
/// worker from starting.
pub fn spawn_worker(
    queue: HandoffReceiver,
    options: WorkerOptions,
) -> std::io::Result<JoinHandle<Result<WorkerStats, CanvasError>>> {
    thread::Builder::new()
        .name(options.name.clone())
        .spawn(move || {
            let worker = WorkerLoop::bootstrap(queue, options.bootstrap_timeout, options.drain_budget)
                .inspect_err(|err| {
                    tracing::error!(worker = %options.name, error = %err, "worker failed to start");
                })?;
            tracing::debug!(worker = %options.name, fps = options.target_fps, "worker started");
            Ok(worker.run(options.target_fps))
        })
}
