//! `CanvasRegistry`: live canvases and the scoped "current canvas".
//!
//! Drawing helpers that are not given an explicit canvas go to the current
//! one. Overrides live on a single stack owned by the registry; each guard
//! removes exactly its own entry when dropped, whether the scope ends
//! normally, through `?`, or by unwinding. Scopes on different threads may
//! end in any order without leaking an override.

use super::handle::{CanvasConfig, CanvasHandle};
use crate::command::{Command, PresentationTime};
use crate::error::CanvasError;
use crate::worker::{Enqueued, WorkerStats};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

#[derive(Default)]
struct RegistryState {
    handles: Vec<Arc<CanvasHandle>>,
    /// Lazily opened canvas used when no override is active.
    base: Option<Arc<CanvasHandle>>,
    /// Active overrides, innermost last, tagged with their guard's token.
    overrides: Vec<(u64, Arc<CanvasHandle>)>,
    next_token: u64,
}

/// Bookkeeping for every canvas opened through it.
pub struct CanvasRegistry {
    default_config: CanvasConfig,
    state: Mutex<RegistryState>,
}

static GLOBAL: OnceLock<CanvasRegistry> = OnceLock::new();

impl CanvasRegistry {
    /// Create a registry whose lazily created canvas uses `default_config`.
    pub fn new(default_config: CanvasConfig) -> Self {
        Self {
            default_config,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// The process-wide registry, created with the default configuration on
    /// first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(CanvasConfig::default()))
    }

    /// Create the process-wide registry with `default_config`.
    ///
    /// Returns `false` if the global registry already exists; it is left
    /// untouched in that case.
    pub fn init_global(default_config: CanvasConfig) -> bool {
        GLOBAL.set(Self::new(default_config)).is_ok()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn a canvas and register it.
    pub fn open(&self, config: CanvasConfig) -> Result<Arc<CanvasHandle>, CanvasError> {
        let handle = Arc::new(CanvasHandle::spawn(config)?);
        self.lock().handles.push(Arc::clone(&handle));
        Ok(handle)
    }

    /// The current canvas: the innermost active override, or else the base
    /// canvas, opened on first use.
    ///
    /// Repeated calls without an intervening override return the same canvas.
    pub fn current(&self) -> Result<Arc<CanvasHandle>, CanvasError> {
        let mut state = self.lock();
        if let Some((_, handle)) = state.overrides.last() {
            return Ok(Arc::clone(handle));
        }
        if let Some(base) = &state.base {
            return Ok(Arc::clone(base));
        }
        let handle = Arc::new(CanvasHandle::spawn(self.default_config.clone())?);
        state.handles.push(Arc::clone(&handle));
        state.base = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Make `handle` current until the returned guard is dropped.
    pub fn push_current(&self, handle: Arc<CanvasHandle>) -> CurrentGuard<'_> {
        let mut state = self.lock();
        let token = state.next_token;
        state.next_token += 1;
        state.overrides.push((token, handle));
        CurrentGuard {
            registry: self,
            token,
        }
    }

    /// Run `f` with `handle` as the current canvas, restoring the previous
    /// current canvas afterwards on every exit path.
    pub fn with_current<R>(&self, handle: &Arc<CanvasHandle>, f: impl FnOnce(&Arc<CanvasHandle>) -> R) -> R {
        let _guard = self.push_current(Arc::clone(handle));
        f(handle)
    }

    /// Schedule on the current canvas for immediate presentation.
    pub fn schedule(&self, command: impl Into<Command>) -> Result<Enqueued, CanvasError> {
        Ok(self.current()?.schedule(command))
    }

    /// Schedule on the current canvas with explicit timing.
    pub fn schedule_at(
        &self,
        command: impl Into<Command>,
        time: PresentationTime,
    ) -> Result<Enqueued, CanvasError> {
        Ok(self.current()?.schedule_at(command, time))
    }

    /// Every canvas opened through this registry.
    pub fn handles(&self) -> Vec<Arc<CanvasHandle>> {
        self.lock().handles.clone()
    }

    /// Ask every canvas to stop.
    pub fn close_all(&self) {
        // Closing may block on a full queue; never do that under the lock.
        for handle in self.handles() {
            handle.close();
        }
    }

    /// Wait for every canvas worker to exit, in opening order, then forget
    /// the joined canvases.
    ///
    /// Canvases that were already joined are skipped. Canvases opened while
    /// this runs are kept. A joined canvas that is still current or under an
    /// override stays reachable through that slot.
    pub fn join_all(&self) -> Vec<Result<WorkerStats, CanvasError>> {
        let joined = self.handles();
        let results: Vec<_> = joined.iter().filter_map(|handle| handle.join()).collect();
        self.lock()
            .handles
            .retain(|handle| !joined.iter().any(|done| Arc::ptr_eq(handle, done)));
        results
    }
}

/// Ends one override when dropped.
#[must_use = "the override ends as soon as the guard is dropped"]
pub struct CurrentGuard<'a> {
    registry: &'a CanvasRegistry,
    token: u64,
}

impl Drop for CurrentGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.registry.lock();
        if let Some(index) = state.overrides.iter().rposition(|(token, _)| *token == self.token) {
            state.overrides.remove(index);
        }
    }
}
