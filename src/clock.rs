//! Timer primitives
//!
//! A [`Clock`] arms a repeating timer for one run and cancels it again.
//! Timers never call back into the engine directly: each firing is
//! delivered as the [`RunId`] it was armed for, and the engine discards any
//! tick whose run is no longer current. That makes a tick which was already
//! queued when the run ended harmless.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::trial::RunId;

/// Opaque handle of an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Returns the raw handle number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Repeating-timer capability used by the trial engine.
pub trait Clock: Send {
    /// Arms a timer firing every `period` on behalf of `run`.
    fn set_interval(&mut self, period: Duration, run: RunId) -> TimerHandle;

    /// Cancels a timer. Cancelling an unknown or already cancelled handle is
    /// a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

// ============================================================================
// Tokio clock
// ============================================================================

/// Callback receiving timer firings. Returning `false` stops the timer.
pub type TickFn = Arc<dyn Fn(RunId) -> bool + Send + Sync>;

/// Clock backed by a spawned `tokio::time::interval` task per timer.
///
/// Must be used from within a tokio runtime.
pub struct TokioClock {
    on_tick: TickFn,
    timers: HashMap<TimerHandle, CancellationToken>,
    next_handle: u64,
}

impl TokioClock {
    /// Creates a clock that reports every firing through `on_tick`.
    pub fn new(on_tick: impl Fn(RunId) -> bool + Send + Sync + 'static) -> Self {
        Self {
            on_tick: Arc::new(on_tick),
            timers: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Returns the number of timers that have not been cancelled.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Clock for TokioClock {
    fn set_interval(&mut self, period: Duration, run: RunId) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let cancel = CancellationToken::new();
        self.timers.insert(handle, cancel.clone());

        // First firing one full period after arming, like a browser
        // `setInterval`.
        let start = tokio::time::Instant::now() + period;
        let on_tick = Arc::clone(&self.on_tick);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(%run, "timer cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        trace!(%run, "timer fired");
                        if !on_tick(run) {
                            debug!(%run, "tick receiver gone; stopping timer");
                            break;
                        }
                    }
                }
            }
        });

        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(token) = self.timers.remove(&handle) {
            token.cancel();
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for (_, token) in self.timers.drain() {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for TokioClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioClock")
            .field("active_timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Manual clock
// ============================================================================

/// A timer armed on a [`ManualClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    /// Handle returned to the engine.
    pub handle: TimerHandle,
    /// Run the timer was armed for.
    pub run: RunId,
    /// Requested period.
    pub period: Duration,
}

#[derive(Debug, Default)]
struct ManualState {
    next_handle: u64,
    armed: Vec<ArmedTimer>,
    cancelled: usize,
}

/// Clock that only records timers; the caller delivers ticks by hand.
///
/// Clones share state, so a test can keep one clone while the engine owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Creates a clock with no armed timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the timers currently armed.
    #[must_use]
    pub fn armed(&self) -> Vec<ArmedTimer> {
        self.lock().armed.clone()
    }

    /// Returns how many cancellations removed a live timer.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.lock().cancelled
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn set_interval(&mut self, period: Duration, run: RunId) -> TimerHandle {
        let mut state = self.lock();
        state.next_handle += 1;
        let handle = TimerHandle(state.next_handle);
        state.armed.push(ArmedTimer {
            handle,
            run,
            period,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut state = self.lock();
        let before = state.armed.len();
        state.armed.retain(|t| t.handle != handle);
        if state.armed.len() < before {
            state.cancelled += 1;
        }
    }
}
