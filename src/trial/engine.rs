//! Trial engine orchestration
//!
//! The `TrialEngine` owns both grid controllers, the phase state machine,
//! the tick/frame counters and the event log. It is driven from outside by
//! two entry points: [`advance`](TrialEngine::advance) for the external
//! start/stop/next trigger and [`tick`](TrialEngine::tick) for timer
//! firings. Both take `&mut self`; serializing them is the caller's job.

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, TimerHandle};
use crate::config::{TrialConfig, Validator};
use crate::error::ConfigError;
use crate::observability::events::{Event, EventLog, LogSink, NullSink};
use crate::observability::metrics;
use crate::random::RandomSource;
use crate::render::{NullGrid, RenderGrid};

use super::grid::{GridController, GridUpdate, Side};
use super::state::{Phase, RunId, TickCounter};

// ============================================================================
// Public types
// ============================================================================

/// Answer option picked during the choice phase.
///
/// Option A is the left grid, option B the right grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Choice {
    /// Left grid.
    A,
    /// Right grid.
    B,
}

impl Choice {
    /// Returns the grid this option refers to.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::A => Side::Left,
            Self::B => Side::Right,
        }
    }

    /// Returns the option letter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// The external advance trigger.
    Advance,
    /// The run reached its configured duration.
    Expired,
}

/// Record of one phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Phase left.
    pub from: Phase,
    /// Phase entered.
    pub to: Phase,
    /// Run the transition belongs to.
    pub run: RunId,
    /// Counters as they stood before the transition reset them.
    pub counter: TickCounter,
    /// Option chosen during the choice phase, set on `Choice → Stopped`.
    pub selection: Option<Choice>,
    /// Trigger of the transition.
    pub reason: TransitionReason,
}

/// Result of delivering one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a finished run, or the engine is not running.
    Stale,
    /// Even tick: the duration clock advanced, no grid update.
    Choked,
    /// Odd tick: both grids were updated.
    Updated {
        /// Left grid result.
        left: GridUpdate,
        /// Right grid result.
        right: GridUpdate,
    },
    /// The run reached its duration and entered the choice phase.
    Expired(Transition),
}

/// Collaborators injected into a [`TrialEngine`].
pub struct EngineParts {
    /// Renderer of the left grid.
    pub left_renderer: Box<dyn RenderGrid>,
    /// Renderer of the right grid.
    pub right_renderer: Box<dyn RenderGrid>,
    /// Timer capability.
    pub clock: Box<dyn Clock>,
    /// Uniform random source shared by both grids.
    pub random: Box<dyn RandomSource>,
    /// Transport for log entries.
    pub sink: Box<dyn LogSink>,
}

impl EngineParts {
    /// Parts with no rendering and no log transport.
    #[must_use]
    pub fn headless(clock: Box<dyn Clock>, random: Box<dyn RandomSource>) -> Self {
        Self {
            left_renderer: Box::new(NullGrid),
            right_renderer: Box::new(NullGrid),
            clock,
            random,
            sink: Box::new(NullSink),
        }
    }
}

impl std::fmt::Debug for EngineParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineParts").finish_non_exhaustive()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Trial state machine with its grids, timer and event log.
pub struct TrialEngine {
    config: TrialConfig,
    phase: Phase,
    counter: TickCounter,
    run: RunId,
    timer: Option<TimerHandle>,
    selection: Option<Choice>,
    left: GridController,
    right: GridController,
    clock: Box<dyn Clock>,
    random: Box<dyn RandomSource>,
    log: EventLog,
}

impl TrialEngine {
    /// Creates an engine in the `Stopped` phase.
    ///
    /// Both grids are cleared and an `init` entry is logged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `config` has any
    /// error-severity issue. Warnings are only logged.
    pub fn new(config: TrialConfig, parts: EngineParts) -> Result<Self, ConfigError> {
        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: "<inline>".to_string(),
                errors: result.errors,
            });
        }
        for issue in &result.warnings {
            warn!(path = %issue.path, "{}", issue.message);
        }

        let mut engine = Self {
            left: GridController::new(
                Side::Left,
                config.grid_size,
                config.left_probability,
                parts.left_renderer,
            ),
            right: GridController::new(
                Side::Right,
                config.grid_size,
                config.right_probability,
                parts.right_renderer,
            ),
            config,
            phase: Phase::Stopped,
            counter: TickCounter::default(),
            run: RunId::default(),
            timer: None,
            selection: None,
            clock: parts.clock,
            random: parts.random,
            log: EventLog::new(parts.sink),
        };

        engine.left.clear();
        engine.right.clear();
        engine.log.log(Event::Init);
        metrics::set_phase(Phase::Stopped);
        debug!(
            grid_size = engine.config.grid_size,
            duration_frames = engine.config.duration_frames,
            "trial engine initialized"
        );

        Ok(engine)
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Applies one external advance trigger.
    ///
    /// `Stopped → Running → Choice → Stopped`. Always succeeds; a `click`
    /// entry naming the new phase is logged after the transition.
    pub fn advance(&mut self) -> Transition {
        let transition = match self.phase {
            Phase::Stopped => self.start_run(),
            Phase::Running => self.stop_run(TransitionReason::Advance),
            Phase::Choice => self.finish_trial(),
        };

        self.log.log(Event::Click { phase: self.phase });
        info!(
            from = %transition.from,
            to = %transition.to,
            run = %transition.run,
            "phase advanced"
        );
        transition
    }

    /// Handles one timer firing armed for `run`.
    pub fn tick(&mut self, run: RunId) -> TickOutcome {
        if self.phase != Phase::Running || run != self.run {
            trace!(%run, current = %self.run, phase = %self.phase, "stale tick discarded");
            metrics::record_stale_tick();
            return TickOutcome::Stale;
        }

        self.counter.ticks += 1;
        metrics::record_tick();

        if self.counter.frames >= self.config.duration_frames {
            let transition = self.stop_run(TransitionReason::Expired);
            info!(
                run = %transition.run,
                ticks = transition.counter.ticks,
                frames = transition.counter.frames,
                "run expired"
            );
            return TickOutcome::Expired(transition);
        }

        if self.counter.ticks % 2 == 0 {
            self.counter.frames += 1;
            return TickOutcome::Choked;
        }

        let left = self.left.update(self.random.as_mut());
        let right = self.right.update(self.random.as_mut());

        for (side, update) in [(Side::Left, left), (Side::Right, right)] {
            if update.is_depleted() {
                metrics::record_depletion(side);
                self.log.log(Event::Depleted { side });
            }
        }
        self.log.log(Event::Tick {
            left: left.stimulus(),
            right: right.stimulus(),
        });

        TickOutcome::Updated { left, right }
    }

    /// Records the subject's pick.
    ///
    /// Only accepted in the `Choice` phase; returns `false` otherwise. A
    /// later pick in the same choice phase replaces the earlier one.
    pub fn select(&mut self, choice: Choice) -> bool {
        if self.phase != Phase::Choice {
            debug!(%choice, phase = %self.phase, "selection ignored outside choice phase");
            return false;
        }
        self.selection = Some(choice);
        self.log.log(Event::Select { value: choice });
        true
    }

    /// Empties the event log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the counters of the current run.
    #[must_use]
    pub const fn counter(&self) -> TickCounter {
        self.counter
    }

    /// Returns the id of the current (or most recent) run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run
    }

    /// Returns `true` while a timer is armed.
    #[must_use]
    pub const fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Returns the pick made in the current choice phase.
    #[must_use]
    pub const fn selection(&self) -> Option<Choice> {
        self.selection
    }

    /// Returns the configuration the engine was built with.
    #[must_use]
    pub const fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Returns the event log.
    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// Returns the left grid controller.
    #[must_use]
    pub const fn left(&self) -> &GridController {
        &self.left
    }

    /// Returns the right grid controller.
    #[must_use]
    pub const fn right(&self) -> &GridController {
        &self.right
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn start_run(&mut self) -> Transition {
        self.cancel_timer();
        self.run = self.run.next();
        self.left.clear();
        self.right.clear();
        self.counter.reset();
        self.selection = None;
        self.phase = Phase::Running;

        let handle = self.clock.set_interval(self.config.tick_interval(), self.run);
        self.timer = Some(handle);
        metrics::set_phase(Phase::Running);
        debug!(run = %self.run, timer = handle.get(), "timer armed");

        Transition {
            from: Phase::Stopped,
            to: Phase::Running,
            run: self.run,
            counter: self.counter,
            selection: None,
            reason: TransitionReason::Advance,
        }
    }

    fn stop_run(&mut self, reason: TransitionReason) -> Transition {
        self.cancel_timer();
        // The pick is made from memory.
        self.left.clear();
        self.right.clear();
        let counter = self.counter;
        self.counter.reset();
        self.phase = Phase::Choice;
        metrics::set_phase(Phase::Choice);

        Transition {
            from: Phase::Running,
            to: Phase::Choice,
            run: self.run,
            counter,
            selection: None,
            reason,
        }
    }

    fn finish_trial(&mut self) -> Transition {
        self.left.clear();
        self.right.clear();
        self.phase = Phase::Stopped;
        metrics::set_phase(Phase::Stopped);
        metrics::record_trial();

        Transition {
            from: Phase::Choice,
            to: Phase::Stopped,
            run: self.run,
            counter: self.counter,
            selection: self.selection.take(),
            reason: TransitionReason::Advance,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.clock.cancel(handle);
            debug!(timer = handle.get(), "timer cancelled");
        }
    }
}

impl Drop for TrialEngine {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl std::fmt::Debug for TrialEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialEngine")
            .field("phase", &self.phase)
            .field("run", &self.run)
            .field("counter", &self.counter)
            .field("timer", &self.timer)
            .field("selection", &self.selection)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
