//! Async session driver
//!
//! A [`Session`] owns one [`TrialEngine`] and feeds it from a single mpsc
//! queue. Timer ticks, subject input and shutdown requests all become
//! [`SessionEvent`]s on that queue, so the engine only ever sees one call at
//! a time. The session also applies input gating: the next trial cannot
//! start before a grid was picked.

pub mod display;
pub mod input;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::clock::TokioClock;
use crate::config::TrialConfig;
use crate::error::{ConfigError, SessionError};
use crate::observability::LogSink;
use crate::random::RandomSource;
use crate::render::RenderGrid;
use crate::trial::{Choice, EngineParts, Phase, RunId, TickOutcome, TrialEngine};

pub use display::{Display, NullDisplay, TerminalDisplay};
pub use input::{Input, parse_line, spawn_reader, spawn_stdin_reader};

// ============================================================================
// Queue
// ============================================================================

/// Everything the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A timer fired for the given run.
    Tick(RunId),
    /// The subject acted.
    Input(Input),
    /// Stop the session.
    Shutdown,
}

/// Cloneable sender side of a session queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Queues a subject input.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QueueClosed` once the session has ended.
    pub fn send(&self, input: Input) -> Result<(), SessionError> {
        self.post(SessionEvent::Input(input))
    }

    /// Queues the advance trigger.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QueueClosed` once the session has ended.
    pub fn advance(&self) -> Result<(), SessionError> {
        self.send(Input::Advance)
    }

    /// Queues a grid pick.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QueueClosed` once the session has ended.
    pub fn select(&self, choice: Choice) -> Result<(), SessionError> {
        self.send(Input::Select(choice))
    }

    /// Asks the session to stop.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::QueueClosed` once the session has ended.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.post(SessionEvent::Shutdown)
    }

    fn post(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.tx.send(event).map_err(|_| SessionError::QueueClosed)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Outcome of a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Trials that went all the way back to `Stopped`.
    pub completed_trials: usize,
    /// Pick of each completed trial, in order.
    pub selections: Vec<Choice>,
    /// Event log entries recorded.
    pub entries: usize,
}

/// Collaborators of a session. The clock is supplied by the session.
pub struct SessionParts {
    /// Renderer of the left grid.
    pub left_renderer: Box<dyn RenderGrid>,
    /// Renderer of the right grid.
    pub right_renderer: Box<dyn RenderGrid>,
    /// Uniform random source.
    pub random: Box<dyn RandomSource>,
    /// Transport for log entries.
    pub sink: Box<dyn LogSink>,
    /// Output surface.
    pub display: Box<dyn Display>,
}

/// Single-consumer driver of a [`TrialEngine`].
pub struct Session {
    engine: TrialEngine,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    handle: SessionHandle,
    display: Box<dyn Display>,
    summary: SessionSummary,
}

impl Session {
    /// Builds the engine with a tokio-backed clock posting into this
    /// session's queue.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `config` is invalid.
    pub fn new(config: TrialConfig, parts: SessionParts) -> Result<Self, ConfigError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let tick_tx = tx.clone();
        let clock = TokioClock::new(move |run| tick_tx.send(SessionEvent::Tick(run)).is_ok());

        let engine = TrialEngine::new(
            config,
            EngineParts {
                left_renderer: parts.left_renderer,
                right_renderer: parts.right_renderer,
                clock: Box::new(clock),
                random: parts.random,
                sink: parts.sink,
            },
        )?;

        Ok(Self {
            engine,
            rx,
            handle: SessionHandle { tx },
            display: parts.display,
            summary: SessionSummary::default(),
        })
    }

    /// Returns a handle for feeding input into the session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &TrialEngine {
        &self.engine
    }

    /// Processes queued events until shutdown or quit.
    pub async fn run(mut self) -> SessionSummary {
        info!("session started");
        self.display.refresh(&self.engine);

        while let Some(event) = self.rx.recv().await {
            let keep_going = match event {
                SessionEvent::Tick(run) => {
                    self.on_tick(run);
                    true
                }
                SessionEvent::Input(input) => self.on_input(input),
                SessionEvent::Shutdown => false,
            };
            if !keep_going {
                break;
            }
        }

        self.summary.entries = self.engine.log().len();
        info!(
            completed_trials = self.summary.completed_trials,
            entries = self.summary.entries,
            "session ended"
        );
        self.summary
    }

    fn on_tick(&mut self, run: RunId) {
        match self.engine.tick(run) {
            TickOutcome::Stale => {}
            TickOutcome::Choked | TickOutcome::Updated { .. } | TickOutcome::Expired(_) => {
                self.display.refresh(&self.engine);
            }
        }
    }

    /// Returns `false` when the session should end.
    fn on_input(&mut self, input: Input) -> bool {
        match input {
            Input::Advance => {
                if self.engine.phase() == Phase::Choice && self.engine.selection().is_none() {
                    debug!("advance ignored until a grid is picked");
                    return true;
                }
                let transition = self.engine.advance();
                if transition.to == Phase::Stopped {
                    self.summary.completed_trials += 1;
                    self.summary.selections.extend(transition.selection);
                }
                self.display.refresh(&self.engine);
            }
            Input::Select(choice) => {
                if self.engine.select(choice) {
                    self.display.refresh(&self.engine);
                }
            }
            Input::Quit => return false,
        }
        true
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::observability::NullSink;
    use crate::random::SeededRandom;
    use crate::render::NullGrid;

    fn session() -> Session {
        Session::new(
            TrialConfig::default(),
            SessionParts {
                left_renderer: Box::new(NullGrid),
                right_renderer: Box::new(NullGrid),
                random: Box::new(SeededRandom::new(3)),
                sink: Box::new(NullSink),
                display: Box::new(NullDisplay),
            },
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn run_expires_and_completes_one_trial() {
        let session = session();
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        handle.advance().unwrap();
        // 25 firings at 500 ms end the run.
        tokio::time::sleep(Duration::from_millis(25 * 500 + 100)).await;
        handle.select(Choice::A).unwrap();
        handle.advance().unwrap();
        handle.shutdown().unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.completed_trials, 1);
        assert_eq!(summary.selections, [Choice::A]);
        // init, click, 12 ticks, select, click
        assert_eq!(summary.entries, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn advance_in_choice_waits_for_selection() {
        let session = session();
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        handle.advance().unwrap();
        handle.advance().unwrap();
        handle.advance().unwrap();
        handle.select(Choice::B).unwrap();
        handle.advance().unwrap();
        handle.shutdown().unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.completed_trials, 1);
        assert_eq!(summary.selections, [Choice::B]);
    }

    #[tokio::test(start_paused = true)]
    async fn select_outside_choice_is_ignored() {
        let session = session();
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        handle.select(Choice::A).unwrap();
        handle.send(Input::Quit).unwrap();

        let summary = task.await.unwrap();
        assert_eq!(summary.completed_trials, 0);
        assert_eq!(summary.entries, 1, "only init");
    }

    #[tokio::test(start_paused = true)]
    async fn manual_stop_leaves_no_live_ticks() {
        let session = session();
        let handle = session.handle();
        let task = tokio::spawn(session.run());

        handle.advance().unwrap();
        tokio::time::sleep(Duration::from_millis(1_600)).await;
        handle.advance().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.shutdown().unwrap();

        let summary = task.await.unwrap();
        // init, click, ticks 1 and 3, click
        assert_eq!(summary.entries, 5);
    }

    #[tokio::test]
    async fn handle_fails_after_session_ends() {
        let session = session();
        let handle = session.handle();
        handle.shutdown().unwrap();
        let _ = session.run().await;
        assert!(matches!(handle.advance(), Err(SessionError::QueueClosed)));
    }

    #[tokio::test]
    async fn reader_maps_lines_and_shuts_down_at_eof() {
        let session = session();
        let handle = session.handle();
        let reader = spawn_reader(&b"\n\n\nf\n\n"[..], handle);
        let summary = session.run().await;
        reader.await.unwrap();

        assert_eq!(summary.completed_trials, 1);
        assert_eq!(summary.selections, [Choice::A]);
    }
}
