//! Trial state representation
//!
//! The phase enum, the tick/frame counters of a run, and the run id used to
//! recognise stale timer ticks.

use serde::Serialize;

/// Phase of the trial state machine.
///
/// `Stopped → Running → Choice → Stopped`, advanced by
/// [`TrialEngine::advance`](super::TrialEngine::advance) and, for
/// `Running → Choice`, by duration expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Idle; waiting for the subject to start a run.
    #[default]
    Stopped,
    /// Stimuli are being placed on every update tick.
    Running,
    /// The run is over and the subject picks a grid.
    Choice,
}

impl Phase {
    /// Returns the phase reached by one external advance trigger.
    #[must_use]
    pub const fn successor(self) -> Self {
        match self {
            Self::Stopped => Self::Running,
            Self::Running => Self::Choice,
            Self::Choice => Self::Stopped,
        }
    }

    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Choice => "choice",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation number of a running phase.
///
/// Every `Stopped → Running` transition issues a fresh id; timer ticks carry
/// the id they were armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct RunId(u64);

impl RunId {
    /// Wraps a raw run number.
    #[must_use]
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timer ticks and duration frames elapsed in the current run.
///
/// `frames` advances on every even tick, so it runs at half the tick rate.
/// The two counters are never merged: the update rate and the trial length
/// both depend on keeping them separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TickCounter {
    /// Timer firings handled in this run.
    pub ticks: u64,
    /// Duration-clock increments in this run.
    pub frames: u32,
}

impl TickCounter {
    /// Resets both counters to zero.
    pub const fn reset(&mut self) {
        self.ticks = 0;
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_cycles_with_period_three() {
        let mut phase = Phase::Stopped;
        let seen: Vec<Phase> = (0..6)
            .map(|_| {
                phase = phase.successor();
                phase
            })
            .collect();
        assert_eq!(
            seen,
            [
                Phase::Running,
                Phase::Choice,
                Phase::Stopped,
                Phase::Running,
                Phase::Choice,
                Phase::Stopped,
            ]
        );
    }

    #[test]
    fn default_phase_is_stopped() {
        assert_eq!(Phase::default(), Phase::Stopped);
    }

    #[test]
    fn phase_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Choice).unwrap(), "\"choice\"");
        assert_eq!(Phase::Running.to_string(), "running");
    }

    #[test]
    fn run_ids_increase() {
        let first = RunId::default();
        assert!(first.next() > first);
        assert_eq!(first.next(), RunId::new(1));
    }

    #[test]
    fn counter_reset_zeroes_both_fields() {
        let mut counter = TickCounter {
            ticks: 9,
            frames: 4,
        };
        counter.reset();
        assert_eq!(counter, TickCounter::default());
    }
}
