//! Trial configuration schema
//!
//! Every field carries a serde default so a partial YAML file (or an empty
//! one) yields a usable configuration. Values are fixed once a
//! [`TrialEngine`](crate::trial::TrialEngine) is constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default grid edge length (cells per row and per column).
pub const DEFAULT_GRID_SIZE: usize = 5;

/// Default trial length in frames.
pub const DEFAULT_DURATION_FRAMES: u32 = 12;

/// Default timer period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;

/// Default bias probability for the left grid.
pub const DEFAULT_LEFT_PROBABILITY: f64 = 0.45;

/// Default bias probability for the right grid.
pub const DEFAULT_RIGHT_PROBABILITY: f64 = 0.60;

/// Configuration of a trial engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialConfig {
    /// Edge length `N` of each N×N grid.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Number of frames a run lasts before the engine forces the choice phase.
    #[serde(default = "default_duration_frames")]
    pub duration_frames: u32,

    /// Period of the tick timer in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Bias probability of the left grid (option A).
    #[serde(default = "default_left_probability")]
    pub left_probability: f64,

    /// Bias probability of the right grid (option B).
    #[serde(default = "default_right_probability")]
    pub right_probability: f64,
}

const fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}

const fn default_duration_frames() -> u32 {
    DEFAULT_DURATION_FRAMES
}

const fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

const fn default_left_probability() -> f64 {
    DEFAULT_LEFT_PROBABILITY
}

const fn default_right_probability() -> f64 {
    DEFAULT_RIGHT_PROBABILITY
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            duration_frames: DEFAULT_DURATION_FRAMES,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            left_probability: DEFAULT_LEFT_PROBABILITY,
            right_probability: DEFAULT_RIGHT_PROBABILITY,
        }
    }
}

impl TrialConfig {
    /// Returns the tick timer period.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Returns the number of cells in one grid.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.grid_size.saturating_mul(self.grid_size)
    }

    /// Returns a copy with every `Some` field of `overrides` applied.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(n) = overrides.grid_size {
            self.grid_size = n;
        }
        if let Some(frames) = overrides.duration_frames {
            self.duration_frames = frames;
        }
        if let Some(interval) = overrides.tick_interval {
            self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(p) = overrides.left_probability {
            self.left_probability = p;
        }
        if let Some(p) = overrides.right_probability {
            self.right_probability = p;
        }
        self
    }
}

/// Per-field overrides, typically collected from command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Replaces `grid_size`.
    pub grid_size: Option<usize>,
    /// Replaces `duration_frames`.
    pub duration_frames: Option<u32>,
    /// Replaces `tick_interval_ms`.
    pub tick_interval: Option<Duration>,
    /// Replaces `left_probability`.
    pub left_probability: Option<f64>,
    /// Replaces `right_probability`.
    pub right_probability: Option<f64>,
}
