//! Biased direction draws.

use serde::Serialize;

use crate::random::RandomSource;

/// Direction of one arrow stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Arrow pointing up.
    Up,
    /// Arrow pointing down.
    Down,
}

impl Direction {
    /// Returns the lowercase direction name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Draws directions from a Bernoulli distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct StimulusGenerator;

impl StimulusGenerator {
    /// Draws one direction.
    ///
    /// Consumes exactly one value `u` from `random` and returns `Down` when
    /// `u > probability`, `Up` otherwise. A higher probability therefore
    /// means more upward arrows; `1.0` always yields `Up`.
    pub fn draw(probability: f64, random: &mut dyn RandomSource) -> Direction {
        if random.uniform() > probability {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}
