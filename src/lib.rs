//! `arrowgrid` - timed two-grid arrow discrimination trials
//!
//! Two N×N grids fill with up and down arrows at a fixed rate, each grid
//! biased by its own probability. When the run ends the subject picks the
//! grid they believe was biased. The trial core in [`trial`] is synchronous
//! and takes its timer, randomness, rendering and log transport as injected
//! capabilities; [`session`] drives it from a tokio event queue.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod observability;
pub mod random;
pub mod render;
pub mod session;
pub mod trial;
