//! Trial core
//!
//! Stimulus placement on two grids and the phase state machine driving a
//! trial. Everything in here is synchronous; timers, randomness, rendering
//! and log transport are injected.

pub mod allocator;
pub mod engine;
pub mod grid;
pub mod state;
pub mod stimulus;

pub use allocator::{Allocation, GridCoordinate, PositionAllocator};
pub use engine::{
    Choice, EngineParts, TickOutcome, Transition, TransitionReason, TrialEngine,
};
pub use grid::{GridController, GridUpdate, Side, Stimulus};
pub use state::{Phase, RunId, TickCounter};
pub use stimulus::{Direction, StimulusGenerator};
