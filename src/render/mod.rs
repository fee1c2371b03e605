//! Grid rendering
//!
//! The engine only ever asks a renderer to place one arrow or to wipe the
//! grid. How the grid is actually shown is up to the implementation.

pub mod text;

use std::sync::{Arc, Mutex, PoisonError};

use crate::trial::{Direction, GridCoordinate};

pub use text::TextGrid;

/// Display capability for one grid.
pub trait RenderGrid: Send {
    /// Draws one arrow in a cell.
    fn place(&mut self, coordinate: GridCoordinate, direction: Direction);

    /// Removes every arrow from the grid.
    fn clear(&mut self);
}

/// Renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGrid;

impl RenderGrid for NullGrid {
    fn place(&mut self, _coordinate: GridCoordinate, _direction: Direction) {}

    fn clear(&mut self) {}
}

#[derive(Debug, Default)]
struct Recording {
    placed: Vec<(GridCoordinate, Direction)>,
    clears: usize,
}

/// Renderer that records calls; clones share the recording.
#[derive(Debug, Default, Clone)]
pub struct RecordingGrid {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingGrid {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the arrows placed since the last clear, in order.
    #[must_use]
    pub fn placed(&self) -> Vec<(GridCoordinate, Direction)> {
        self.lock().placed.clone()
    }

    /// Returns how many times the grid was cleared.
    #[must_use]
    pub fn clears(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RenderGrid for RecordingGrid {
    fn place(&mut self, coordinate: GridCoordinate, direction: Direction) {
        self.lock().placed.push((coordinate, direction));
    }

    fn clear(&mut self) {
        let mut recording = self.lock();
        recording.placed.clear();
        recording.clears += 1;
    }
}
