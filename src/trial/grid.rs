//! Per-side grid controller.
//!
//! Couples one [`PositionAllocator`] with the side's bias probability and
//! the renderer that displays the side's grid.

use serde::Serialize;
use tracing::trace;

use crate::observability::metrics;
use crate::random::RandomSource;
use crate::render::RenderGrid;

use super::allocator::{Allocation, GridCoordinate, PositionAllocator};
use super::stimulus::{Direction, StimulusGenerator};

/// Which of the two grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left grid, answer option A.
    Left,
    /// Right grid, answer option B.
    Right,
}

impl Side {
    /// Returns the lowercase side name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One arrow placed on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stimulus {
    /// Arrow direction.
    pub direction: Direction,
    /// Cell the arrow occupies.
    pub coordinate: GridCoordinate,
}

/// Result of one grid update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridUpdate {
    /// A stimulus was placed and rendered.
    Placed(Stimulus),
    /// The grid is full; nothing was rendered.
    Depleted,
}

impl GridUpdate {
    /// Returns the placed stimulus, if any.
    #[must_use]
    pub const fn stimulus(self) -> Option<Stimulus> {
        match self {
            Self::Placed(s) => Some(s),
            Self::Depleted => None,
        }
    }

    /// Returns `true` for [`GridUpdate::Depleted`].
    #[must_use]
    pub const fn is_depleted(self) -> bool {
        matches!(self, Self::Depleted)
    }
}

/// Drives one grid: direction draw, cell allocation, rendering.
pub struct GridController {
    side: Side,
    probability: f64,
    allocator: PositionAllocator,
    renderer: Box<dyn RenderGrid>,
}

impl GridController {
    /// Creates a controller for `side` on an `size`×`size` grid.
    #[must_use]
    pub fn new(side: Side, size: usize, probability: f64, renderer: Box<dyn RenderGrid>) -> Self {
        Self {
            side,
            probability,
            allocator: PositionAllocator::new(size),
            renderer,
        }
    }

    /// Returns the controlled side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Returns the allocator backing this grid.
    #[must_use]
    pub const fn allocator(&self) -> &PositionAllocator {
        &self.allocator
    }

    /// Places one stimulus, or reports depletion.
    ///
    /// The direction is drawn before the allocation is attempted, so a full
    /// grid still consumes one random value per update.
    pub fn update(&mut self, random: &mut dyn RandomSource) -> GridUpdate {
        let direction = StimulusGenerator::draw(self.probability, random);

        let size = self.allocator.size();
        let coordinate = match self
            .allocator
            .allocate(|| GridCoordinate::random(size, random))
        {
            Allocation::Placed(coordinate) => coordinate,
            Allocation::Depleted => {
                trace!(side = %self.side, "grid depleted");
                return GridUpdate::Depleted;
            }
        };

        self.renderer.place(coordinate, direction);
        metrics::record_stimulus(self.side, direction);
        trace!(side = %self.side, %coordinate, direction = direction.as_str(), "stimulus placed");

        GridUpdate::Placed(Stimulus {
            direction,
            coordinate,
        })
    }

    /// Frees every cell and wipes the rendered grid.
    pub fn clear(&mut self) {
        self.allocator.clear();
        self.renderer.clear();
    }
}

impl std::fmt::Debug for GridController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("side", &self.side)
            .field("probability", &self.probability)
            .field("allocator", &self.allocator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::render::RecordingGrid;

    fn controller(size: usize, probability: f64) -> (GridController, RecordingGrid) {
        let recorder = RecordingGrid::new();
        let grid = GridController::new(Side::Left, size, probability, Box::new(recorder.clone()));
        (grid, recorder)
    }

    #[test]
    fn update_places_and_renders() {
        let (mut grid, recorder) = controller(5, 0.45);
        // direction draw 0.9 > 0.45 -> down; column 0.5 -> 2; row 0.1 -> 0
        let mut rng = ScriptedRandom::new(vec![0.9, 0.5, 0.1]);

        let update = grid.update(&mut rng);
        let expected = Stimulus {
            direction: Direction::Down,
            coordinate: GridCoordinate::new(2, 0),
        };
        assert_eq!(update, GridUpdate::Placed(expected));
        assert_eq!(recorder.placed(), vec![(GridCoordinate::new(2, 0), Direction::Down)]);
    }

    #[test]
    fn single_cell_grid_depletes_after_first_update() {
        let (mut grid, recorder) = controller(1, 0.5);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.0, 0.0]);

        assert!(matches!(grid.update(&mut rng), GridUpdate::Placed(_)));
        for _ in 0..5 {
            assert_eq!(grid.update(&mut rng), GridUpdate::Depleted);
        }
        assert_eq!(recorder.placed().len(), 1);
    }

    #[test]
    fn depleted_update_still_draws_direction() {
        let (mut grid, _recorder) = controller(1, 0.5);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.0, 0.0]);

        grid.update(&mut rng);
        assert_eq!(rng.drawn(), 3);
        grid.update(&mut rng);
        assert_eq!(rng.drawn(), 4, "one direction draw, no coordinate draws");
    }

    #[test]
    fn clear_resets_allocator_and_renderer() {
        let (mut grid, recorder) = controller(1, 0.5);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.0, 0.0]);
        grid.update(&mut rng);

        grid.clear();
        assert_eq!(grid.allocator().occupied(), 0);
        assert_eq!(recorder.clears(), 1);
        assert!(recorder.placed().is_empty());
        assert!(matches!(grid.update(&mut rng), GridUpdate::Placed(_)));
    }

    #[test]
    fn stimulus_serializes_flat_fields() {
        let stimulus = Stimulus {
            direction: Direction::Up,
            coordinate: GridCoordinate::new(1, 4),
        };
        let json = serde_json::to_value(stimulus).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"direction": "up", "coordinate": {"column": 1, "row": 4}})
        );
    }
}
