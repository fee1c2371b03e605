//! Unique cell allocation for one grid.
//!
//! Cells are drawn uniformly and redrawn while occupied, so every free cell
//! stays equally likely no matter how full the grid is. There is no retry
//! cap: the loop only runs while at least one free cell exists, so it ends
//! with probability one.

use std::collections::HashSet;

use serde::Serialize;

use crate::random::RandomSource;

/// A cell of an N×N grid, both axes in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridCoordinate {
    /// Zero-based column.
    pub column: usize,
    /// Zero-based row.
    pub row: usize,
}

impl GridCoordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Draws a uniform coordinate on an `size`×`size` grid.
    ///
    /// Consumes two values from `random`: column first, then row.
    pub fn random(size: usize, random: &mut dyn RandomSource) -> Self {
        let column = scale(random.uniform(), size);
        let row = scale(random.uniform(), size);
        Self { column, row }
    }
}

impl std::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// `floor(u * size)`, clamped so a source returning exactly `1.0` still lands
/// on the grid.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale(u: f64, size: usize) -> usize {
    let cell = (u * size as f64).floor().max(0.0) as usize;
    cell.min(size.saturating_sub(1))
}

/// Outcome of an allocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// A previously free cell, now occupied.
    Placed(GridCoordinate),
    /// Every cell is occupied.
    Depleted,
}

/// Tracks occupied cells of one grid and hands out free ones.
#[derive(Debug, Clone)]
pub struct PositionAllocator {
    size: usize,
    occupied: HashSet<GridCoordinate>,
}

impl PositionAllocator {
    /// Creates an empty allocator for an `size`×`size` grid.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            occupied: HashSet::new(),
        }
    }

    /// Returns the grid edge length.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of cells.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.size.saturating_mul(self.size)
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.occupied.len()
    }

    /// Returns `true` if `coordinate` is occupied.
    #[must_use]
    pub fn is_occupied(&self, coordinate: GridCoordinate) -> bool {
        self.occupied.contains(&coordinate)
    }

    /// Returns `true` while at least one cell is free.
    #[must_use]
    pub fn has_space(&self) -> bool {
        self.occupied.len() < self.capacity()
    }

    /// Frees every cell.
    pub fn clear(&mut self) {
        self.occupied.clear();
    }

    /// Allocates a free cell using `generate` as the coordinate source.
    ///
    /// When the grid is full, returns [`Allocation::Depleted`] without
    /// calling `generate` and without touching the occupancy set.
    pub fn allocate(&mut self, mut generate: impl FnMut() -> GridCoordinate) -> Allocation {
        if !self.has_space() {
            return Allocation::Depleted;
        }

        let mut coordinate = generate();
        while self.occupied.contains(&coordinate) && self.has_space() {
            coordinate = generate();
        }
        self.occupied.insert(coordinate);
        Allocation::Placed(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn fills_grid_without_duplicates() {
        let mut allocator = PositionAllocator::new(5);
        let mut rng = SeededRandom::new(9);
        let mut seen = HashSet::new();

        for _ in 0..25 {
            match allocator.allocate(|| GridCoordinate::random(5, &mut rng)) {
                Allocation::Placed(c) => assert!(seen.insert(c), "duplicate {c}"),
                Allocation::Depleted => panic!("depleted early"),
            }
        }
        assert!(!allocator.has_space());
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn huge_grid_allocates_lazily() {
        let mut allocator = PositionAllocator::new(1 << 33);
        assert_eq!(allocator.capacity(), usize::MAX);
        assert_eq!(
            allocator.allocate(|| GridCoordinate::new(3, 4)),
            Allocation::Placed(GridCoordinate::new(3, 4))
        );
        assert_eq!(allocator.occupied(), 1);
    }

    #[test]
    fn depleted_grid_does_not_consume_generator_or_mutate() {
        let mut allocator = PositionAllocator::new(1);
        assert_eq!(
            allocator.allocate(|| GridCoordinate::new(0, 0)),
            Allocation::Placed(GridCoordinate::new(0, 0))
        );

        let mut calls = 0;
        let result = allocator.allocate(|| {
            calls += 1;
            GridCoordinate::new(0, 0)
        });
        assert_eq!(result, Allocation::Depleted);
        assert_eq!(calls, 0);
        assert_eq!(allocator.occupied(), 1);
    }

    #[test]
    fn redraws_occupied_cells() {
        let mut allocator = PositionAllocator::new(2);
        allocator.allocate(|| GridCoordinate::new(0, 0));

        let mut draws = vec![
            GridCoordinate::new(1, 1),
            GridCoordinate::new(0, 0),
            GridCoordinate::new(0, 0),
        ];
        let result = allocator.allocate(|| draws.pop().unwrap());
        assert_eq!(result, Allocation::Placed(GridCoordinate::new(1, 1)));
        assert!(draws.is_empty());
    }

    #[test]
    fn clear_restores_full_capacity() {
        let mut allocator = PositionAllocator::new(1);
        allocator.allocate(|| GridCoordinate::new(0, 0));
        assert!(!allocator.has_space());

        allocator.clear();
        assert!(allocator.has_space());
        assert_eq!(allocator.occupied(), 0);
        assert!(!allocator.is_occupied(GridCoordinate::new(0, 0)));
    }

    #[test]
    fn random_coordinate_uses_floor_per_axis() {
        let mut rng = ScriptedRandom::new(vec![0.99, 0.2]);
        assert_eq!(GridCoordinate::random(5, &mut rng), GridCoordinate::new(4, 1));
        assert_eq!(rng.drawn(), 2);
    }

    #[test]
    fn random_coordinate_clamps_unit_value() {
        let mut rng = ScriptedRandom::new(vec![1.0, 0.0]);
        assert_eq!(GridCoordinate::random(5, &mut rng), GridCoordinate::new(4, 0));
    }

    #[test]
    fn coordinate_serializes_as_object() {
        let json = serde_json::to_value(GridCoordinate::new(2, 3)).unwrap();
        assert_eq!(json, serde_json::json!({"column": 2, "row": 3}));
    }

    proptest! {
        #[test]
        fn never_returns_an_occupied_cell(size in 1usize..6, seed in any::<u64>(), extra in 0usize..4) {
            let mut allocator = PositionAllocator::new(size);
            let mut rng = SeededRandom::new(seed);
            let mut seen = HashSet::new();

            for _ in 0..size * size {
                let result = allocator.allocate(|| GridCoordinate::random(size, &mut rng));
                let Allocation::Placed(c) = result else {
                    return Err(TestCaseError::fail("depleted before capacity"));
                };
                prop_assert!(c.column < size && c.row < size);
                prop_assert!(seen.insert(c));
            }

            for _ in 0..extra {
                prop_assert_eq!(
                    allocator.allocate(|| GridCoordinate::random(size, &mut rng)),
                    Allocation::Depleted
                );
            }
            prop_assert_eq!(allocator.occupied(), size * size);
        }
    }
}
