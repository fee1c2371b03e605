//! Terminal grid renderer.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

use crate::trial::{Direction, GridCoordinate};

use super::RenderGrid;

const EMPTY: char = '·';

/// Character-cell renderer for terminals.
///
/// Clones share the same cell buffer: the engine owns one clone, the
/// display loop keeps another to draw from. Only placed cells are stored.
#[derive(Debug, Clone)]
pub struct TextGrid {
    size: usize,
    cells: Arc<Mutex<HashMap<GridCoordinate, Direction>>>,
}

impl TextGrid {
    /// Creates an empty `size`×`size` grid.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the rows of the grid as strings, top row first.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|column| match cells.get(&GridCoordinate::new(column, row)) {
                        Some(Direction::Up) => '↑',
                        Some(Direction::Down) => '↓',
                        None => EMPTY,
                    })
                    .flat_map(|c| [c, ' '])
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    /// Counts arrows pointing in `direction`.
    #[must_use]
    pub fn count(&self, direction: Direction) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|d| **d == direction).count()
    }
}

impl RenderGrid for TextGrid {
    fn place(&mut self, coordinate: GridCoordinate, direction: Direction) {
        if coordinate.column >= self.size || coordinate.row >= self.size {
            return;
        }
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.insert(coordinate, direction);
    }

    fn clear(&mut self) {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.clear();
    }
}

/// Renders two grids side by side with a gap and optional labels.
#[must_use]
pub fn side_by_side(left: &TextGrid, right: &TextGrid, labels: Option<(&str, &str)>) -> String {
    let left_rows = left.rows();
    let right_rows = right.rows();
    let width = left_rows
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .max(labels.map_or(0, |(l, _)| l.chars().count()));

    let mut out = String::new();
    if let Some((l, r)) = labels {
        let _ = writeln!(out, "{l:<width$}    {r}");
    }
    for (l, r) in left_rows.iter().zip(&right_rows) {
        let _ = writeln!(out, "{l:<width$}    {r}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placed_arrows() {
        let mut grid = TextGrid::new(3);
        grid.place(GridCoordinate::new(0, 0), Direction::Up);
        grid.place(GridCoordinate::new(2, 1), Direction::Down);

        assert_eq!(grid.rows(), vec!["↑ · ·", "· · ↓", "· · ·"]);
        assert_eq!(grid.count(Direction::Up), 1);
        assert_eq!(grid.count(Direction::Down), 1);
    }

    #[test]
    fn clones_share_cells() {
        let grid = TextGrid::new(2);
        let mut writer = grid.clone();
        writer.place(GridCoordinate::new(1, 1), Direction::Up);
        assert_eq!(grid.count(Direction::Up), 1);

        writer.clear();
        assert_eq!(grid.count(Direction::Up), 0);
    }

    #[test]
    fn large_grid_is_created_without_reserving_cells() {
        let mut grid = TextGrid::new(1 << 33);
        grid.place(GridCoordinate::new(1 << 32, 7), Direction::Down);
        assert_eq!(grid.count(Direction::Down), 1);
    }

    #[test]
    fn out_of_range_place_is_ignored() {
        let mut grid = TextGrid::new(2);
        grid.place(GridCoordinate::new(5, 0), Direction::Up);
        assert_eq!(grid.count(Direction::Up), 0);
    }

    #[test]
    fn side_by_side_pairs_rows() {
        let mut left = TextGrid::new(2);
        let right = TextGrid::new(2);
        left.place(GridCoordinate::new(0, 0), Direction::Down);

        let text = side_by_side(&left, &right, Some(("A", "B")));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "↓ ·    · ·");
    }
}
