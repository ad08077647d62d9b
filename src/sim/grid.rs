//! Grid of numbered cells

use serde::{Deserialize, Serialize};

/// A single numbered cell
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub number: i32,
    /// Number satisfies the active criteria
    pub is_target: bool,
    pub absorbed: bool,
    /// Text shown on the cell (number or expression)
    pub display: String,
}

impl Cell {
    /// Target that has not been absorbed yet
    pub fn is_pending_target(&self) -> bool {
        self.is_target && !self.absorbed
    }
}

/// Fixed-size grid, every coordinate holds exactly one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major cells
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        self.contains(x, y).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Cells with their `(x, y)` coordinates, row by row
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i % width, i / width), cell))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn target_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_target).count()
    }

    /// Fraction of cells that are targets (1.0 for an empty grid)
    pub fn target_density(&self) -> f64 {
        if self.cells.is_empty() {
            return 1.0;
        }
        self.target_count() as f64 / self.cells.len() as f64
    }

    pub fn remaining_targets(&self) -> usize {
        self.cells.iter().filter(|c| c.is_pending_target()).count()
    }

    /// Every target has been absorbed
    pub fn is_cleared(&self) -> bool {
        self.remaining_targets() == 0
    }

    /// First pending target, useful for hinting
    pub fn first_pending_target(&self) -> Option<(usize, usize)> {
        self.iter()
            .find(|(_, cell)| cell.is_pending_target())
            .map(|(pos, _)| pos)
    }
}
