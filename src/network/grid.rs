//! Row-major grid storage shared by node, value, policy and Q tables.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, types::Position};

/// A fixed-shape, row-major grid of cells.
///
/// Every per-cell table in the crate is a `Grid`, so two tables built from
/// the same shape can always be indexed by the same positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f` at every position, row by row.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(Position) -> T) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Position::new(row as i32, col as i32)));
            }
        }
        Self { rows, cols, cells }
    }

    /// Build a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMap`] when there are no rows or the rows are
    /// empty, and [`Error::RaggedMap`] when the rows differ in width.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(Error::EmptyMap);
        }

        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * expected);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != expected {
                return Err(Error::RaggedMap {
                    row,
                    expected,
                    got: values.len(),
                });
            }
            cells.extend(values);
        }

        Ok(Self {
            rows: row_count,
            cols: expected,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether `pos` lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    fn offset(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        self.offset(pos).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        self.offset(pos).map(move |i| &mut self.cells[i])
    }

    /// Like [`Grid::get`], but reports a position outside the grid as an error.
    pub fn try_get(&self, pos: Position) -> Result<&T> {
        let (rows, cols) = self.shape();
        self.get(pos).ok_or(Error::OutOfRange {
            position: pos,
            rows,
            cols,
        })
    }

    /// Like [`Grid::get_mut`], but reports a position outside the grid as an error.
    pub fn try_get_mut(&mut self, pos: Position) -> Result<&mut T> {
        let (rows, cols) = self.shape();
        self.get_mut(pos).ok_or(Error::OutOfRange {
            position: pos,
            rows,
            cols,
        })
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let cols = self.cols;
        (0..self.rows * cols).map(move |i| Position::new((i / cols) as i32, (i % cols) as i32))
    }

    /// Cells paired with their positions, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        self.positions().zip(self.cells.iter())
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.shape() == other.shape()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        match self.offset(pos) {
            Some(i) => &self.cells[i],
            None => panic!("position {pos} outside {}x{} grid", self.rows, self.cols),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        let (rows, cols) = self.shape();
        match self.offset(pos) {
            Some(i) => &mut self.cells[i],
            None => panic!("position {pos} outside {rows}x{cols} grid"),
        }
    }
}
