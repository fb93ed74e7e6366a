//! Square value windows cut around a located cell.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::geometry::LocatedCell;
use crate::grid::Grid;
use crate::types::{CellIndex, SubPixelOffset};

/// A `(2 * radius + 1)²` block of cell values in canonical orientation:
/// row 0 is the geographic top, whatever the source grid's storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WindowRepr")]
pub struct Window {
    data: Vec<f64>,
    radius: usize,
}

/// Unchecked wire form of [`Window`].
#[derive(Deserialize)]
struct WindowRepr {
    data: Vec<f64>,
    radius: usize,
}

impl TryFrom<WindowRepr> for Window {
    type Error = SamplerError;

    fn try_from(repr: WindowRepr) -> Result<Self> {
        Window::new(repr.data, repr.radius)
    }
}

impl Window {
    /// Wrap top-first row-major values; `data` must hold `(2 * radius + 1)²` values.
    pub fn new(data: Vec<f64>, radius: usize) -> Result<Self> {
        let side = radius.checked_mul(2).and_then(|d| d.checked_add(1));
        match side.and_then(|side| side.checked_mul(side).map(|len| (side, len))) {
            Some((_, len)) if len == data.len() => Ok(Self { data, radius }),
            Some((side, _)) => Err(SamplerError::DimensionMismatch {
                expected: (side, side),
                actual: (1, data.len()),
            }),
            None => Err(SamplerError::invalid_grid(format!("window radius {} is too large", radius))),
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Side length in cells.
    pub fn side(&self) -> usize {
        2 * self.radius + 1
    }

    /// Top-first row-major values.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Value at canonical (row, col), or None outside the window.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let side = self.side();
        if row >= side || col >= side {
            return None;
        }
        Some(self.data[row * side + col])
    }

    /// Value of the located cell.
    pub fn center(&self) -> f64 {
        self.data[self.radius * self.side() + self.radius]
    }

    /// Iterate canonical rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.side())
    }

    /// Arithmetic mean of every cell.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

/// A window together with where it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub window: Window,
    pub offset: SubPixelOffset,
    pub index: CellIndex,
}

/// Cut the window of `radius` around `index`, failing if it leaves the grid.
pub fn extract_window(grid: &Grid, index: CellIndex, radius: usize) -> Result<Window> {
    let located = LocatedCell {
        col: index.col as i64,
        row: index.row as i64,
        offset: SubPixelOffset::default(),
    };
    let index = grid.geometry().bounds_check(&located, radius)?;
    Ok(read_window(grid, index, radius))
}

/// Cut a window whose bounds have already been checked.
///
/// Rows are reversed for y-at-bottom grids so the result is top-first.
pub(crate) fn read_window(grid: &Grid, index: CellIndex, radius: usize) -> Window {
    let side = 2 * radius + 1;
    let cols = grid.cols();
    let first_row = index.row - radius;
    let first_col = index.col - radius;

    let data = grid.data();
    let mut values = Vec::with_capacity(side * side);
    let mut push_row = |row: usize| {
        let start = row * cols + first_col;
        values.extend_from_slice(&data[start..start + side]);
    };

    if grid.geometry().y_at_top {
        (first_row..first_row + side).for_each(&mut push_row);
    } else {
        (first_row..first_row + side).rev().for_each(&mut push_row);
    }

    Window {
        data: values,
        radius,
    }
}
