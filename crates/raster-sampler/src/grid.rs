//! In-memory raster grid.

use geo_common::{BoundingBox, CrsCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::geometry::GridGeometry;
use crate::types::{CellType, DataType};

/// An immutable single-band raster: cell values plus geometry and metadata.
///
/// Values are held as `f64` in row-major native storage order (row 0 is the
/// top when `geometry.y_at_top`, the bottom otherwise). The original cell
/// type is recorded in `data_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    data: Vec<f64>,
    geometry: GridGeometry,
    crs: CrsCode,
    no_data: Option<f64>,
    data_type: DataType,
}

/// Summary of a grid's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    pub crs: CrsCode,
    pub data_type: DataType,
    pub no_data: Option<f64>,
    pub y_at_top: bool,
    pub bounds: BoundingBox,
    pub origin: (f64, f64),
    pub cell_width: f64,
    pub cell_height: f64,
    pub rows: usize,
    pub cols: usize,
}

fn flat_shape(len: usize, cols: usize) -> (usize, usize) {
    if cols > 0 && len % cols == 0 {
        (len / cols, cols)
    } else {
        (1, len)
    }
}

impl Grid {
    /// Wrap `f64` values stored in native row order.
    pub fn new(data: Vec<f64>, geometry: GridGeometry, crs: CrsCode) -> Result<Self> {
        if data.len() != geometry.len() {
            return Err(SamplerError::DimensionMismatch {
                expected: geometry.shape(),
                actual: flat_shape(data.len(), geometry.cols),
            });
        }

        Ok(Self {
            data,
            geometry,
            crs,
            no_data: None,
            data_type: DataType::Float64,
        })
    }

    /// Build from typed cells in native row order; the data type is taken from `T`.
    pub fn from_cells<T: CellType>(cells: &[T], geometry: GridGeometry, crs: CrsCode) -> Result<Self> {
        let data = cells.iter().map(|&c| c.to_f64()).collect();
        let mut grid = Self::new(data, geometry, crs)?;
        grid.data_type = T::DATA_TYPE;
        Ok(grid)
    }

    /// Create a y-at-top grid covering `bounds`, every cell set to `fill`,
    /// else to `no_data`, else zero.
    pub fn create(
        bounds: &BoundingBox,
        cell_width: f64,
        cell_height: f64,
        crs: CrsCode,
        fill: Option<f64>,
        no_data: Option<f64>,
    ) -> Result<Self> {
        let geometry = GridGeometry::from_bounds(bounds, cell_width, cell_height)?;
        let value = fill.or(no_data).unwrap_or(0.0);
        let grid = Self::new(vec![value; geometry.len()], geometry, crs)?;
        Ok(grid.with_no_data(no_data))
    }

    /// Create a y-at-top grid covering `bounds` from top-first row-major cells.
    pub fn create_with_data<T: CellType>(
        bounds: &BoundingBox,
        cell_width: f64,
        cell_height: f64,
        crs: CrsCode,
        cells: &[T],
        no_data: Option<f64>,
    ) -> Result<Self> {
        let geometry = GridGeometry::from_bounds(bounds, cell_width, cell_height)?;
        Ok(Self::from_cells(cells, geometry, crs)?.with_no_data(no_data))
    }

    /// Set the no-data marker.
    pub fn with_no_data(mut self, no_data: Option<f64>) -> Self {
        self.no_data = no_data;
        self
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Cell values in native row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn rows(&self) -> usize {
        self.geometry.rows
    }

    pub fn cols(&self) -> usize {
        self.geometry.cols
    }

    /// Value at a native (row, col), or None outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.data.get(row * self.cols() + col).copied()
    }

    /// One native storage row.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let cols = self.cols();
        self.data.get(row * cols..(row + 1) * cols)
    }

    /// Whether `value` is the no-data marker (NaN markers match NaN).
    pub fn is_no_data(&self, value: f64) -> bool {
        match self.no_data {
            Some(nd) if nd.is_nan() => value.is_nan(),
            Some(nd) => value == nd,
            None => false,
        }
    }

    /// Metadata summary.
    pub fn info(&self) -> GridInfo {
        GridInfo {
            crs: self.crs,
            data_type: self.data_type,
            no_data: self.no_data,
            y_at_top: self.geometry.y_at_top,
            bounds: self.geometry.bounds(),
            origin: (self.geometry.origin_x, self.geometry.origin_y),
            cell_width: self.geometry.cell_width,
            cell_height: self.geometry.cell_height,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    /// The same raster stored in the opposite row order.
    pub fn flipped(&self) -> Self {
        let data = self
            .data
            .chunks_exact(self.cols())
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            data,
            geometry: self.geometry.flipped(),
            crs: self.crs,
            no_data: self.no_data,
            data_type: self.data_type,
        }
    }

    /// A new `f64` grid over the same geometry and CRS holding `data`
    /// (native row order).
    pub fn from_processed(&self, data: Vec<f64>) -> Result<Self> {
        Self::new(data, self.geometry, self.crs)
    }

    /// Apply a whole-array processor and wrap its output as a new grid.
    ///
    /// The processor receives native row-major values plus `(rows, cols)` and
    /// must return exactly `rows * cols` values in the same order.
    pub fn mutate<F>(&self, processor: F) -> Result<Self>
    where
        F: FnOnce(&[f64], usize, usize) -> Vec<f64>,
    {
        let processed = processor(&self.data, self.rows(), self.cols());
        Ok(self.from_processed(processed)?.with_no_data(self.no_data))
    }
}
