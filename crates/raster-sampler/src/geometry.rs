//! Affine grid geometry: coordinate <-> cell index conversion.
//!
//! Cells are addressed by their centres: cell `(c, r)` is centred at
//! `origin_x + (c + 0.5) * cell_width` along x. Along y the row index grows
//! downward from `origin_y` when `y_at_top`, and upward from `origin_y`
//! otherwise. Sub-pixel offsets are always reported in canonical (top-first)
//! window order so that downstream interpolation never needs to know the
//! storage orientation.

use geo_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::types::{CellIndex, SubPixelOffset};

/// Geometry of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// X coordinate of the left edge.
    pub origin_x: f64,
    /// Y coordinate of the top edge when `y_at_top`, of the bottom edge otherwise.
    pub origin_y: f64,
    /// Cell size along x (positive).
    pub cell_width: f64,
    /// Cell size along y (positive).
    pub cell_height: f64,
    /// Whether storage row 0 is the geographic top.
    pub y_at_top: bool,
    pub cols: usize,
    pub rows: usize,
}

/// A point's nearest cell before any bounds check.
///
/// Indices may be negative or past the grid edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatedCell {
    pub col: i64,
    pub row: i64,
    pub offset: SubPixelOffset,
}

impl GridGeometry {
    /// Create a geometry, validating cell sizes and shape.
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        cell_width: f64,
        cell_height: f64,
        y_at_top: bool,
        cols: usize,
        rows: usize,
    ) -> Result<Self> {
        if !(cell_width.is_finite() && cell_width > 0.0) {
            return Err(SamplerError::invalid_grid(format!(
                "cell width must be positive, got {}",
                cell_width
            )));
        }
        if !(cell_height.is_finite() && cell_height > 0.0) {
            return Err(SamplerError::invalid_grid(format!(
                "cell height must be positive, got {}",
                cell_height
            )));
        }
        if !origin_x.is_finite() || !origin_y.is_finite() {
            return Err(SamplerError::invalid_grid("origin must be finite"));
        }
        if cols == 0 || rows == 0 {
            return Err(SamplerError::invalid_grid(format!(
                "grid shape must be non-empty, got {}x{}",
                cols, rows
            )));
        }

        Ok(Self {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
            y_at_top,
            cols,
            rows,
        })
    }

    /// Build from a GDAL-style geotransform
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    ///
    /// A negative pixel height means row 0 is the top of the raster.
    pub fn from_geotransform(gt: [f64; 6], cols: usize, rows: usize) -> Result<Self> {
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err(SamplerError::invalid_grid("rotated geotransforms are not supported"));
        }
        if gt[5] == 0.0 {
            return Err(SamplerError::invalid_grid("pixel height must be non-zero"));
        }

        Self::new(gt[0], gt[3], gt[1], gt[5].abs(), gt[5] < 0.0, cols, rows)
    }

    /// Lay a y-at-top grid over `bounds` with the given cell size.
    ///
    /// The shape is rounded to the nearest whole number of cells.
    pub fn from_bounds(bounds: &BoundingBox, cell_width: f64, cell_height: f64) -> Result<Self> {
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(SamplerError::invalid_grid("cell sizes must be positive"));
        }
        let cols = (bounds.width() / cell_width).round();
        let rows = (bounds.height() / cell_height).round();
        if !(cols >= 1.0 && rows >= 1.0) {
            return Err(SamplerError::invalid_grid(format!(
                "bounds {:?} hold no whole cells of {}x{}",
                bounds, cell_width, cell_height
            )));
        }

        Self::new(
            bounds.min_x,
            bounds.max_y,
            cell_width,
            cell_height,
            true,
            cols as usize,
            rows as usize,
        )
    }

    /// The equivalent GDAL-style geotransform.
    pub fn to_geotransform(&self) -> [f64; 6] {
        let pixel_height = if self.y_at_top {
            -self.cell_height
        } else {
            self.cell_height
        };
        [self.origin_x, self.cell_width, 0.0, self.origin_y, 0.0, pixel_height]
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always false for a validated geometry; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geographic extent of the grid.
    pub fn bounds(&self) -> BoundingBox {
        let max_x = self.origin_x + self.cols as f64 * self.cell_width;
        let span_y = self.rows as f64 * self.cell_height;
        if self.y_at_top {
            BoundingBox::new(self.origin_x, self.origin_y - span_y, max_x, self.origin_y)
        } else {
            BoundingBox::new(self.origin_x, self.origin_y, max_x, self.origin_y + span_y)
        }
    }

    /// Find the cell whose centre is nearest to `(x, y)`.
    pub fn locate(&self, x: f64, y: f64) -> LocatedCell {
        let x_val = (x - self.origin_x) / self.cell_width - 0.5;
        let col = x_val.round_ties_even();
        let dx = x_val - col;

        let (row, dy) = if self.y_at_top {
            let y_val = (self.origin_y - y) / self.cell_height - 0.5;
            let row = y_val.round_ties_even();
            (row, y_val - row)
        } else {
            // Native rows grow northward; canonical window rows grow southward.
            let y_val = (y - self.origin_y) / self.cell_height - 0.5;
            let row = y_val.round_ties_even();
            (row, -(y_val - row))
        };

        LocatedCell {
            col: col as i64,
            row: row as i64,
            offset: SubPixelOffset::new(dx, dy),
        }
    }

    /// Locate `(x, y)` and require a window of `radius` around it to fit.
    pub fn to_index(&self, x: f64, y: f64, radius: usize) -> Result<(CellIndex, SubPixelOffset)> {
        let located = self.locate(x, y);
        let index = self.bounds_check(&located, radius)?;
        Ok((index, located.offset))
    }

    /// Require the `radius` window around `located` to lie inside the grid.
    pub fn bounds_check(&self, located: &LocatedCell, radius: usize) -> Result<CellIndex> {
        self.check_span(located.col, located.row, located.col, located.row, radius)?;
        Ok(CellIndex::new(located.col as usize, located.row as usize))
    }

    /// Require windows of `radius` around every index in the span
    /// `[min_col, max_col] x [min_row, max_row]` to lie inside the grid.
    pub fn check_span(
        &self,
        min_col: i64,
        min_row: i64,
        max_col: i64,
        max_row: i64,
        radius: usize,
    ) -> Result<()> {
        // Located indices saturate for huge coordinates, so widen before adding.
        let r = radius as i128;
        let (min_col, min_row) = (min_col as i128 - r, min_row as i128 - r);
        let (max_col, max_row) = (max_col as i128 + r, max_row as i128 + r);
        if min_col < 0 || min_row < 0 || max_col >= self.cols as i128 || max_row >= self.rows as i128 {
            return Err(SamplerError::out_of_bounds(
                format!(
                    "cols {}..={}, rows {}..={} (radius {})",
                    min_col, max_col, min_row, max_row, radius
                ),
                self.describe(),
            ));
        }
        Ok(())
    }

    /// Geographic centre of a cell.
    pub fn cell_center(&self, index: CellIndex) -> (f64, f64) {
        let x = self.origin_x + (index.col as f64 + 0.5) * self.cell_width;
        let offset_y = (index.row as f64 + 0.5) * self.cell_height;
        let y = if self.y_at_top {
            self.origin_y - offset_y
        } else {
            self.origin_y + offset_y
        };
        (x, y)
    }

    /// Map a storage row to its canonical (top-first) row, or back.
    pub fn canonical_row(&self, row: usize) -> usize {
        if self.y_at_top {
            row
        } else {
            self.rows - 1 - row
        }
    }

    /// The same geographic grid stored in the opposite row order.
    pub fn flipped(&self) -> Self {
        let span_y = self.rows as f64 * self.cell_height;
        let origin_y = if self.y_at_top {
            self.origin_y - span_y
        } else {
            self.origin_y + span_y
        };
        Self {
            origin_y,
            y_at_top: !self.y_at_top,
            ..*self
        }
    }

    pub(crate) fn describe(&self) -> String {
        let b = self.bounds();
        format!(
            "cols 0..{}, rows 0..{} over ({}, {}, {}, {})",
            self.cols, self.rows, b.min_x, b.min_y, b.max_x, b.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_grid() -> GridGeometry {
        // 10 x 8 cells of 2 x 1 units, top-left at (100, 50)
        GridGeometry::new(100.0, 50.0, 2.0, 1.0, true, 10, 8).unwrap()
    }

    #[test]
    fn test_rejects_invalid_cell_sizes() {
        assert!(GridGeometry::new(0.0, 0.0, 0.0, 1.0, true, 2, 2).is_err());
        assert!(GridGeometry::new(0.0, 0.0, 1.0, -1.0, true, 2, 2).is_err());
        assert!(GridGeometry::new(0.0, 0.0, 1.0, 1.0, true, 0, 2).is_err());
    }

    #[test]
    fn test_bounds_by_orientation() {
        let top = top_grid();
        assert_eq!(top.bounds(), BoundingBox::new(100.0, 42.0, 120.0, 50.0));

        let bottom = GridGeometry::new(100.0, 42.0, 2.0, 1.0, false, 10, 8).unwrap();
        assert_eq!(bottom.bounds(), BoundingBox::new(100.0, 42.0, 120.0, 50.0));
        assert_eq!(top.flipped(), bottom);
        assert_eq!(bottom.flipped(), top);
    }

    #[test]
    fn test_locate_cell_centers() {
        let grid = top_grid();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let (x, y) = grid.cell_center(CellIndex::new(col, row));
                let located = grid.locate(x, y);
                assert_eq!((located.col, located.row), (col as i64, row as i64));
                assert!(located.offset.dx.abs() < 1e-12);
                assert!(located.offset.dy.abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_offset_sign_is_orientation_independent() {
        let top = top_grid();
        let bottom = top.flipped();

        // A quarter cell east and a quarter cell south of the centre of
        // the canonical cell (3, 2).
        let (cx, cy) = top.cell_center(CellIndex::new(3, 2));
        let (x, y) = (cx + 0.5, cy - 0.25);

        let a = top.locate(x, y);
        let b = bottom.locate(x, y);
        assert_eq!(a.col, b.col);
        assert_eq!(bottom.canonical_row(b.row as usize), a.row as usize);
        assert!((a.offset.dx - 0.25).abs() < 1e-12);
        assert!((a.offset.dy - 0.25).abs() < 1e-12);
        assert!((b.offset.dx - a.offset.dx).abs() < 1e-12);
        assert!((b.offset.dy - a.offset.dy).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_check_edges() {
        let grid = top_grid();
        let (x, y) = grid.cell_center(CellIndex::new(2, 2));
        assert!(grid.to_index(x, y, 2).is_ok());
        assert!(matches!(
            grid.to_index(x, y, 3),
            Err(SamplerError::OutOfBounds { .. })
        ));

        let (x, y) = grid.cell_center(CellIndex::new(9, 7));
        assert_eq!(grid.to_index(x, y, 0).unwrap().0, CellIndex::new(9, 7));
        assert!(grid.to_index(x + 2.0, y, 0).is_err());
    }

    #[test]
    fn test_saturated_indices_are_out_of_bounds() {
        let grid = top_grid();
        let far = grid.locate(1e300, -1e300);
        assert_eq!((far.col, far.row), (i64::MAX, i64::MAX));
        assert!(matches!(grid.bounds_check(&far, 1), Err(SamplerError::OutOfBounds { .. })));

        let near = grid.locate(-1e300, 1e300);
        assert_eq!((near.col, near.row), (i64::MIN, i64::MIN));
        assert!(grid.bounds_check(&near, usize::MAX).is_err());
        assert!(grid.check_span(i64::MIN, 0, i64::MAX, 0, usize::MAX).is_err());
    }

    #[test]
    fn test_geotransform_roundtrip() {
        let gt = [10.0, 0.5, 0.0, 60.0, 0.0, -0.25];
        let grid = GridGeometry::from_geotransform(gt, 4, 6).unwrap();
        assert!(grid.y_at_top);
        assert_eq!(grid.cell_height, 0.25);
        assert_eq!(grid.to_geotransform(), gt);

        let up = GridGeometry::from_geotransform([10.0, 0.5, 0.0, 58.5, 0.0, 0.25], 4, 6).unwrap();
        assert!(!up.y_at_top);
        assert_eq!(up.bounds(), grid.bounds());

        assert!(GridGeometry::from_geotransform([0.0, 1.0, 0.1, 0.0, 0.0, -1.0], 2, 2).is_err());
    }

    #[test]
    fn test_from_bounds_rounds_shape() {
        let bounds = BoundingBox::new(0.0, 0.0, 10.0, 4.9);
        let grid = GridGeometry::from_bounds(&bounds, 1.0, 1.0).unwrap();
        assert_eq!(grid.shape(), (5, 10));
        assert!(grid.y_at_top);
        assert_eq!(grid.origin_y, 4.9);
    }
}
