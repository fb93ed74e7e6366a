//! Common grid layouts for raster-sampler tests.
//!
//! Layouts are plain numbers so that this crate does not depend on the
//! crates it tests; build geometries from them with
//! `GridGeometry::from_geotransform(spec.geotransform(), spec.cols, spec.rows)`.

/// Common bounding box definitions for testing, as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Global geographic extent
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Central Europe in lon/lat
    pub const CENTRAL_EUROPE: (f64, f64, f64, f64) = (5.0, 45.0, 15.0, 55.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Common grid layouts for testing.
pub mod grid {
    /// 0.1 degree lon/lat grid over central Europe, row 0 at the top.
    pub const EUROPE_TENTH_DEGREE: GridSpec = GridSpec {
        cols: 100,
        rows: 100,
        origin_x: 5.0,
        origin_y: 55.0,
        cell_width: 0.1,
        cell_height: 0.1,
        y_at_top: true,
    };

    /// The same extent stored bottom-up.
    pub const EUROPE_TENTH_DEGREE_BOTTOM_UP: GridSpec = GridSpec {
        cols: 100,
        rows: 100,
        origin_x: 5.0,
        origin_y: 45.0,
        cell_width: 0.1,
        cell_height: 0.1,
        y_at_top: false,
    };

    /// 1 km grid in ETRS89-LAEA (EPSG:3035) whose cell (100, 75) is
    /// centred on the projection centre (10E, 52N).
    pub const LAEA_1KM: GridSpec = GridSpec {
        cols: 200,
        rows: 150,
        origin_x: 4_220_500.0,
        origin_y: 3_285_500.0,
        cell_width: 1000.0,
        cell_height: 1000.0,
        y_at_top: true,
    };

    /// Small grid with non-square cells.
    pub const RECTANGULAR_CELLS: GridSpec = GridSpec {
        cols: 20,
        rows: 16,
        origin_x: 100.0,
        origin_y: 50.0,
        cell_width: 2.0,
        cell_height: 0.5,
        y_at_top: true,
    };

    /// Layout of a north-up grid.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub cols: usize,
        pub rows: usize,
        /// Left edge.
        pub origin_x: f64,
        /// Top edge when `y_at_top`, bottom edge otherwise.
        pub origin_y: f64,
        pub cell_width: f64,
        pub cell_height: f64,
        pub y_at_top: bool,
    }

    impl GridSpec {
        /// Total number of cells.
        pub fn cell_count(&self) -> usize {
            self.cols * self.rows
        }

        /// GDAL-style geotransform for this layout.
        pub fn geotransform(&self) -> [f64; 6] {
            let dy = if self.y_at_top {
                -self.cell_height
            } else {
                self.cell_height
            };
            [self.origin_x, self.cell_width, 0.0, self.origin_y, 0.0, dy]
        }

        /// Centre of canonical (top-first) cell `(col, row)`.
        pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
            let x = self.origin_x + (col as f64 + 0.5) * self.cell_width;
            let top = if self.y_at_top {
                self.origin_y
            } else {
                self.origin_y + self.rows as f64 * self.cell_height
            };
            (x, top - (row as f64 + 0.5) * self.cell_height)
        }
    }
}
