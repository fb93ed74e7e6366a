//! Raster-to-coordinate sampling over in-memory grids.
//!
//! This crate maps geographic points onto the cells of a north-up raster,
//! cuts value windows around them and reduces those windows to values. It
//! also derives per-cell gradients from the same grids.
//!
//! # Architecture
//!
//! ```text
//! PointInput ([x, y], {x, y}, GeoJSON Point)
//!      │
//!      ▼
//! PointLocator ──► reproject into the grid CRS
//!      │
//!      ▼
//! GridGeometry::locate ──► (cell, sub-pixel offset)
//!      │
//!      ▼
//! Sampler ──► batch-wide bounds check, one window per point
//!      │
//!      ▼
//! interpolate(window, offset, mode) ──► value
//! ```
//!
//! Windows are always top-first, whatever the grid's row order, and
//! offsets are expressed in the same orientation.
//!
//! # Example
//!
//! ```ignore
//! use raster_sampler::{Grid, GridGeometry, InterpolationMode, point_value};
//! use geo_common::CrsCode;
//!
//! let geometry = GridGeometry::new(5.0, 55.0, 0.1, 0.1, true, 100, 100)?;
//! let grid = Grid::new(data, geometry, CrsCode::Epsg4326)?;
//!
//! let value = point_value(&grid, (7.23, 51.02), InterpolationMode::CubicSpline, None)?;
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod gradient;
pub mod grid;
pub mod interpolation;
pub mod locator;
pub mod query;
pub mod sampler;
pub mod source;
pub mod types;
pub mod window;

// Re-export commonly used types at crate root
pub use config::SamplerConfig;
pub use error::{Result, SamplerError};
pub use geometry::{GridGeometry, LocatedCell};
pub use gradient::{compute_gradient, gradient_values, GradientComputer};
pub use grid::{Grid, GridInfo};
pub use interpolation::{interpolate, Reducer};
pub use locator::{GeoPoint, Point, PointGeometry, PointInput, PointLocator};
pub use query::{point_value, point_values, reduce_windows, sample_windows, PointQuery};
pub use sampler::Sampler;
pub use source::{GridSource, MemoryGridSource};
pub use types::{
    CellIndex, CellType, DataType, GradientMode, InterpolationMode, SubPixelOffset, UnitFactor,
};
pub use window::{extract_window, Sample, Window};
