//! Common types shared across the raster-sampling workspace.

pub mod bbox;
pub mod crs;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::{CrsCode, CrsParseError};
