//! Coordinate reference system transformations.
//!
//! Implements the supported map projections from scratch and exposes them
//! through the [`CoordinateTransformer`] service trait.

pub mod laea;
pub mod mercator;
pub mod transform;

pub use laea::LambertAzimuthalEqualArea;
pub use mercator::WebMercator;
pub use transform::{BuiltinTransformer, CoordinateTransformer, MapProjection, ProjectionError};
