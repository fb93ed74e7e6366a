//! Reprojection between the supported coordinate reference systems.
//!
//! Every supported CRS is either geographic (EPSG:4326) or a projection of
//! it, so any pair is transformed by going through lon/lat degrees.

use geo_common::CrsCode;
use thiserror::Error;
use tracing::debug;

use crate::laea::LambertAzimuthalEqualArea;
use crate::mercator::WebMercator;

/// Errors raised while transforming coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The coordinate lies outside the valid domain of the projection.
    #[error("coordinate ({x}, {y}) is outside the domain of {crs}")]
    OutOfDomain { crs: String, x: f64, y: f64 },

    /// The coordinate is NaN or infinite.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

impl ProjectionError {
    /// Create an OutOfDomain error.
    pub fn out_of_domain(crs: impl Into<String>, x: f64, y: f64) -> Self {
        Self::OutOfDomain {
            crs: crs.into(),
            x,
            y,
        }
    }
}

/// A map projection between geographic degrees and planar coordinates.
pub trait MapProjection {
    /// Project (lon, lat) in degrees to planar (x, y).
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjectionError>;

    /// Unproject planar (x, y) to (lon, lat) in degrees.
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError>;
}

/// Coordinate-system service used to bring points into a raster's CRS.
///
/// Implementations must preserve the order and length of `points`.
pub trait CoordinateTransformer: Send + Sync {
    fn reproject(
        &self,
        points: &[(f64, f64)],
        from: CrsCode,
        to: CrsCode,
    ) -> Result<Vec<(f64, f64)>, ProjectionError>;
}

/// Transformer backed by the projections implemented in this crate.
#[derive(Debug, Clone)]
pub struct BuiltinTransformer {
    laea: LambertAzimuthalEqualArea,
}

impl BuiltinTransformer {
    pub fn new() -> Self {
        Self {
            laea: LambertAzimuthalEqualArea::europe(),
        }
    }

    /// Convert a coordinate in `crs` to lon/lat degrees.
    pub fn to_geographic(&self, crs: CrsCode, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        match crs {
            CrsCode::Epsg4326 => Ok((x, y)),
            CrsCode::Epsg3857 => WebMercator.inverse(x, y),
            CrsCode::Epsg3035 => self.laea.inverse(x, y),
        }
    }

    /// Convert lon/lat degrees to a coordinate in `crs`.
    pub fn from_geographic(
        &self,
        crs: CrsCode,
        lon: f64,
        lat: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        match crs {
            CrsCode::Epsg4326 => Ok((lon, lat)),
            CrsCode::Epsg3857 => WebMercator.forward(lon, lat),
            CrsCode::Epsg3035 => self.laea.forward(lon, lat),
        }
    }

    /// Transform a single point.
    pub fn transform_point(
        &self,
        x: f64,
        y: f64,
        from: CrsCode,
        to: CrsCode,
    ) -> Result<(f64, f64), ProjectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ProjectionError::NonFinite { x, y });
        }
        if from == to {
            return Ok((x, y));
        }

        let (lon, lat) = self.to_geographic(from, x, y)?;
        self.from_geographic(to, lon, lat)
    }
}

impl Default for BuiltinTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateTransformer for BuiltinTransformer {
    fn reproject(
        &self,
        points: &[(f64, f64)],
        from: CrsCode,
        to: CrsCode,
    ) -> Result<Vec<(f64, f64)>, ProjectionError> {
        debug!(count = points.len(), %from, %to, "Reprojecting points");

        points
            .iter()
            .map(|&(x, y)| self.transform_point(x, y, from, to))
            .collect()
    }
}
