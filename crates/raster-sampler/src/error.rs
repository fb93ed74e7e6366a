//! Error types for raster sampling.

use geo_common::CrsParseError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while sampling, interpolating or differencing a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplerError {
    /// A point input could not be read as a coordinate or point geometry.
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    /// A requested window (point + radius) reaches outside the grid.
    #[error("requested window {requested} is outside grid extent {grid}")]
    OutOfBounds { requested: String, grid: String },

    /// Unrecognized interpolation or gradient mode.
    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    /// Custom reduction requested without a reducer.
    #[error("custom interpolation requested but no reducer was supplied")]
    MissingReducer,

    /// A supplied array does not match the grid shape.
    #[error("dimension mismatch: expected {expected:?} (rows, cols), got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Grid metadata violates an invariant (non-positive cell size, empty shape).
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Spline fitting failed.
    #[error("interpolation error: {0}")]
    InterpolationFailed(String),

    /// Grid identifier unknown to the raster source.
    #[error("grid not found: {0}")]
    NotFound(String),

    /// Coordinate transformation failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Coordinate-system identifier could not be resolved.
    #[error(transparent)]
    Crs(#[from] CrsParseError),
}

impl SamplerError {
    /// Create an InvalidPoint error.
    pub fn invalid_point(msg: impl Into<String>) -> Self {
        Self::InvalidPoint(msg.into())
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, grid: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            grid: grid.into(),
        }
    }

    /// Create an UnsupportedMode error.
    pub fn unsupported_mode(mode: impl Into<String>) -> Self {
        Self::UnsupportedMode(mode.into())
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }
}

/// Result type for sampler operations.
pub type Result<T> = std::result::Result<T, SamplerError>;
