//! Configuration for the sampler.

use geo_common::CrsCode;
use serde::{Deserialize, Serialize};

use crate::types::InterpolationMode;

/// Largest window radius accepted for average and custom reductions.
pub const MAX_WINDOW_RADIUS: usize = 256;

/// Configuration for point sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// CRS assumed for bare coordinates and untagged point geometries.
    pub default_point_crs: CrsCode,

    /// Window radius used by the average and custom modes.
    pub window_radius: usize,

    /// Default interpolation mode.
    pub interpolation: InterpolationMode,

    /// Batch size (points, or gradient rows) at which work moves onto the
    /// rayon pool.
    pub parallel_threshold: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            default_point_crs: CrsCode::Epsg4326,
            window_radius: 3,
            interpolation: InterpolationMode::Nearest,
            parallel_threshold: 64,
        }
    }
}

impl SamplerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RASTER_POINT_CRS") {
            if let Ok(crs) = CrsCode::from_identifier(&val) {
                config.default_point_crs = crs;
            }
        }

        if let Ok(val) = std::env::var("RASTER_WINDOW_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.window_radius = radius;
            }
        }

        if let Ok(val) = std::env::var("RASTER_INTERPOLATION") {
            if let Ok(mode) = val.parse() {
                config.interpolation = mode;
            }
        }

        if let Ok(val) = std::env::var("RASTER_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.parallel_threshold = threshold;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_radius > MAX_WINDOW_RADIUS {
            return Err(format!(
                "window_radius must be <= {}, got {}",
                MAX_WINDOW_RADIUS, self.window_radius
            ));
        }

        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be > 0".to_string());
        }

        Ok(())
    }

    /// Radius to sample with for `mode`: the mode's own requirement, or the
    /// configured window radius for average and custom.
    pub fn radius_for(&self, mode: InterpolationMode) -> usize {
        mode.required_radius().unwrap_or(self.window_radius)
    }
}
