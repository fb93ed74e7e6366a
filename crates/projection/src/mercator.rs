//! Spherical Web Mercator projection (EPSG:3857).
//!
//! Uses the WGS84 semi-major axis as the sphere radius, which is how
//! EPSG:3857 is defined. Latitudes outside the Mercator domain (|lat| >= 90)
//! cannot be projected.

use std::f64::consts::PI;

use crate::transform::{MapProjection, ProjectionError};

/// Sphere radius used by EPSG:3857 (meters).
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Half the width of the projected world (meters).
pub const WEB_MERCATOR_MAX_EXTENT: f64 = PI * WEB_MERCATOR_RADIUS;

/// Spherical Web Mercator.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl MapProjection for WebMercator {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjectionError> {
        if lat_deg.abs() >= 90.0 {
            return Err(ProjectionError::out_of_domain("EPSG:3857", lon_deg, lat_deg));
        }

        let x = WEB_MERCATOR_RADIUS * lon_deg.to_radians();
        let y = WEB_MERCATOR_RADIUS * (PI / 4.0 + lat_deg.to_radians() / 2.0).tan().ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
        let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        Ok((lon, lat))
    }
}
