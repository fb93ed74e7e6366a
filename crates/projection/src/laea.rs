//! Lambert Azimuthal Equal Area projection on the GRS80 ellipsoid.
//!
//! This is the projection behind ETRS89-LAEA Europe (EPSG:3035), the usual
//! metric CRS for pan-European rasters. Forward equations are exact; the
//! inverse recovers latitude from authalic latitude with the standard
//! series expansion, which is accurate well below a millimetre.
//!
//! Parameters:
//! - Latitude of natural origin (lat0)
//! - Longitude of natural origin (lon0)
//! - False easting / northing
//! - Ellipsoid semi-major axis and flattening

use crate::transform::{MapProjection, ProjectionError};

/// Lambert Azimuthal Equal Area (oblique aspect, ellipsoidal).
#[derive(Debug, Clone)]
pub struct LambertAzimuthalEqualArea {
    /// Longitude of natural origin in radians
    pub lon0: f64,
    /// Latitude of natural origin in radians
    pub lat0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// Semi-major axis (meters)
    pub a: f64,
    /// First eccentricity
    e: f64,
    /// Authalic q at the pole
    qp: f64,
    /// Authalic radius
    rq: f64,
    /// Authalic latitude of the origin
    beta0: f64,
    /// Scale correction D
    d: f64,
}

impl LambertAzimuthalEqualArea {
    /// Create a projection from origin (degrees), false origin and ellipsoid.
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        false_easting: f64,
        false_northing: f64,
        a: f64,
        inv_flattening: f64,
    ) -> Self {
        let f = 1.0 / inv_flattening;
        let e = (2.0 * f - f * f).sqrt();
        let lat0 = lat0_deg.to_radians();

        let qp = authalic_q(std::f64::consts::FRAC_PI_2.sin(), e);
        let q0 = authalic_q(lat0.sin(), e);
        let beta0 = (q0 / qp).asin();
        let rq = a * (qp / 2.0).sqrt();
        let sin_lat0 = lat0.sin();
        let d = a * (lat0.cos() / (1.0 - e * e * sin_lat0 * sin_lat0).sqrt()) / (rq * beta0.cos());

        Self {
            lon0: lon0_deg.to_radians(),
            lat0,
            false_easting,
            false_northing,
            a,
            e,
            qp,
            rq,
            beta0,
            d,
        }
    }

    /// ETRS89-LAEA Europe (EPSG:3035).
    pub fn europe() -> Self {
        Self::new(52.0, 10.0, 4_321_000.0, 3_210_000.0, 6_378_137.0, 298.257_222_101)
    }
}

/// Authalic `q` for a given sin(latitude).
fn authalic_q(sin_lat: f64, e: f64) -> f64 {
    let e2 = e * e;
    let es = e * sin_lat;
    (1.0 - e2) * (sin_lat / (1.0 - es * es) - (1.0 / (2.0 * e)) * ((1.0 - es) / (1.0 + es)).ln())
}

impl MapProjection for LambertAzimuthalEqualArea {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjectionError> {
        if lat_deg.abs() > 90.0 {
            return Err(ProjectionError::out_of_domain("LAEA", lon_deg, lat_deg));
        }

        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.lon0;

        let q = authalic_q(lat.sin(), self.e);
        let beta = (q / self.qp).clamp(-1.0, 1.0).asin();

        let denom = 1.0
            + self.beta0.sin() * beta.sin()
            + self.beta0.cos() * beta.cos() * dlon.cos();
        // The antipode of the origin has no image.
        if denom <= f64::EPSILON {
            return Err(ProjectionError::out_of_domain("LAEA", lon_deg, lat_deg));
        }
        let b = self.rq * (2.0 / denom).sqrt();

        let x = self.false_easting + b * self.d * beta.cos() * dlon.sin();
        let y = self.false_northing
            + (b / self.d)
                * (self.beta0.cos() * beta.sin() - self.beta0.sin() * beta.cos() * dlon.cos());
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;

        let rho = ((dx / self.d).powi(2) + (self.d * dy).powi(2)).sqrt();
        if rho < 1e-9 {
            return Ok((self.lon0.to_degrees(), self.lat0.to_degrees()));
        }

        let ratio = rho / (2.0 * self.rq);
        if ratio > 1.0 {
            return Err(ProjectionError::out_of_domain("LAEA", x, y));
        }
        let c = 2.0 * ratio.asin();

        let beta = (c.cos() * self.beta0.sin() + (self.d * dy * c.sin() * self.beta0.cos()) / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (dx * c.sin()).atan2(
                self.d * rho * self.beta0.cos() * c.cos()
                    - self.d * self.d * dy * self.beta0.sin() * c.sin(),
            );

        let e2 = self.e * self.e;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let lat = beta
            + (e2 / 3.0 + 31.0 * e4 / 180.0 + 517.0 * e6 / 5040.0) * (2.0 * beta).sin()
            + (23.0 * e4 / 360.0 + 251.0 * e6 / 3780.0) * (4.0 * beta).sin()
            + (761.0 * e6 / 45360.0) * (6.0 * beta).sin();

        Ok((lon.to_degrees(), lat.to_degrees()))
    }
}
