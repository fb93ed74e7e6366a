//! Central-difference gradients over a whole grid.
//!
//! Differences are taken in canonical (top-first) orientation so that the
//! north-south component means "north-facing" for either storage order:
//!
//! ```text
//! ns[i, j] = (v[i + 1, j] - v[i - 1, j]) / (2 * cell_height * y_factor)
//! ew[i, j] = (v[i, j - 1] - v[i, j + 1]) / (2 * cell_width * x_factor)
//! ```
//!
//! The first and last rows of `ns` and the first and last columns of `ew`
//! are zero. Output is returned in the grid's native row order.

use rayon::prelude::*;
use tracing::debug;

use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::grid::Grid;
use crate::types::{GradientMode, UnitFactor};

/// Mean Earth radius used for the degrees-to-meters factor (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Computes gradients, splitting rows across the rayon pool on large grids.
#[derive(Debug, Clone, Copy)]
pub struct GradientComputer {
    parallel_threshold: usize,
}

impl GradientComputer {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            parallel_threshold: config.parallel_threshold.max(1),
        }
    }

    /// Gradient values in native row-major order, same shape as `grid`.
    pub fn values(&self, grid: &Grid, mode: GradientMode, unit: UnitFactor) -> Result<Vec<f64>> {
        let (x_factor, y_factor) = axis_factors(grid, unit)?;
        let geometry = grid.geometry();
        let (rows, cols) = geometry.shape();

        let ns_den = 2.0 * geometry.cell_height * y_factor;
        let ew_den = 2.0 * geometry.cell_width * x_factor;
        let data = grid.data();
        let native_row = move |r: usize| &data[r * cols..(r + 1) * cols];

        debug!(
            mode = %mode,
            rows = rows,
            cols = cols,
            x_factor = x_factor,
            y_factor = y_factor,
            "Computing gradient"
        );

        let fill_row = |(r, out): (usize, &mut [f64])| {
            let canonical = geometry.canonical_row(r);
            let current = native_row(r);
            let north_south = (mode.needs_north_south() && canonical > 0 && canonical + 1 < rows).then(|| {
                (
                    native_row(geometry.canonical_row(canonical - 1)),
                    native_row(geometry.canonical_row(canonical + 1)),
                )
            });

            for (j, cell) in out.iter_mut().enumerate() {
                let ns = match north_south {
                    Some((north, south)) => (south[j] - north[j]) / ns_den,
                    None => 0.0,
                };
                let ew = if mode.needs_east_west() && j > 0 && j + 1 < cols {
                    (current[j - 1] - current[j + 1]) / ew_den
                } else {
                    0.0
                };
                *cell = combine(mode, ns, ew);
            }
        };

        let mut output = vec![0.0; rows * cols];
        if rows >= self.parallel_threshold {
            output.par_chunks_mut(cols).enumerate().for_each(fill_row);
        } else {
            output.chunks_mut(cols).enumerate().for_each(fill_row);
        }

        Ok(output)
    }

    /// Gradient as a new `f64` grid over the same geometry and CRS.
    pub fn compute(&self, grid: &Grid, mode: GradientMode, unit: UnitFactor) -> Result<Grid> {
        let values = self.values(grid, mode, unit)?;
        grid.from_processed(values)
    }
}

impl Default for GradientComputer {
    fn default() -> Self {
        Self::new(&SamplerConfig::default())
    }
}

/// Gradient values of `grid` in native row-major order.
pub fn gradient_values(grid: &Grid, mode: GradientMode, unit: UnitFactor) -> Result<Vec<f64>> {
    GradientComputer::default().values(grid, mode, unit)
}

/// Gradient of `grid` as a new grid.
pub fn compute_gradient(grid: &Grid, mode: GradientMode, unit: UnitFactor) -> Result<Grid> {
    GradientComputer::default().compute(grid, mode, unit)
}

fn combine(mode: GradientMode, ns: f64, ew: f64) -> f64 {
    match mode {
        GradientMode::Total => (ns * ns + ew * ew).sqrt(),
        GradientMode::NorthSouth => ns,
        GradientMode::EastWest => ew,
        GradientMode::Direction => ns.atan2(ew),
    }
}

/// Resolve `unit` into (x, y) factors for `grid`.
fn axis_factors(grid: &Grid, unit: UnitFactor) -> Result<(f64, f64)> {
    let (x, y) = match unit {
        UnitFactor::Scalar(f) => (f, f),
        UnitFactor::PerAxis { x, y } => (x, y),
        UnitFactor::DegreesToMeters => {
            let bounds = grid.geometry().bounds();
            let lat_mid = (bounds.min_y + bounds.max_y) / 2.0;
            let per_degree = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
            (per_degree * lat_mid.to_radians().cos(), per_degree)
        }
    };

    if !(x.is_finite() && y.is_finite()) || x == 0.0 || y == 0.0 {
        return Err(SamplerError::invalid_grid(format!(
            "unit factors must be finite and non-zero, got ({}, {})",
            x, y
        )));
    }
    Ok((x, y))
}
