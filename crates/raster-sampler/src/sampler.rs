//! Batch point sampling: locate, bounds-check the whole batch, then read
//! one window per point.

use std::sync::Arc;

use geo_common::CrsCode;
use projection::{BuiltinTransformer, CoordinateTransformer};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::geometry::LocatedCell;
use crate::grid::Grid;
use crate::locator::{PointInput, PointLocator};
use crate::types::CellIndex;
use crate::window::{read_window, Sample};

/// Samples value windows from grids at caller-supplied points.
#[derive(Clone)]
pub struct Sampler {
    transformer: Arc<dyn CoordinateTransformer>,
    point_crs: CrsCode,
    parallel_threshold: usize,
}

impl Sampler {
    /// Create a sampler using the built-in coordinate transformer.
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            transformer: Arc::new(BuiltinTransformer::new()),
            point_crs: config.default_point_crs,
            parallel_threshold: config.parallel_threshold.max(1),
        }
    }

    /// Replace the coordinate transformer.
    pub fn with_transformer(mut self, transformer: Arc<dyn CoordinateTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    /// Set the CRS assumed for bare coordinates.
    pub fn with_point_crs(mut self, crs: CrsCode) -> Self {
        self.point_crs = crs;
        self
    }

    pub fn point_crs(&self) -> CrsCode {
        self.point_crs
    }

    /// Locate every point and check that a window of `radius` fits around
    /// each of them.
    ///
    /// The check covers the span of all located cells at once: if any
    /// window leaves the grid the whole batch fails.
    pub fn locate_cells(&self, grid: &Grid, points: &[PointInput], radius: usize) -> Result<Vec<LocatedCell>> {
        let locator = PointLocator::new(self.transformer.as_ref(), self.point_crs);
        let geometry = grid.geometry();

        let located: Vec<LocatedCell> = locator
            .locate(points, grid.crs())?
            .iter()
            .map(|p| geometry.locate(p.x, p.y))
            .collect();

        let Some(first) = located.first() else {
            return Ok(located);
        };
        let (mut min_col, mut min_row) = (first.col, first.row);
        let (mut max_col, mut max_row) = (first.col, first.row);
        for cell in &located[1..] {
            min_col = min_col.min(cell.col);
            max_col = max_col.max(cell.col);
            min_row = min_row.min(cell.row);
            max_row = max_row.max(cell.row);
        }

        if let Err(e) = geometry.check_span(min_col, min_row, max_col, max_row, radius) {
            warn!(
                points = located.len(),
                radius = radius,
                error = %e,
                "Rejected sampling batch"
            );
            return Err(e);
        }

        Ok(located)
    }

    /// Sample a window of `radius` at every point, in input order.
    ///
    /// Fails with [`SamplerError::OutOfBounds`] without reading anything if
    /// any point's window would leave the grid.
    pub fn sample_windows(&self, grid: &Grid, points: &[PointInput], radius: usize) -> Result<Vec<Sample>> {
        let located = self.locate_cells(grid, points, radius)?;

        debug!(
            points = located.len(),
            radius = radius,
            parallel = located.len() >= self.parallel_threshold,
            "Sampling windows"
        );

        let read = |cell: &LocatedCell| {
            let index = CellIndex::new(cell.col as usize, cell.row as usize);
            Sample {
                window: read_window(grid, index, radius),
                offset: cell.offset,
                index,
            }
        };

        let samples: Vec<Sample> = if located.len() >= self.parallel_threshold {
            located.par_iter().map(read).collect()
        } else {
            located.iter().map(read).collect()
        };

        Ok(samples)
    }

    /// Sample a window of `radius` at a single point.
    pub fn sample_one(&self, grid: &Grid, point: &PointInput, radius: usize) -> Result<Sample> {
        self.sample_windows(grid, std::slice::from_ref(point), radius)?
            .pop()
            .ok_or_else(|| SamplerError::invalid_point("no sample produced"))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(&SamplerConfig::default())
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("point_crs", &self.point_crs)
            .field("parallel_threshold", &self.parallel_threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;
    use crate::locator::GeoPoint;

    /// 10x10 one-degree grid over (0..10, 0..10), value `row * 10 + col`.
    fn grid() -> Grid {
        let geometry = GridGeometry::new(0.0, 10.0, 1.0, 1.0, true, 10, 10).unwrap();
        Grid::new((0..100).map(f64::from).collect(), geometry, CrsCode::Epsg4326).unwrap()
    }

    #[test]
    fn test_sample_preserves_order() {
        let sampler = Sampler::default();
        let points: Vec<PointInput> = vec![(2.5, 7.5).into(), (5.5, 5.5).into(), (7.5, 2.5).into()];
        let samples = sampler.sample_windows(&grid(), &points, 1).unwrap();
        let centers: Vec<f64> = samples.iter().map(|s| s.window.center()).collect();
        assert_eq!(centers, vec![22.0, 45.0, 77.0]);
        assert_eq!(samples[1].index, CellIndex::new(5, 4));
    }

    #[test]
    fn test_batch_fails_without_partial_results() {
        let sampler = Sampler::default();
        let points: Vec<PointInput> = vec![(2.5, 7.5).into(), (0.5, 5.5).into(), (7.5, 2.5).into()];
        let err = sampler.sample_windows(&grid(), &points, 1).unwrap_err();
        assert!(matches!(err, SamplerError::OutOfBounds { .. }));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let points: Vec<PointInput> = (0..200)
            .map(|i| PointInput::from((3.0 + (i % 4) as f64, 3.0 + (i / 50) as f64)))
            .collect();
        let sequential = Sampler::new(&SamplerConfig {
            parallel_threshold: usize::MAX,
            ..Default::default()
        });
        let parallel = Sampler::new(&SamplerConfig {
            parallel_threshold: 1,
            ..Default::default()
        });
        assert_eq!(
            sequential.sample_windows(&grid(), &points, 2).unwrap(),
            parallel.sample_windows(&grid(), &points, 2).unwrap()
        );
    }

    #[test]
    fn test_sample_one_reprojects() {
        let sampler = Sampler::default();
        // Centre of cell (col 1, row 9) expressed in Web Mercator.
        let x = 1.5_f64.to_radians() * 6_378_137.0;
        let y = (std::f64::consts::FRAC_PI_4 + 0.5_f64.to_radians() / 2.0).tan().ln() * 6_378_137.0;
        let point = PointInput::from(GeoPoint::new(x, y, CrsCode::Epsg3857));
        let sample = sampler.sample_one(&grid(), &point, 0).unwrap();
        assert_eq!(sample.window.center(), 91.0);
        assert!(sample.offset.dx.abs() < 1e-9);
        assert!(sample.offset.dy.abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        let samples = Sampler::default().sample_windows(&grid(), &[], 3).unwrap();
        assert!(samples.is_empty());
    }
}
