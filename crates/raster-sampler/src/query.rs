//! Point-value queries: sampling followed by interpolation.

use std::sync::Arc;

use geo_common::CrsCode;
use projection::CoordinateTransformer;
use rayon::prelude::*;
use tracing::debug;

use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::grid::Grid;
use crate::interpolation::{interpolate, Reducer};
use crate::locator::PointInput;
use crate::sampler::Sampler;
use crate::types::InterpolationMode;
use crate::window::{Sample, Window};

/// Builder for point-value lookups.
///
/// Nearest and the spline modes always sample the radius they need
/// (0, 2 and 4). Average and custom sample `window_radius`.
///
/// ```ignore
/// let value = PointQuery::new()
///     .mode(InterpolationMode::CubicSpline)
///     .point_crs(CrsCode::Epsg3857)
///     .value(&grid, (1_113_194.9, 6_446_275.8))?;
/// ```
#[derive(Clone)]
pub struct PointQuery<'r> {
    sampler: Sampler,
    config: SamplerConfig,
    reducer: Option<&'r Reducer<'r>>,
}

impl<'r> PointQuery<'r> {
    /// A query with default configuration.
    pub fn new() -> Self {
        Self::from_config(&SamplerConfig::default())
    }

    pub fn from_config(config: &SamplerConfig) -> Self {
        Self {
            sampler: Sampler::new(config),
            config: config.clone(),
            reducer: None,
        }
    }

    pub fn mode(mut self, mode: InterpolationMode) -> Self {
        self.config.interpolation = mode;
        self
    }

    /// Window radius for average and custom modes.
    pub fn window_radius(mut self, radius: usize) -> Self {
        self.config.window_radius = radius;
        self
    }

    /// Reducer applied in custom mode.
    pub fn reducer(mut self, reducer: &'r Reducer<'r>) -> Self {
        self.reducer = Some(reducer);
        self
    }

    /// CRS of bare coordinates.
    pub fn point_crs(mut self, crs: CrsCode) -> Self {
        self.config.default_point_crs = crs;
        self.sampler = self.sampler.with_point_crs(crs);
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn CoordinateTransformer>) -> Self {
        self.sampler = self.sampler.with_transformer(transformer);
        self
    }

    /// Radius that will be sampled for the current mode.
    pub fn radius(&self) -> usize {
        self.config.radius_for(self.config.interpolation)
    }

    /// Interpolated value at a single point.
    pub fn value(&self, grid: &Grid, point: impl Into<PointInput>) -> Result<f64> {
        let mut values = self.values(grid, &[point.into()])?;
        values
            .pop()
            .ok_or_else(|| SamplerError::invalid_point("no value produced"))
    }

    /// Interpolated values at every point, in input order.
    pub fn values(&self, grid: &Grid, points: &[PointInput]) -> Result<Vec<f64>> {
        let mode = self.config.interpolation;
        if mode == InterpolationMode::Custom && self.reducer.is_none() {
            return Err(SamplerError::MissingReducer);
        }

        let radius = self.radius();
        debug!(mode = %mode, radius = radius, points = points.len(), "Point value query");

        let samples = self.sampler.sample_windows(grid, points, radius)?;
        let reduce = |s: &Sample| interpolate(&s.window, s.offset, mode, self.reducer);

        if samples.len() >= self.parallel_threshold() && mode.uses_offset() {
            samples.par_iter().map(reduce).collect()
        } else {
            samples.iter().map(reduce).collect()
        }
    }

    /// Apply `f` to the window at every point, in input order.
    ///
    /// Unlike custom mode, `f` may return any type.
    pub fn reduce_with<T, F>(&self, grid: &Grid, points: &[PointInput], f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&Window) -> T + Send + Sync,
    {
        let samples = self.sampler.sample_windows(grid, points, self.config.window_radius)?;
        if samples.len() >= self.parallel_threshold() {
            Ok(samples.par_iter().map(|s| f(&s.window)).collect())
        } else {
            Ok(samples.iter().map(|s| f(&s.window)).collect())
        }
    }

    fn parallel_threshold(&self) -> usize {
        self.config.parallel_threshold.max(1)
    }
}

impl Default for PointQuery<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PointQuery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointQuery")
            .field("sampler", &self.sampler)
            .field("config", &self.config)
            .field("reducer", &self.reducer.is_some())
            .finish()
    }
}

/// Windows of `radius` around lon/lat `points`, in input order.
pub fn sample_windows(grid: &Grid, points: &[PointInput], radius: usize) -> Result<Vec<Sample>> {
    Sampler::default().sample_windows(grid, points, radius)
}

/// Interpolated value at one lon/lat point.
pub fn point_value(
    grid: &Grid,
    point: impl Into<PointInput>,
    mode: InterpolationMode,
    reducer: Option<&Reducer<'_>>,
) -> Result<f64> {
    with_reducer(PointQuery::new().mode(mode), reducer).value(grid, point)
}

/// Interpolated values at lon/lat `points`, in input order.
pub fn point_values(
    grid: &Grid,
    points: &[PointInput],
    mode: InterpolationMode,
    reducer: Option<&Reducer<'_>>,
) -> Result<Vec<f64>> {
    with_reducer(PointQuery::new().mode(mode), reducer).values(grid, points)
}

/// Apply `f` to the window of `radius` around each lon/lat point.
pub fn reduce_windows<T, F>(grid: &Grid, points: &[PointInput], radius: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Window) -> T + Send + Sync,
{
    PointQuery::new().window_radius(radius).reduce_with(grid, points, f)
}

fn with_reducer<'r>(query: PointQuery<'r>, reducer: Option<&'r Reducer<'r>>) -> PointQuery<'r> {
    match reducer {
        Some(r) => query.reducer(r),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;

    /// 20x20 grid of half-degree cells over (0..10, 40..50) holding `x + 2y`
    /// evaluated at each cell centre.
    fn plane_grid() -> Grid {
        let geometry = GridGeometry::new(0.0, 50.0, 0.5, 0.5, true, 20, 20).unwrap();
        let data = (0..400)
            .map(|i| {
                let (row, col) = (i / 20, i % 20);
                let (x, y) = (0.25 + 0.5 * col as f64, 49.75 - 0.5 * row as f64);
                x + 2.0 * y
            })
            .collect();
        Grid::new(data, geometry, CrsCode::Epsg4326).unwrap()
    }

    #[test]
    fn test_radius_follows_mode() {
        let q = PointQuery::new().window_radius(6);
        assert_eq!(q.clone().mode(InterpolationMode::Nearest).radius(), 0);
        assert_eq!(q.clone().mode(InterpolationMode::LinearSpline).radius(), 2);
        assert_eq!(q.clone().mode(InterpolationMode::CubicSpline).radius(), 4);
        assert_eq!(q.mode(InterpolationMode::Average).radius(), 6);
    }

    #[test]
    fn test_radius_from_config() {
        let config = SamplerConfig {
            window_radius: 5,
            interpolation: InterpolationMode::Average,
            ..Default::default()
        };
        let q = PointQuery::from_config(&config);
        assert_eq!(q.radius(), config.radius_for(InterpolationMode::Average));
        assert_eq!(q.radius(), 5);

        let q = q.mode(InterpolationMode::LinearSpline);
        assert_eq!(q.radius(), config.radius_for(InterpolationMode::LinearSpline));
    }

    #[test]
    fn test_spline_modes_follow_plane() {
        let grid = plane_grid();
        for mode in [InterpolationMode::LinearSpline, InterpolationMode::CubicSpline] {
            let v = point_value(&grid, (4.1, 45.3), mode, None).unwrap();
            assert!((v - (4.1 + 2.0 * 45.3)).abs() < 1e-9, "{}: {}", mode, v);
        }
        let nearest = point_value(&grid, (4.1, 45.3), InterpolationMode::Nearest, None).unwrap();
        assert_eq!(nearest, 4.25 + 2.0 * 45.25);
    }

    #[test]
    fn test_custom_mode() {
        let grid = plane_grid();
        assert_eq!(
            point_value(&grid, (5.0, 45.0), InterpolationMode::Custom, None),
            Err(SamplerError::MissingReducer)
        );

        let spread = |w: &Window| {
            let (lo, hi) = w
                .values()
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            hi - lo
        };
        let values = PointQuery::new()
            .mode(InterpolationMode::Custom)
            .window_radius(1)
            .reducer(&spread)
            .values(&grid, &[(5.1, 45.1).into(), (2.1, 42.1).into()])
            .unwrap();
        // 3x3 window of x + 2y on half-degree cells
        assert_eq!(values, vec![3.0, 3.0]);
    }

    #[test]
    fn test_average_uses_window_radius() {
        let grid = plane_grid();
        let v = PointQuery::new()
            .mode(InterpolationMode::Average)
            .window_radius(2)
            .value(&grid, (5.1, 45.1))
            .unwrap();
        assert!((v - (5.25 + 2.0 * 45.25)).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_windows_structured() {
        let grid = plane_grid();
        let points = vec![PointInput::from((3.0, 44.0)), PointInput::from((6.0, 47.0))];
        let shapes = reduce_windows(&grid, &points, 1, |w| (w.side(), w.center())).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].0, 3);
    }

    #[test]
    fn test_values_rejects_whole_batch() {
        let grid = plane_grid();
        let points = vec![PointInput::from((5.0, 45.0)), PointInput::from((0.3, 45.0))];
        let err = point_values(&grid, &points, InterpolationMode::CubicSpline, None).unwrap_err();
        assert!(matches!(err, SamplerError::OutOfBounds { .. }));
    }
}
