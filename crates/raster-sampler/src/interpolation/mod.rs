//! Reduction of a sampled window to a single value.
//!
//! Nearest and average ignore the sub-pixel offset. The spline modes fit a
//! tensor-product interpolating spline over the window's integer node grid
//! (`-radius..=radius` on both axes, centred on the located cell) and
//! evaluate it at the offset. Windows smaller than a spline degree needs
//! get the highest degree they can support.

mod spline;

pub use spline::SplineBasis;

use crate::error::{Result, SamplerError};
use crate::types::{InterpolationMode, SubPixelOffset};
use crate::window::Window;

/// Caller-supplied reduction for [`InterpolationMode::Custom`].
pub type Reducer<'a> = dyn Fn(&Window) -> f64 + Send + Sync + 'a;

/// Reduce `window` to a value using `mode`.
///
/// `reducer` is only consulted in custom mode, where it is required.
pub fn interpolate(
    window: &Window,
    offset: SubPixelOffset,
    mode: InterpolationMode,
    reducer: Option<&Reducer<'_>>,
) -> Result<f64> {
    match mode {
        InterpolationMode::Nearest => Ok(window.center()),
        InterpolationMode::LinearSpline => spline_at(window, offset, 1),
        InterpolationMode::CubicSpline => spline_at(window, offset, 3),
        InterpolationMode::Average => Ok(window.mean()),
        InterpolationMode::Custom => {
            let reducer = reducer.ok_or(SamplerError::MissingReducer)?;
            Ok(reducer(window))
        }
    }
}

/// Evaluate a degree-`degree` tensor-product spline through `window` at `offset`.
///
/// Each row is interpolated at `dx`, then the resulting column at `dy`.
pub fn spline_at(window: &Window, offset: SubPixelOffset, degree: usize) -> Result<f64> {
    let radius = window.radius() as i64;
    let nodes: Vec<f64> = (-radius..=radius).map(|n| n as f64).collect();
    let basis = SplineBasis::new(&nodes, degree)?;

    let column = window
        .rows()
        .map(|row| basis.interpolate(row, offset.dx))
        .collect::<Result<Vec<f64>>>()?;

    basis.interpolate(&column, offset.dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Window of radius `r` holding `f(col_offset, row_offset)`.
    fn window_from<F: Fn(f64, f64) -> f64>(r: usize, f: F) -> Window {
        let r = r as i64;
        let data = (-r..=r)
            .flat_map(|row| (-r..=r).map(move |col| (col as f64, row as f64)))
            .map(|(c, rw)| f(c, rw))
            .collect();
        Window::new(data, r as usize).unwrap()
    }

    #[test]
    fn test_nearest_and_average_ignore_offset() {
        let window = Window::new((1..=9).map(f64::from).collect(), 1).unwrap();
        let offset = SubPixelOffset::new(0.4, -0.3);
        assert_eq!(interpolate(&window, offset, InterpolationMode::Nearest, None).unwrap(), 5.0);
        assert_eq!(interpolate(&window, offset, InterpolationMode::Average, None).unwrap(), 5.0);
    }

    #[test]
    fn test_custom_requires_reducer() {
        let window = Window::new(vec![1.0, 2.0, 3.0, 4.0, 9.0, 6.0, 7.0, 8.0, 5.0], 1).unwrap();
        assert_eq!(
            interpolate(&window, SubPixelOffset::default(), InterpolationMode::Custom, None),
            Err(SamplerError::MissingReducer)
        );

        let max: &Reducer = &|w: &Window| w.values().iter().copied().fold(f64::MIN, f64::max);
        let value = interpolate(&window, SubPixelOffset::default(), InterpolationMode::Custom, Some(max)).unwrap();
        assert_eq!(value, 9.0);
    }

    #[test]
    fn test_linear_spline_reproduces_plane() {
        let plane = |x: f64, y: f64| 3.0 * x - 2.0 * y + 7.0;
        let window = window_from(2, plane);
        for &(dx, dy) in &[(0.0, 0.0), (0.5, -0.5), (-0.25, 0.4), (0.1, 0.3)] {
            let v = interpolate(&window, SubPixelOffset::new(dx, dy), InterpolationMode::LinearSpline, None).unwrap();
            assert!((v - plane(dx, dy)).abs() < 1e-10, "at ({}, {}): {}", dx, dy, v);
        }
    }

    #[test]
    fn test_cubic_spline_reproduces_cubic_surface() {
        let surface = |x: f64, y: f64| x * x * x - 2.0 * x * y + y * y + 0.5;
        let window = window_from(4, surface);
        for &(dx, dy) in &[(0.0, 0.0), (0.5, 0.5), (-0.3, 0.2), (0.45, -0.15)] {
            let v = interpolate(&window, SubPixelOffset::new(dx, dy), InterpolationMode::CubicSpline, None).unwrap();
            assert!((v - surface(dx, dy)).abs() < 1e-9, "at ({}, {}): {}", dx, dy, v);
        }
    }

    #[test]
    fn test_spline_hits_center_exactly() {
        let window = window_from(2, |x, y| (x * 1.7 + y).sin());
        let v = interpolate(&window, SubPixelOffset::default(), InterpolationMode::CubicSpline, None).unwrap();
        assert!((v - window.center()).abs() < 1e-12);
    }

    #[test]
    fn test_spline_on_single_cell_window() {
        let window = Window::new(vec![4.0], 0).unwrap();
        let v = interpolate(&window, SubPixelOffset::new(0.3, 0.3), InterpolationMode::LinearSpline, None).unwrap();
        assert_eq!(v, 4.0);
    }
}
