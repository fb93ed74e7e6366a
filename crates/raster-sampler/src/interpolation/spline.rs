//! Interpolating B-splines over evenly indexed nodes.
//!
//! Knots follow the usual interpolation layout: clamped at both ends, with
//! interior knots on the data sites for odd degrees (skipping `(k - 1) / 2`
//! sites at each end, i.e. not-a-knot for cubics) and between sites for even
//! degrees. A tensor product of two such splines interpolates a window
//! exactly at every cell centre.

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::error::{Result, SamplerError};

/// Collocation system for one set of nodes and one degree, factored once
/// and reused for every row of a window.
pub struct SplineBasis {
    knots: Vec<f64>,
    degree: usize,
    len: usize,
    lu: LU<f64, Dyn, Dyn>,
}

impl SplineBasis {
    /// Prepare interpolation through `nodes` (strictly increasing).
    ///
    /// The degree is reduced to `nodes.len() - 1` when there are too few
    /// nodes to support it.
    pub fn new(nodes: &[f64], degree: usize) -> Result<Self> {
        let len = nodes.len();
        if len == 0 {
            return Err(SamplerError::InterpolationFailed("no spline nodes".into()));
        }
        if nodes.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SamplerError::InterpolationFailed(
                "spline nodes must be strictly increasing".into(),
            ));
        }

        let degree = degree.min(len - 1);
        let knots = knot_vector(nodes, degree);

        let mut matrix = DMatrix::<f64>::zeros(len, len);
        for (i, &x) in nodes.iter().enumerate() {
            let span = find_span(&knots, len, degree, x);
            for (j, b) in basis_functions(&knots, degree, span, x).into_iter().enumerate() {
                matrix[(i, span - degree + j)] = b;
            }
        }

        let lu = matrix.lu();
        if !lu.is_invertible() {
            return Err(SamplerError::InterpolationFailed(
                "singular collocation matrix".into(),
            ));
        }

        Ok(Self {
            knots,
            degree,
            len,
            lu,
        })
    }

    /// Effective degree after reduction.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Spline coefficients interpolating `values` at the nodes.
    pub fn fit(&self, values: &[f64]) -> Result<DVector<f64>> {
        if values.len() != self.len {
            return Err(SamplerError::DimensionMismatch {
                expected: (1, self.len),
                actual: (1, values.len()),
            });
        }
        self.lu
            .solve(&DVector::from_column_slice(values))
            .ok_or_else(|| SamplerError::InterpolationFailed("collocation solve failed".into()))
    }

    /// Evaluate the spline with `coeffs` at `x`.
    pub fn eval(&self, coeffs: &DVector<f64>, x: f64) -> f64 {
        let span = find_span(&self.knots, self.len, self.degree, x);
        basis_functions(&self.knots, self.degree, span, x)
            .into_iter()
            .enumerate()
            .map(|(j, b)| b * coeffs[span - self.degree + j])
            .sum()
    }

    /// Fit and evaluate in one step.
    pub fn interpolate(&self, values: &[f64], x: f64) -> Result<f64> {
        let coeffs = self.fit(values)?;
        Ok(self.eval(&coeffs, x))
    }
}

fn knot_vector(nodes: &[f64], degree: usize) -> Vec<f64> {
    let n = nodes.len();
    let first = nodes[0];
    let last = nodes[n - 1];
    let interior = n - degree - 1;

    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat(first).take(degree + 1));
    for j in 0..interior {
        let knot = if degree % 2 == 1 {
            nodes[j + (degree + 1) / 2]
        } else {
            let i = j + degree / 2;
            (nodes[i] + nodes[i + 1]) / 2.0
        };
        knots.push(knot);
    }
    knots.extend(std::iter::repeat(last).take(degree + 1));
    knots
}

/// Index `s` in `[degree, len - 1]` with `knots[s] <= x < knots[s + 1]`,
/// clamped at both ends.
fn find_span(knots: &[f64], len: usize, degree: usize, x: f64) -> usize {
    if x >= knots[len] {
        return len - 1;
    }
    if x <= knots[degree] {
        return degree;
    }
    let mut span = degree;
    while span + 1 < len && x >= knots[span + 1] {
        span += 1;
    }
    span
}

/// Non-zero basis functions `B_{span - degree ..= span}` at `x` (Cox-de Boor).
fn basis_functions(knots: &[f64], degree: usize, span: usize, x: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(radius: i32) -> Vec<f64> {
        (-radius..=radius).map(f64::from).collect()
    }

    #[test]
    fn test_knot_layout() {
        assert_eq!(
            knot_vector(&nodes(2), 1),
            vec![-2.0, -2.0, -1.0, 0.0, 1.0, 2.0, 2.0]
        );
        let cubic = knot_vector(&nodes(4), 3);
        assert_eq!(cubic.len(), 13);
        assert_eq!(&cubic[4..9], &[-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_partition_of_unity() {
        let x = nodes(4);
        let knots = knot_vector(&x, 3);
        for &t in &[-4.0, -3.3, -0.5, 0.0, 0.25, 3.9, 4.0] {
            let span = find_span(&knots, x.len(), 3, t);
            let sum: f64 = basis_functions(&knots, 3, span, t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at {} = {}", t, sum);
        }
    }

    #[test]
    fn test_linear_spline_is_piecewise_linear() {
        let basis = SplineBasis::new(&nodes(2), 1).unwrap();
        let values = [4.0, 1.0, 3.0, 7.0, 0.0];
        assert!((basis.interpolate(&values, 0.0).unwrap() - 3.0).abs() < 1e-12);
        assert!((basis.interpolate(&values, 0.25).unwrap() - 4.0).abs() < 1e-12);
        assert!((basis.interpolate(&values, -0.5).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_spline_reproduces_cubic() {
        let x = nodes(4);
        let basis = SplineBasis::new(&x, 3).unwrap();
        let f = |t: f64| 0.5 * t * t * t - t * t + 2.0 * t - 3.0;
        let values: Vec<f64> = x.iter().map(|&t| f(t)).collect();
        let coeffs = basis.fit(&values).unwrap();
        for &t in &[-0.5, -0.2, 0.0, 0.3, 0.5, 3.7] {
            assert!((basis.eval(&coeffs, t) - f(t)).abs() < 1e-9, "at {}", t);
        }
    }

    #[test]
    fn test_interpolates_nodes_exactly() {
        let x = nodes(4);
        let basis = SplineBasis::new(&x, 3).unwrap();
        let values = [3.0, -1.0, 4.0, 1.0, -5.0, 9.0, 2.0, -6.0, 5.0];
        let coeffs = basis.fit(&values).unwrap();
        for (t, v) in x.iter().zip(values) {
            assert!((basis.eval(&coeffs, *t) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degree_reduced_for_small_windows() {
        assert_eq!(SplineBasis::new(&nodes(1), 3).unwrap().degree(), 2);
        assert_eq!(SplineBasis::new(&nodes(0), 3).unwrap().degree(), 0);
        let constant = SplineBasis::new(&nodes(0), 1).unwrap();
        assert_eq!(constant.interpolate(&[42.0], 0.3).unwrap(), 42.0);
    }

    #[test]
    fn test_fit_rejects_wrong_length() {
        let basis = SplineBasis::new(&nodes(2), 1).unwrap();
        assert!(matches!(
            basis.fit(&[1.0, 2.0]),
            Err(SamplerError::DimensionMismatch { .. })
        ));
    }
}
