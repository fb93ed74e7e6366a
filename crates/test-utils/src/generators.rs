//! Synthetic grid values with predictable patterns.
//!
//! Every generator returns a `Vec<f64>` in row-major order, row 0 first.
//! Whether row 0 is the top or the bottom of a raster is up to the caller.

/// Creates a grid whose values encode their own position.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly by
/// checking that `grid[row * width + col] == col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);  // col=1, row=0
/// assert_eq!(grid[10], 1.0);    // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a grid that is an exact plane in index space:
/// `a * col + b * row + c`.
pub fn create_planar_grid(width: usize, height: usize, a: f64, b: f64, c: f64) -> Vec<f64> {
    create_grid_with(width, height, |col, row| a * col as f64 + b * row as f64 + c)
}

/// Creates a ramp increasing by one per column: `v[row, col] = col`.
pub fn create_ramp_grid(width: usize, height: usize) -> Vec<f64> {
    create_grid_with(width, height, |col, _| col as f64)
}

/// Creates a smooth, non-polynomial terrain-like surface.
///
/// Values stay within 140 to 340.
pub fn create_terrain_grid(width: usize, height: usize) -> Vec<f64> {
    create_grid_with(width, height, |col, row| {
        let x = col as f64 / width.max(1) as f64;
        let y = row as f64 / height.max(1) as f64;
        200.0 + 60.0 * (x * 5.0).sin() * (y * 3.0).cos() + 40.0 * (x + y)
    })
}

/// Creates a grid with every cell set to `value`.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a grid from `f(col, row)`.
pub fn create_grid_with<F>(width: usize, height: usize, f: F) -> Vec<f64>
where
    F: Fn(usize, usize) -> f64,
{
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(f(col, row));
        }
    }
    data
}

/// Reverses the row order of a row-major grid.
pub fn flip_rows(data: &[f64], width: usize) -> Vec<f64> {
    data.chunks_exact(width).rev().flatten().copied().collect()
}
