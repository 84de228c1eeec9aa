//! Numeric helpers over finite data and coordinates.
//!
//! Extents, percentiles, coordinate regularity checks, cell-edge inference
//! and tick placement.

use trueno::Vector;

/// Lower percentile of robust color limits; the upper is `100 - ROBUST_PERCENTILE`.
pub const ROBUST_PERCENTILE: f32 = 2.0;

/// Min and max of the finite values, or `None` if there are none.
///
/// The reduction runs through trueno's SIMD kernels.
#[must_use]
pub fn finite_extent(values: &[f32]) -> Option<(f32, f32)> {
    let finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let vec = Vector::from_vec(finite);
    let min = vec.min().unwrap_or(f32::NAN);
    let max = vec.max().unwrap_or(f32::NAN);
    if min.is_nan() || max.is_nan() {
        // Scalar fallback if the backend refuses the reduction.
        let slice = vec.as_slice();
        let min = slice.iter().copied().fold(f32::INFINITY, f32::min);
        let max = slice.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        return Some((min, max));
    }
    Some((min, max))
}

/// Percentile `q` (0-100) of the finite values with linear interpolation
/// between order statistics. `None` if there are no finite values.
#[must_use]
pub fn percentile(values: &[f32], q: f32) -> Option<f32> {
    let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f32::total_cmp);

    let q = q.clamp(0.0, 100.0);
    let rank = f64::from(q) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    let value = f64::from(sorted[lo]) + (f64::from(sorted[hi]) - f64::from(sorted[lo])) * frac;
    Some(value as f32)
}

/// Whether consecutive differences are equal within a relative tolerance.
///
/// Sequences shorter than three are trivially evenly spaced.
#[must_use]
pub fn is_evenly_spaced(values: &[f64]) -> bool {
    if values.len() < 3 {
        return true;
    }
    let step = values[1] - values[0];
    if step == 0.0 || !step.is_finite() {
        return false;
    }
    let tolerance = 1e-6 * step.abs().max(f64::EPSILON);
    values
        .windows(2)
        .all(|w| ((w[1] - w[0]) - step).abs() <= tolerance.max(1e-9 * w[1].abs()))
}

/// Cell edges for coordinate centers: midpoints between neighbours, with the
/// first and last edge extrapolated by half a step.
///
/// A single center gets a unit-wide cell.
#[must_use]
pub fn interval_breaks(centers: &[f64]) -> Vec<f64> {
    match centers.len() {
        0 => Vec::new(),
        1 => vec![centers[0] - 0.5, centers[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
            for w in centers.windows(2) {
                edges.push(0.5 * (w[0] + w[1]));
            }
            edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
            edges
        }
    }
}

/// Cell-corner grid for a 2D curvilinear coordinate of shape `(rows, cols)`.
///
/// Breaks are inferred along columns first, then along rows, giving
/// `(rows + 1) * (cols + 1)` corners in row-major order.
#[must_use]
pub fn interval_breaks_2d(values: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut widened = Vec::with_capacity(rows * (cols + 1));
    for r in 0..rows {
        widened.extend(interval_breaks(&values[r * cols..(r + 1) * cols]));
    }

    let out_cols = cols + 1;
    let mut corners = vec![0.0; (rows + 1) * out_cols];
    let mut column = Vec::with_capacity(rows);
    for c in 0..out_cols {
        column.clear();
        column.extend((0..rows).map(|r| widened[r * out_cols + c]));
        for (r, edge) in interval_breaks(&column).into_iter().enumerate() {
            corners[r * out_cols + c] = edge;
        }
    }
    corners
}

/// "Nice" tick positions covering `[min, max]` with roughly `target` ticks.
///
/// Steps are 1, 2 or 5 times a power of ten.
#[must_use]
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || target == 0 {
        return Vec::new();
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if (hi - lo).abs() < f64::EPSILON {
        return vec![lo];
    }

    let raw_step = (hi - lo) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let step = magnitude
        * if residual < 1.5 {
            1.0
        } else if residual < 3.0 {
            2.0
        } else if residual < 7.0 {
            5.0
        } else {
            10.0
        };

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}
