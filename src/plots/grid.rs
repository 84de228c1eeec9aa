//! Cell-center coordinates of a 2D field.
//!
//! Rectilinear grids (1D x and y) and curvilinear grids (2D x and y) share
//! one representation: x and y of every cell center, row-major.

use crate::error::{Error, Result};
use crate::stats::interval_breaks_2d;

/// x/y positions of the cell centers of a `rows` x `cols` field.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoords {
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl GridCoords {
    /// Curvilinear grid from full 2D center arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if either array does not hold `rows * cols` values.
    pub fn new(rows: usize, cols: usize, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        for values in [&x, &y] {
            if values.len() != rows * cols {
                return Err(Error::DataLengthMismatch {
                    expected: rows * cols,
                    actual: values.len(),
                });
            }
        }
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                width: cols as u32,
                height: rows as u32,
            });
        }
        Ok(Self { rows, cols, x, y })
    }

    /// Rectilinear grid: `x` varies along columns, `y` along rows.
    ///
    /// # Errors
    ///
    /// Returns an error if either slice is empty.
    pub fn rectilinear(x: &[f64], y: &[f64]) -> Result<Self> {
        let (rows, cols) = (y.len(), x.len());
        let xs = (0..rows).flat_map(|_| x.iter().copied()).collect();
        let ys = y.iter().flat_map(|&v| std::iter::repeat(v).take(cols)).collect();
        Self::new(rows, cols, xs, ys)
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Center x values, row-major.
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Center y values, row-major.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Bilinear position at fractional index `(row, col)`.
    #[must_use]
    pub fn at(&self, row: f64, col: f64) -> (f64, f64) {
        let r0 = (row.floor().max(0.0) as usize).min(self.rows - 1);
        let c0 = (col.floor().max(0.0) as usize).min(self.cols - 1);
        let r1 = (r0 + 1).min(self.rows - 1);
        let c1 = (c0 + 1).min(self.cols - 1);
        let fr = (row - r0 as f64).clamp(0.0, 1.0);
        let fc = (col - c0 as f64).clamp(0.0, 1.0);

        let blend = |v: &[f64]| {
            let top = v[r0 * self.cols + c0] * (1.0 - fc) + v[r0 * self.cols + c1] * fc;
            let bottom = v[r1 * self.cols + c0] * (1.0 - fc) + v[r1 * self.cols + c1] * fc;
            top * (1.0 - fr) + bottom * fr
        };
        (blend(&self.x), blend(&self.y))
    }

    /// Cell corners, `(rows + 1) * (cols + 1)` each, inferred from center
    /// midpoints.
    #[must_use]
    pub fn corners(&self) -> (Vec<f64>, Vec<f64>) {
        (
            interval_breaks_2d(&self.x, self.rows, self.cols),
            interval_breaks_2d(&self.y, self.rows, self.cols),
        )
    }

    /// Finite extent of the centers.
    #[must_use]
    pub fn center_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        Some((extent(&self.x)?, extent(&self.y)?))
    }

    /// Finite extent of the cell corners.
    #[must_use]
    pub fn corner_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let (x, y) = self.corners();
        Some((extent(&x)?, extent(&y)?))
    }
}

pub(crate) fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectilinear_layout() {
        let grid = GridCoords::rectilinear(&[0.0, 1.0, 2.0], &[10.0, 20.0]).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.x(), &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(grid.y(), &[10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn test_bilinear() {
        let grid = GridCoords::rectilinear(&[0.0, 2.0], &[0.0, 10.0]).unwrap();
        assert_eq!(grid.at(0.5, 0.5), (1.0, 5.0));
        assert_eq!(grid.at(1.0, 1.0), (2.0, 10.0));
    }

    #[test]
    fn test_corners_extend_half_step() {
        let grid = GridCoords::rectilinear(&[0.0, 1.0, 2.0], &[0.0, 10.0]).unwrap();
        let ((x0, x1), (y0, y1)) = grid.corner_extent().unwrap();
        assert_eq!((x0, x1), (-0.5, 2.5));
        assert_eq!((y0, y1), (-5.0, 15.0));
        assert_eq!(grid.center_extent(), Some(((0.0, 2.0), (0.0, 10.0))));
    }

    #[test]
    fn test_validation() {
        assert!(GridCoords::new(2, 2, vec![0.0; 3], vec![0.0; 4]).is_err());
        assert!(GridCoords::rectilinear(&[], &[1.0]).is_err());
    }
}
