//! Pseudocolor mesh for 2D fields.
//!
//! Each cell is a quad whose corners are inferred from the midpoints of
//! neighbouring cell centers, so nonuniform, unsorted and curvilinear
//! coordinates all draw correctly.
//!
//! # References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::plots::grid::GridCoords;
use crate::render::{draw_line, fill_polygon};
use crate::scale::{ColorScale, Scale};

/// Builder for pseudocolor meshes.
#[derive(Debug, Clone)]
pub struct Mesh {
    values: Vec<f32>,
    grid: GridCoords,
    borders: Option<Rgba>,
}

impl Mesh {
    /// Mesh of row-major `values` over `grid`.
    #[must_use]
    pub fn new(values: Vec<f32>, grid: GridCoords) -> Self {
        Self {
            values,
            grid,
            borders: None,
        }
    }

    /// Outline every cell in `color`.
    #[must_use]
    pub fn borders(mut self, color: Option<Rgba>) -> Self {
        self.borders = color;
        self
    }

    /// Build and validate the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count does not match the grid.
    pub fn build(self) -> Result<Self> {
        let expected = self.grid.rows() * self.grid.cols();
        if self.values.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        Ok(self)
    }

    /// Data extent covered by the cells.
    #[must_use]
    pub fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        self.grid.corner_extent()
    }

    /// Draw every finite cell. NaN cells stay transparent.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&self, axes: &mut Axes, scale: &ColorScale) -> Result<()> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let (cx, cy) = self.grid.corners();
        let stride = cols + 1;
        let corner = |r: usize, c: usize| axes.data_to_px(cx[r * stride + c], cy[r * stride + c]);

        let mut quads: Vec<([Point; 4], Rgba)> = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let value = self.values[r * cols + c];
                if !value.is_finite() {
                    continue;
                }
                let quad = [corner(r, c), corner(r, c + 1), corner(r + 1, c + 1), corner(r + 1, c)];
                quads.push((quad, scale.scale(value)));
            }
        }

        let fb = axes.framebuffer_mut();
        for (quad, color) in &quads {
            fill_polygon(fb, quad, *color);
        }
        if let Some(border) = self.borders {
            for (quad, _) in &quads {
                for i in 0..4 {
                    let (a, b) = (quad[i], quad[(i + 1) % 4]);
                    draw_line(fb, a.x as i32, a.y as i32, b.x as i32, b.y as i32, border);
                }
            }
        }
        Ok(())
    }

    /// Get the number of rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.grid.rows()
    }

    /// Get the number of columns.
    #[must_use]
    pub const fn col_count(&self) -> usize {
        self.grid.cols()
    }

    /// Get the total cell count.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.grid.rows() * self.grid.cols()
    }
}
