//! Contour lines and filled contours.
//!
//! Lines are traced with marching squares in index space and mapped through
//! the grid, so curvilinear coordinates bend the contours with the grid.
//! Filled contours subdivide each cell and color every sub-cell by the level
//! bin its bilinear value falls in.
//!
//! # References
//!
//! - Lorensen, W. E., & Cline, H. E. (1987). "Marching Cubes: A High
//!   Resolution 3D Surface Construction Algorithm." SIGGRAPH '87.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::colormap::ColormapKind;
use crate::dispatch::PlotKind;
use crate::error::{Error, Result};
use crate::geometry::Line;
use crate::plots::grid::GridCoords;
use crate::render::{fill_polygon, Drawable};
use crate::scale::{ColorScale, Scale};

/// Sub-cells per cell edge for filled contours.
const DEFAULT_SUBDIVISIONS: usize = 4;

/// Bins used when the scale carries no levels.
const FALLBACK_LEVELS: usize = 7;

/// A segment between two fractional `(row, col)` positions.
pub type IndexSegment = ((f64, f64), (f64, f64));

/// Builder for contour plots.
#[derive(Debug, Clone)]
pub struct Contour {
    values: Vec<f32>,
    grid: GridCoords,
    filled: bool,
    subdivisions: usize,
}

impl Contour {
    /// Iso-lines over `grid`.
    #[must_use]
    pub fn lines(values: Vec<f32>, grid: GridCoords) -> Self {
        Self {
            values,
            grid,
            filled: false,
            subdivisions: DEFAULT_SUBDIVISIONS,
        }
    }

    /// Filled regions over `grid`.
    #[must_use]
    pub fn filled(values: Vec<f32>, grid: GridCoords) -> Self {
        Self {
            filled: true,
            ..Self::lines(values, grid)
        }
    }

    /// Sub-cells per cell edge for filled contours.
    #[must_use]
    pub fn subdivisions(mut self, n: usize) -> Self {
        self.subdivisions = n.max(1);
        self
    }

    fn kind(&self) -> PlotKind {
        if self.filled {
            PlotKind::FilledContour
        } else {
            PlotKind::Contour
        }
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count does not match the grid or either
    /// axis has fewer than two points.
    pub fn build(self) -> Result<Self> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        if self.values.len() != rows * cols {
            return Err(Error::DataLengthMismatch {
                expected: rows * cols,
                actual: self.values.len(),
            });
        }
        if rows < 2 || cols < 2 {
            return Err(Error::shape(
                self.kind(),
                2,
                format!("needs at least 2 points per axis, got {rows}x{cols}"),
            ));
        }
        Ok(self)
    }

    /// Data extent of the grid (contours do not extend past the centers).
    #[must_use]
    pub fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        self.grid.center_extent()
    }

    fn value(&self, r: usize, c: usize) -> f32 {
        self.values[r * self.grid.cols() + c]
    }

    /// Marching-squares segments for one level, in fractional index space.
    #[must_use]
    pub fn iso_segments(&self, level: f32) -> Vec<IndexSegment> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let mut segments = Vec::new();

        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols.saturating_sub(1) {
                let corners = [(r, c), (r, c + 1), (r + 1, c + 1), (r + 1, c)];
                let v = corners.map(|(rr, cc)| self.value(rr, cc));
                if v.iter().any(|x| !x.is_finite()) {
                    continue;
                }

                let case = v
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &x)| acc | (u8::from(x >= level) << i));

                // Point where the level crosses edge `e` (corner e to e+1).
                let cross = |e: usize| {
                    let (a, b) = (e, (e + 1) % 4);
                    let (va, vb) = (v[a], v[b]);
                    let t = if (vb - va).abs() < f32::EPSILON {
                        0.5
                    } else {
                        f64::from((level - va) / (vb - va))
                    };
                    let (ra, ca) = corners[a];
                    let (rb, cb) = corners[b];
                    (
                        ra as f64 + t * (rb as f64 - ra as f64),
                        ca as f64 + t * (cb as f64 - ca as f64),
                    )
                };
                let center_high = v.iter().sum::<f32>() / 4.0 >= level;

                let pairs: &[(usize, usize)] = match case {
                    1 | 14 => &[(3, 0)],
                    2 | 13 => &[(0, 1)],
                    3 | 12 => &[(3, 1)],
                    4 | 11 => &[(1, 2)],
                    6 | 9 => &[(0, 2)],
                    7 | 8 => &[(3, 2)],
                    5 if center_high => &[(0, 1), (2, 3)],
                    5 => &[(3, 0), (1, 2)],
                    10 if center_high => &[(3, 0), (1, 2)],
                    10 => &[(0, 1), (2, 3)],
                    _ => &[],
                };
                segments.extend(pairs.iter().map(|&(a, b)| (cross(a), cross(b))));
            }
        }
        segments
    }

    /// Draw into `axes` with the level edges of `scale`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&self, axes: &mut Axes, scale: &ColorScale) -> Result<()> {
        if self.filled {
            self.render_filled(axes, scale);
        } else {
            self.render_lines(axes, scale);
        }
        Ok(())
    }

    fn levels(scale: &ColorScale) -> Vec<f32> {
        scale.levels().map_or_else(
            || {
                let step = (scale.vmax() - scale.vmin()) / FALLBACK_LEVELS as f32;
                (0..=FALLBACK_LEVELS)
                    .map(|i| scale.vmin() + step * i as f32)
                    .collect()
            },
            <[f32]>::to_vec,
        )
    }

    fn line_color(scale: &ColorScale, index: usize, level: f32) -> Rgba {
        let cmap = scale.colormap();
        if cmap.kind() == ColormapKind::Listed {
            let stops = cmap.stops();
            return stops[index % stops.len()];
        }
        cmap.sample(scale.normalize(level))
    }

    fn render_lines(&self, axes: &mut Axes, scale: &ColorScale) {
        for (i, level) in Self::levels(scale).into_iter().enumerate() {
            let color = Self::line_color(scale, i, level);
            let lines: Vec<Line> = self
                .iso_segments(level)
                .into_iter()
                .map(|((r0, c0), (r1, c1))| {
                    let (x0, y0) = self.grid.at(r0, c0);
                    let (x1, y1) = self.grid.at(r1, c1);
                    Line::new(axes.data_to_px(x0, y0), axes.data_to_px(x1, y1))
                })
                .collect();
            let fb = axes.framebuffer_mut();
            for line in &lines {
                line.draw_aa(fb, color);
            }
        }
    }

    fn render_filled(&self, axes: &mut Axes, scale: &ColorScale) {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let n = self.subdivisions;
        let step = 1.0 / n as f64;
        let mut quads = Vec::new();

        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols.saturating_sub(1) {
                let v = [
                    self.value(r, c),
                    self.value(r, c + 1),
                    self.value(r + 1, c),
                    self.value(r + 1, c + 1),
                ];
                if v.iter().any(|x| !x.is_finite()) {
                    continue;
                }

                for i in 0..n {
                    for j in 0..n {
                        let fr = (i as f64 + 0.5) * step;
                        let fc = (j as f64 + 0.5) * step;
                        let top = f64::from(v[0]) * (1.0 - fc) + f64::from(v[1]) * fc;
                        let bottom = f64::from(v[2]) * (1.0 - fc) + f64::from(v[3]) * fc;
                        let value = (top * (1.0 - fr) + bottom * fr) as f32;

                        let (r0, c0) = (r as f64 + i as f64 * step, c as f64 + j as f64 * step);
                        let corner = |dr: f64, dc: f64| {
                            let (x, y) = self.grid.at(r0 + dr, c0 + dc);
                            axes.data_to_px(x, y)
                        };
                        let quad = [corner(0.0, 0.0), corner(0.0, step), corner(step, step), corner(step, 0.0)];
                        quads.push((quad, scale.scale(value)));
                    }
                }
            }
        }

        let fb = axes.framebuffer_mut();
        for (quad, color) in &quads {
            fill_polygon(fb, quad, *color);
        }
    }
}
