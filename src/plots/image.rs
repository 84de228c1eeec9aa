//! Raster image of a 2D field over evenly spaced coordinates.
//!
//! Every pixel of the plot area is mapped back to data space and takes the
//! color of the nearest cell, so the image stays sharp at any zoom.

use crate::axes::Axes;
use crate::error::{Error, Result};
use crate::scale::{ColorScale, Scale};
use crate::stats::is_evenly_spaced;

/// One evenly spaced axis: first center and signed step.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RegularAxis {
    start: f64,
    step: f64,
    len: usize,
}

impl RegularAxis {
    fn new(centers: &[f64]) -> Option<Self> {
        let start = *centers.first()?;
        let step = match centers {
            [a, b, ..] => b - a,
            _ => 1.0,
        };
        (start.is_finite() && step.is_finite() && step != 0.0).then_some(Self {
            start,
            step,
            len: centers.len(),
        })
    }

    /// Nearest center index of `value`, or `None` outside the edges.
    fn index(&self, value: f64) -> Option<usize> {
        let i = ((value - self.start) / self.step).round();
        (i >= 0.0 && i < self.len as f64).then_some(i as usize)
    }

    fn edges(&self) -> (f64, f64) {
        let last = self.start + self.step * (self.len - 1) as f64;
        let half = self.step.abs() / 2.0;
        (self.start.min(last) - half, self.start.max(last) + half)
    }
}

/// Builder for raster images.
#[derive(Debug, Clone)]
pub struct Image {
    values: Vec<f32>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Image {
    /// Image of row-major `values` with `x` along columns and `y` along rows.
    #[must_use]
    pub fn new(values: Vec<f32>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { values, x, y }
    }

    /// Build and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count does not match the coordinates or
    /// either coordinate is not evenly spaced.
    pub fn build(self) -> Result<Self> {
        let expected = self.x.len() * self.y.len();
        if self.values.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: self.values.len(),
            });
        }
        for (name, coord) in [("x", &self.x), ("y", &self.y)] {
            if RegularAxis::new(coord).is_none() || !is_evenly_spaced(coord) {
                return Err(Error::ScaleDomain(format!(
                    "image {name} coordinate must be finite and evenly spaced"
                )));
            }
        }
        Ok(self)
    }

    /// Data extent covered by the pixels' cells.
    #[must_use]
    pub fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let x = RegularAxis::new(&self.x)?.edges();
        let y = RegularAxis::new(&self.y)?.edges();
        Some((x, y))
    }

    /// Paint the plot area pixel by pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are not regular.
    pub fn render(&self, axes: &mut Axes, scale: &ColorScale) -> Result<()> {
        let (Some(xs), Some(ys)) = (RegularAxis::new(&self.x), RegularAxis::new(&self.y)) else {
            return Err(Error::ScaleDomain("image coordinates are empty".to_string()));
        };

        let area = axes.plot_area();
        let (x0, y0) = (area.x as u32, area.y as u32);
        let (w, h) = (area.width as u32, area.height as u32);

        let mut pixels = Vec::with_capacity((w * h) as usize);
        for py in y0..y0 + h {
            for px in x0..x0 + w {
                let (dx, dy) = axes.px_to_data(px as f32 + 0.5, py as f32 + 0.5);
                let (Some(c), Some(r)) = (xs.index(dx), ys.index(dy)) else {
                    continue;
                };
                let value = self.values[r * xs.len + c];
                if value.is_finite() {
                    pixels.push((px, py, scale.scale(value)));
                }
            }
        }

        let fb = axes.framebuffer_mut();
        for (px, py, color) in pixels {
            fb.set_pixel(px, py, color);
        }
        Ok(())
    }
}
