//! Line plots over one dimension.
//!
//! Each series is a polyline through `(x, y)` pairs. A non-finite value
//! breaks the line, so missing data shows as a gap instead of a bridge.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::render::{draw_circle, draw_line_aa, draw_thick_line};

// ============================================================================
// Line Series
// ============================================================================

/// A data series for line plots.
#[derive(Debug, Clone)]
pub struct LineSeries {
    /// Series name (hue value).
    pub name: String,
    /// X-axis data.
    pub x_data: Vec<f64>,
    /// Y-axis data.
    pub y_data: Vec<f64>,
    /// Line color.
    pub color: Rgba,
    /// Line thickness.
    pub thickness: f32,
}

impl LineSeries {
    /// Create a new line series.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x_data: Vec::new(),
            y_data: Vec::new(),
            color: Rgba::rgb(31, 119, 180),
            thickness: 1.5,
        }
    }

    /// Set the x and y data.
    #[must_use]
    pub fn data(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.x_data = x;
        self.y_data = y;
        self
    }

    /// Set the line color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the line thickness.
    #[must_use]
    pub fn thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(0.5);
        self
    }

    /// Get the number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.x_data.len().min(self.y_data.len())
    }

    /// Runs of consecutive finite points.
    #[must_use]
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (&x, &y) in self.x_data.iter().zip(&self.y_data) {
            if x.is_finite() && y.is_finite() {
                current.push((x, y));
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

// ============================================================================
// Line Plot
// ============================================================================

/// Builder for line plots.
#[derive(Debug, Clone, Default)]
pub struct LinePlot {
    series: Vec<LineSeries>,
    show_markers: bool,
    marker_size: f32,
}

impl LinePlot {
    /// Create a new line plot builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            show_markers: false,
            marker_size: 4.0,
        }
    }

    /// Add a data series.
    #[must_use]
    pub fn add_series(mut self, series: LineSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Enable or disable data point markers.
    #[must_use]
    pub fn markers(mut self, show: bool) -> Self {
        self.show_markers = show;
        self
    }

    /// Set the marker size.
    #[must_use]
    pub fn marker_size(mut self, size: f32) -> Self {
        self.marker_size = size.max(1.0);
        self
    }

    /// Build and validate the line plot.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no series or a series has mismatched
    /// x and y lengths.
    pub fn build(self) -> Result<Self> {
        if self.series.is_empty() {
            return Err(Error::EmptyData);
        }
        for series in &self.series {
            if series.x_data.len() != series.y_data.len() {
                return Err(Error::DataLengthMismatch {
                    expected: series.x_data.len(),
                    actual: series.y_data.len(),
                });
            }
        }
        Ok(self)
    }

    /// Extent of the finite points across all series, or `None` if there
    /// are none.
    #[must_use]
    pub fn data_extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        let mut any = false;

        for (px, py) in self.series.iter().flat_map(LineSeries::segments).flatten() {
            any = true;
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        any.then_some((x, y))
    }

    /// Draw every series into `axes` using its current data ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&self, axes: &mut Axes) -> Result<()> {
        for series in &self.series {
            for run in series.segments() {
                let points: Vec<Point> = run.iter().map(|&(x, y)| axes.data_to_px(x, y)).collect();
                let fb = axes.framebuffer_mut();

                for pair in points.windows(2) {
                    if series.thickness > 1.0 {
                        draw_thick_line(fb, pair[0], pair[1], series.thickness, series.color);
                    } else {
                        draw_line_aa(fb, pair[0].x, pair[0].y, pair[1].x, pair[1].y, series.color);
                    }
                }

                // A lone finite point between gaps would otherwise vanish.
                if self.show_markers || points.len() == 1 {
                    let radius = (self.marker_size / 2.0).round() as i32;
                    for p in &points {
                        draw_circle(fb, p.x.round() as i32, p.y.round() as i32, radius, series.color);
                    }
                }
            }
        }
        Ok(())
    }

    /// Get the total number of points across all series.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.series.iter().map(LineSeries::point_count).sum()
    }

    /// Get the number of series.
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// The series.
    #[must_use]
    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }
}

// ============================================================================
// Tests
// ============================================================================
