//! Composed figures: a grid of axes plus an optional shared colorbar.
//!
//! The raster is assembled on demand: every axes framebuffer is blitted
//! into place and the colorbar is painted to the right. Text stays out of
//! the raster and is emitted as SVG `<text>` elements.

use std::path::Path;
use std::sync::Arc;

use crate::axes::{format_tick, numeric_ticks, Axes, Tick};
use crate::color::Rgba;
use crate::error::Result;
use crate::facet::FacetKey;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::output::{PngEncoder, SvgEncoder, TextAnchor, TextLabel};
use crate::render::{draw_rect_outline, fill_polygon};
use crate::scale::{ColorScale, Scale};

/// Width reserved right of the grid for the colorbar and its labels.
const COLORBAR_STRIP: u32 = 84;
const BAR_OFFSET: u32 = 14;
const BAR_WIDTH: u32 = 16;
const BAR_MARGIN: u32 = 28;
const CAP_HEIGHT: f32 = 10.0;
const TICK_FONT: f32 = 10.0;
const LABEL_FONT: f32 = 11.0;

/// Up to this many level edges are used as colorbar ticks directly.
const MAX_EDGE_TICKS: usize = 11;

/// A grid of axes.
#[derive(Debug, Clone)]
pub struct Figure {
    nrows: usize,
    ncols: usize,
    cells: Vec<Option<Axes>>,
    keys: Vec<Option<FacetKey>>,
    color_scale: Option<Arc<ColorScale>>,
    colorbar_label: Option<String>,
}

impl Figure {
    pub(crate) fn new(
        nrows: usize,
        ncols: usize,
        cells: Vec<Option<Axes>>,
        keys: Vec<Option<FacetKey>>,
        color_scale: Option<Arc<ColorScale>>,
        colorbar_label: Option<String>,
    ) -> Self {
        Self {
            nrows,
            ncols,
            cells,
            keys,
            color_scale,
            colorbar_label,
        }
    }

    /// Wrap a single axes; its colorbar, if any, becomes the figure's.
    #[must_use]
    pub fn from_axes(axes: Axes) -> Self {
        let color_scale = axes.colorbar().cloned();
        let colorbar_label = axes.colorbar_label().map(str::to_string);
        Self::new(1, 1, vec![Some(axes)], vec![None], color_scale, colorbar_label)
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// The axes at `(row, col)`, `None` for unused cells.
    #[must_use]
    pub fn axes(&self, row: usize, col: usize) -> Option<&Axes> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells[row * self.ncols + col].as_ref()
    }

    /// Mutable access to the axes at `(row, col)`.
    pub fn axes_mut(&mut self, row: usize, col: usize) -> Option<&mut Axes> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.cells[row * self.ncols + col].as_mut()
    }

    /// Coordinate values that selected cell `(row, col)`.
    #[must_use]
    pub fn name_dict(&self, row: usize, col: usize) -> Option<&FacetKey> {
        if row >= self.nrows || col >= self.ncols {
            return None;
        }
        self.keys[row * self.ncols + col].as_ref()
    }

    /// The color scale shared by every cell.
    #[must_use]
    pub fn color_scale(&self) -> Option<&Arc<ColorScale>> {
        self.color_scale.as_ref()
    }

    fn cell_size(&self) -> (u32, u32) {
        self.cells
            .iter()
            .flatten()
            .next()
            .map_or((0, 0), |a| (a.width(), a.height()))
    }

    fn grid_size(&self) -> (u32, u32) {
        let (w, h) = self.cell_size();
        (w * self.ncols as u32, h * self.nrows as u32)
    }

    /// Pixel width including the colorbar strip.
    #[must_use]
    pub fn width(&self) -> u32 {
        let strip = if self.color_scale.is_some() { COLORBAR_STRIP } else { 0 };
        self.grid_size().0 + strip
    }

    /// Pixel height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid_size().1
    }

    /// Compose every axes and the colorbar into one framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`](crate::error::Error::InvalidDimensions)
    /// if the figure holds no axes.
    pub fn render(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width(), self.height())?;
        fb.clear(Rgba::WHITE);

        let (w, h) = self.cell_size();
        for (i, axes) in self.cells.iter().enumerate() {
            if let Some(axes) = axes {
                let (r, c) = (i / self.ncols, i % self.ncols);
                fb.blit(axes.framebuffer(), c as u32 * w, r as u32 * h);
            }
        }

        if let Some(scale) = &self.color_scale {
            self.paint_colorbar(&mut fb, scale);
        }
        Ok(fb)
    }

    /// Colorbar rectangle: `(x, top, width, height)`.
    fn colorbar_rect(&self) -> (u32, u32, u32, u32) {
        let (grid_w, grid_h) = self.grid_size();
        let height = grid_h.saturating_sub(2 * BAR_MARGIN).max(1);
        (grid_w + BAR_OFFSET, BAR_MARGIN, BAR_WIDTH, height)
    }

    fn value_to_bar_y(&self, scale: &ColorScale, value: f32) -> f32 {
        let (_, top, _, height) = self.colorbar_rect();
        let t = scale.normalize(value).clamp(0.0, 1.0);
        top as f32 + (1.0 - t) * height as f32
    }

    fn paint_colorbar(&self, fb: &mut Framebuffer, scale: &ColorScale) {
        let (x, top, width, height) = self.colorbar_rect();

        for row in 0..height {
            let t = 1.0 - (row as f32 + 0.5) / height as f32;
            let value = scale.vmin() + t * (scale.vmax() - scale.vmin());
            fb.fill_rect(x, top + row, width, 1, scale.scale(value));
        }

        let (left, right) = (x as f32, (x + width) as f32);
        let mid = left + width as f32 / 2.0;
        let (top_f, bottom_f) = (top as f32, (top + height) as f32);
        if scale.extend().extends_max() {
            let cap = [
                Point::new(left, top_f),
                Point::new(right, top_f),
                Point::new(mid, top_f - CAP_HEIGHT),
            ];
            fill_polygon(fb, &cap, scale.scale(scale.vmax()));
        }
        if scale.extend().extends_min() {
            let cap = [
                Point::new(left, bottom_f),
                Point::new(right, bottom_f),
                Point::new(mid, bottom_f + CAP_HEIGHT),
            ];
            fill_polygon(fb, &cap, scale.scale(scale.vmin()));
        }

        draw_rect_outline(fb, x as i32, top as i32, width, height, Rgba::AXIS_GREY, 1);
        for tick in colorbar_ticks(scale) {
            let py = self.value_to_bar_y(scale, tick.value as f32);
            fb.fill_rect(x + width, py as u32, 4, 1, Rgba::AXIS_GREY);
        }
    }

    /// Every text label in figure pixel coordinates.
    #[must_use]
    pub fn text_labels(&self) -> Vec<TextLabel> {
        let (w, h) = self.cell_size();
        let mut labels: Vec<TextLabel> = self
            .cells
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|a| (i, a)))
            .flat_map(|(i, axes)| {
                let dx = (i % self.ncols) as f32 * w as f32;
                let dy = (i / self.ncols) as f32 * h as f32;
                axes.text_labels().into_iter().map(move |l| l.offset(dx, dy))
            })
            .collect();

        if let Some(scale) = &self.color_scale {
            let (x, top, width, height) = self.colorbar_rect();
            let tick_x = (x + width + 6) as f32;
            for tick in colorbar_ticks(scale) {
                let py = self.value_to_bar_y(scale, tick.value as f32);
                labels.push(TextLabel::new(
                    tick_x,
                    py + TICK_FONT / 3.0,
                    tick.label,
                    TICK_FONT,
                    TextAnchor::Start,
                ));
            }
            if let Some(label) = &self.colorbar_label {
                labels.push(
                    TextLabel::new(
                        (self.width() - 8) as f32,
                        (top + height / 2) as f32,
                        label,
                        LABEL_FONT,
                        TextAnchor::Middle,
                    )
                    .rotated(90.0),
                );
            }
        }
        labels
    }

    fn legend_labels(&self) -> Vec<(TextLabel, Rgba)> {
        let (w, h) = self.cell_size();
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_ref().map(|a| (i, a)))
            .flat_map(|(i, axes)| {
                let dx = (i % self.ncols) as f32 * w as f32;
                let dy = (i / self.ncols) as f32 * h as f32;
                axes.legend_labels()
                    .into_iter()
                    .map(move |(l, color)| (l.offset(dx, dy), color))
            })
            .collect()
    }

    /// Encode the composed raster as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if composition or encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.render()?)
    }

    /// Write the composed raster as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if composition, encoding or writing fails.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        PngEncoder::write_to_file(&self.render()?, path)
    }

    /// SVG document: the raster as an embedded PNG with text on top.
    ///
    /// # Errors
    ///
    /// Returns an error if composition or encoding fails.
    pub fn to_svg(&self) -> Result<String> {
        Ok(self.svg_encoder()?.render())
    }

    /// Write the SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if composition, encoding or writing fails.
    pub fn save_svg(&self, path: impl AsRef<Path>) -> Result<()> {
        self.svg_encoder()?.write_to_file(path)
    }

    fn svg_encoder(&self) -> Result<SvgEncoder> {
        let fb = self.render()?;
        let mut encoder = SvgEncoder::from_framebuffer(&fb)?.texts(&self.text_labels(), Rgba::BLACK);
        for (label, color) in self.legend_labels() {
            encoder = encoder.text(label, color);
        }
        Ok(encoder)
    }
}

/// Colorbar ticks: the level edges when there are few, else nice ticks.
fn colorbar_ticks(scale: &ColorScale) -> Vec<Tick> {
    match scale.levels() {
        Some(edges) if edges.len() <= MAX_EDGE_TICKS => {
            let step = edges
                .windows(2)
                .map(|w| f64::from(w[1] - w[0]))
                .fold(f64::INFINITY, f64::min);
            edges
                .iter()
                .map(|&e| Tick {
                    value: f64::from(e),
                    label: format_tick(f64::from(e), step),
                })
                .collect()
        }
        _ => numeric_ticks((f64::from(scale.vmin()), f64::from(scale.vmax()))),
    }
}
