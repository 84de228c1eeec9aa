//! A single drawing surface with a plot area, data ranges and decorations.
//!
//! An [`Axes`] owns its framebuffer. Plot drawers map data to pixels through
//! it; titles, axis labels and tick labels are kept as positioned
//! [`TextLabel`]s so vector output can render them as text.

use std::sync::Arc;

use batuta_common::display::WithDimensions;

use crate::color::Rgba;
use crate::dispatch::PlotSpec;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};
use crate::output::{TextAnchor, TextLabel};
use crate::render::draw_rect_outline;
use crate::scale::ColorScale;
use crate::stats::nice_ticks;

/// Target number of ticks on a numeric axis.
const TICK_TARGET: usize = 5;
const TICK_LENGTH: u32 = 4;
const TICK_FONT: f32 = 10.0;
const LABEL_FONT: f32 = 11.0;
const TITLE_FONT: f32 = 12.0;

/// Pixel margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    /// Left margin (y tick labels and axis label).
    pub left: u32,
    /// Right margin (row titles).
    pub right: u32,
    /// Top margin (title).
    pub top: u32,
    /// Bottom margin (x tick labels and axis label).
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 52,
            right: 16,
            top: 24,
            bottom: 40,
        }
    }
}

/// An axis tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Data position.
    pub value: f64,
    /// Text shown next to the tick.
    pub label: String,
}

/// Format `value` with as many decimals as `step` needs.
#[must_use]
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let value = if value.abs() < step.abs() * 1e-9 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

/// Nice ticks over `range`, labeled.
#[must_use]
pub fn numeric_ticks(range: (f64, f64)) -> Vec<Tick> {
    let values = nice_ticks(range.0, range.1, TICK_TARGET);
    let step = if values.len() > 1 { values[1] - values[0] } else { 1.0 };
    values
        .into_iter()
        .map(|value| Tick {
            value,
            label: format_tick(value, step),
        })
        .collect()
}

/// One tick per label at positions `0, 1, 2, ...`.
#[must_use]
pub fn label_ticks(labels: &[String]) -> Vec<Tick> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| Tick {
            value: i as f64,
            label: label.clone(),
        })
        .collect()
}

/// A drawing surface for one plot.
#[derive(Debug, Clone)]
pub struct Axes {
    fb: Framebuffer,
    margins: Margins,
    background: Rgba,
    x_range: (f64, f64),
    y_range: (f64, f64),
    xincrease: bool,
    yincrease: bool,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
    show_x_axis: bool,
    show_y_axis: bool,
    title: Option<String>,
    xlabel: Option<String>,
    ylabel: Option<String>,
    row_title: Option<String>,
    legend: Vec<(String, Rgba)>,
    spec: Option<PlotSpec>,
    colorbar: Option<Arc<ColorScale>>,
    colorbar_label: Option<String>,
    empty: bool,
}

impl Axes {
    /// Blank axes of `width` x `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the plot area would be empty.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let margins = Margins::default();
        if width <= margins.left + margins.right || height <= margins.top + margins.bottom {
            return Err(Error::InvalidDimensions { width, height });
        }
        let mut fb = Framebuffer::new(width, height)?;
        fb.clear(Rgba::WHITE);

        Ok(Self {
            fb,
            margins,
            background: Rgba::WHITE,
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            xincrease: true,
            yincrease: true,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            show_x_axis: true,
            show_y_axis: true,
            title: None,
            xlabel: None,
            ylabel: None,
            row_title: None,
            legend: Vec::new(),
            spec: None,
            colorbar: None,
            colorbar_label: None,
            empty: false,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.fb.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.fb.height()
    }

    /// The rendered pixels.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Mutable pixels for drawers.
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.fb
    }

    /// Background color.
    #[must_use]
    pub const fn background(&self) -> Rgba {
        self.background
    }

    /// The plot area in pixels.
    #[must_use]
    pub fn plot_area(&self) -> Rect {
        let m = self.margins;
        Rect::new(
            m.left as f32,
            m.top as f32,
            (self.width() - m.left - m.right) as f32,
            (self.height() - m.top - m.bottom) as f32,
        )
    }

    /// Set the x data range. Reversed bounds are swapped and equal bounds
    /// widened by half a unit.
    pub fn set_x_range(&mut self, lo: f64, hi: f64) {
        self.x_range = normalize_range(lo, hi);
    }

    /// Set the y data range.
    pub fn set_y_range(&mut self, lo: f64, hi: f64) {
        self.y_range = normalize_range(lo, hi);
    }

    /// Current x range.
    #[must_use]
    pub const fn x_range(&self) -> (f64, f64) {
        self.x_range
    }

    /// Current y range.
    #[must_use]
    pub const fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Axis directions; `false` flips the axis.
    pub fn set_direction(&mut self, xincrease: bool, yincrease: bool) {
        self.xincrease = xincrease;
        self.yincrease = yincrease;
    }

    /// Whether x runs left to right.
    #[must_use]
    pub const fn x_increasing(&self) -> bool {
        self.xincrease
    }

    /// Whether y runs bottom to top.
    #[must_use]
    pub const fn y_increasing(&self) -> bool {
        self.yincrease
    }

    /// Horizontal pixel position of data `x`.
    #[must_use]
    pub fn x_to_px(&self, x: f64) -> f32 {
        let area = self.plot_area();
        let (lo, hi) = self.x_range;
        let mut t = (x - lo) / (hi - lo);
        if !self.xincrease {
            t = 1.0 - t;
        }
        area.x + (t as f32) * area.width
    }

    /// Vertical pixel position of data `y`.
    #[must_use]
    pub fn y_to_px(&self, y: f64) -> f32 {
        let area = self.plot_area();
        let (lo, hi) = self.y_range;
        let mut t = (y - lo) / (hi - lo);
        if self.yincrease {
            t = 1.0 - t;
        }
        area.y + (t as f32) * area.height
    }

    /// Pixel position of a data point.
    #[must_use]
    pub fn data_to_px(&self, x: f64, y: f64) -> Point {
        Point::new(self.x_to_px(x), self.y_to_px(y))
    }

    /// Data position of a pixel.
    #[must_use]
    pub fn px_to_data(&self, px: f32, py: f32) -> (f64, f64) {
        let area = self.plot_area();
        let mut tx = f64::from((px - area.x) / area.width);
        let mut ty = f64::from((py - area.y) / area.height);
        if !self.xincrease {
            tx = 1.0 - tx;
        }
        if self.yincrease {
            ty = 1.0 - ty;
        }
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        (x0 + tx * (x1 - x0), y0 + ty * (y1 - y0))
    }

    /// Replace the x ticks.
    pub fn set_x_ticks(&mut self, ticks: Vec<Tick>) {
        self.x_ticks = ticks;
    }

    /// Replace the y ticks.
    pub fn set_y_ticks(&mut self, ticks: Vec<Tick>) {
        self.y_ticks = ticks;
    }

    /// x ticks.
    #[must_use]
    pub fn x_ticks(&self) -> &[Tick] {
        &self.x_ticks
    }

    /// y ticks.
    #[must_use]
    pub fn y_ticks(&self) -> &[Tick] {
        &self.y_ticks
    }

    /// Show or hide tick marks, tick labels and axis label per axis.
    pub fn show_axes(&mut self, x: bool, y: bool) {
        self.show_x_axis = x;
        self.show_y_axis = y;
    }

    /// Whether x decorations are drawn.
    #[must_use]
    pub const fn shows_x_axis(&self) -> bool {
        self.show_x_axis
    }

    /// Whether y decorations are drawn.
    #[must_use]
    pub const fn shows_y_axis(&self) -> bool {
        self.show_y_axis
    }

    /// Set the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.title = (!title.is_empty()).then_some(title);
    }

    /// Title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the x axis label.
    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.xlabel = (!label.is_empty()).then_some(label);
    }

    /// x axis label.
    #[must_use]
    pub fn xlabel(&self) -> Option<&str> {
        self.xlabel.as_deref()
    }

    /// Set the y axis label.
    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.ylabel = (!label.is_empty()).then_some(label);
    }

    /// y axis label.
    #[must_use]
    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    /// Title drawn vertically along the right edge.
    pub fn set_row_title(&mut self, title: impl Into<String>) {
        self.row_title = Some(title.into());
    }

    /// Row title.
    #[must_use]
    pub fn row_title(&self) -> Option<&str> {
        self.row_title.as_deref()
    }

    /// Add a legend entry.
    pub fn add_legend_entry(&mut self, name: impl Into<String>, color: Rgba) {
        self.legend.push((name.into(), color));
    }

    /// Legend entries.
    #[must_use]
    pub fn legend(&self) -> &[(String, Rgba)] {
        &self.legend
    }

    /// What was drawn.
    #[must_use]
    pub fn spec(&self) -> Option<&PlotSpec> {
        self.spec.as_ref()
    }

    pub(crate) fn set_spec(&mut self, spec: PlotSpec) {
        self.spec = Some(spec);
    }

    /// Request a colorbar for this axes when it becomes a figure.
    pub fn set_colorbar(&mut self, scale: Arc<ColorScale>, label: Option<String>) {
        self.colorbar = Some(scale);
        self.colorbar_label = label.filter(|l| !l.is_empty());
    }

    /// Requested colorbar.
    #[must_use]
    pub fn colorbar(&self) -> Option<&Arc<ColorScale>> {
        self.colorbar.as_ref()
    }

    /// Colorbar label.
    #[must_use]
    pub fn colorbar_label(&self) -> Option<&str> {
        self.colorbar_label.as_deref()
    }

    /// Mark as a facet cell without data.
    pub fn mark_empty(&mut self) {
        self.empty = true;
    }

    /// Whether the axes holds no data.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Wipe pixels to the background.
    pub fn clear(&mut self) {
        let bg = self.background;
        self.fb.clear(bg);
    }

    /// Draw the plot-area frame and tick marks.
    pub fn draw_frame(&mut self) {
        let area = self.plot_area();
        let (x, y) = (area.x as i32, area.y as i32);
        let (w, h) = (area.width as u32, area.height as u32);
        draw_rect_outline(&mut self.fb, x - 1, y - 1, w + 2, h + 2, Rgba::AXIS_GREY, 1);

        if self.show_x_axis {
            let bottom = area.bottom() as u32 + 1;
            for tick in &self.x_ticks {
                let px = self.x_to_px(tick.value);
                if px >= area.x - 0.5 && px <= area.right() + 0.5 {
                    self.fb.fill_rect(px as u32, bottom, 1, TICK_LENGTH, Rgba::AXIS_GREY);
                }
            }
        }
        if self.show_y_axis {
            let left = (area.x as u32).saturating_sub(TICK_LENGTH + 1);
            for tick in &self.y_ticks {
                let py = self.y_to_px(tick.value);
                if py >= area.y - 0.5 && py <= area.bottom() + 0.5 {
                    self.fb.fill_rect(left, py as u32, TICK_LENGTH, 1, Rgba::AXIS_GREY);
                }
            }
        }
    }

    /// Text labels in this axes' pixel coordinates.
    #[must_use]
    pub fn text_labels(&self) -> Vec<TextLabel> {
        let area = self.plot_area();
        let mut labels = Vec::new();

        if let Some(title) = &self.title {
            labels.push(TextLabel::new(
                area.center().x,
                area.y - 8.0,
                title,
                TITLE_FONT,
                TextAnchor::Middle,
            ));
        }

        if self.show_x_axis {
            for tick in &self.x_ticks {
                let px = self.x_to_px(tick.value);
                if px >= area.x - 0.5 && px <= area.right() + 0.5 {
                    labels.push(TextLabel::new(
                        px,
                        area.bottom() + TICK_LENGTH as f32 + TICK_FONT + 1.0,
                        &tick.label,
                        TICK_FONT,
                        TextAnchor::Middle,
                    ));
                }
            }
            if let Some(xlabel) = &self.xlabel {
                labels.push(TextLabel::new(
                    area.center().x,
                    self.height() as f32 - 6.0,
                    xlabel,
                    LABEL_FONT,
                    TextAnchor::Middle,
                ));
            }
        }

        if self.show_y_axis {
            for tick in &self.y_ticks {
                let py = self.y_to_px(tick.value);
                if py >= area.y - 0.5 && py <= area.bottom() + 0.5 {
                    labels.push(TextLabel::new(
                        area.x - TICK_LENGTH as f32 - 3.0,
                        py + TICK_FONT / 3.0,
                        &tick.label,
                        TICK_FONT,
                        TextAnchor::End,
                    ));
                }
            }
            if let Some(ylabel) = &self.ylabel {
                labels.push(
                    TextLabel::new(12.0, area.center().y, ylabel, LABEL_FONT, TextAnchor::Middle)
                        .rotated(-90.0),
                );
            }
        }

        if let Some(row_title) = &self.row_title {
            labels.push(
                TextLabel::new(
                    area.right() + 8.0,
                    area.center().y,
                    row_title,
                    LABEL_FONT,
                    TextAnchor::Middle,
                )
                .rotated(90.0),
            );
        }

        labels
    }

    /// Legend entries placed inside the top-right corner of the plot area.
    #[must_use]
    pub fn legend_labels(&self) -> Vec<(TextLabel, Rgba)> {
        let area = self.plot_area();
        self.legend
            .iter()
            .enumerate()
            .map(|(i, (name, color))| {
                let label = TextLabel::new(
                    area.right() - 4.0,
                    area.y + TICK_FONT + 2.0 + i as f32 * (TICK_FONT + 3.0),
                    name,
                    TICK_FONT,
                    TextAnchor::End,
                );
                (label, *color)
            })
            .collect()
    }
}

impl WithDimensions for Axes {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        let m = self.margins;
        if width <= m.left + m.right || height <= m.top + m.bottom {
            return;
        }
        if let Ok(mut fb) = Framebuffer::new(width, height) {
            fb.clear(self.background);
            self.fb = fb;
        }
    }
}

fn normalize_range(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_area() {
        let axes = Axes::new(200, 100).unwrap();
        let area = axes.plot_area();
        assert_eq!(area.x, 52.0);
        assert_eq!(area.width, 200.0 - 52.0 - 16.0);
        assert_eq!(area.height, 100.0 - 24.0 - 40.0);
        assert!(Axes::new(50, 100).is_err());
    }

    #[test]
    fn test_mapping_increasing() {
        let mut axes = Axes::new(200, 100).unwrap();
        axes.set_x_range(0.0, 10.0);
        axes.set_y_range(0.0, 1.0);
        let area = axes.plot_area();
        assert_eq!(axes.x_to_px(0.0), area.x);
        assert_eq!(axes.x_to_px(10.0), area.right());
        assert_eq!(axes.y_to_px(0.0), area.bottom());
        assert_eq!(axes.y_to_px(1.0), area.y);
    }

    #[test]
    fn test_mapping_flipped() {
        let mut axes = Axes::new(200, 100).unwrap();
        axes.set_x_range(0.0, 10.0);
        axes.set_direction(false, false);
        let area = axes.plot_area();
        assert_eq!(axes.x_to_px(0.0), area.right());
        assert_eq!(axes.y_to_px(0.0), area.y);
    }

    #[test]
    fn test_px_roundtrip() {
        let mut axes = Axes::new(300, 200).unwrap();
        axes.set_x_range(-5.0, 5.0);
        axes.set_y_range(100.0, 200.0);
        let p = axes.data_to_px(2.5, 150.0);
        let (x, y) = axes.px_to_data(p.x, p.y);
        assert!((x - 2.5).abs() < 1e-3);
        assert!((y - 150.0).abs() < 1e-2);
    }

    #[test]
    fn test_range_normalized() {
        let mut axes = Axes::new(200, 100).unwrap();
        axes.set_x_range(5.0, 5.0);
        assert_eq!(axes.x_range(), (4.5, 5.5));
        axes.set_y_range(3.0, 1.0);
        assert_eq!(axes.y_range(), (1.0, 3.0));
        axes.set_y_range(f64::NAN, 1.0);
        assert_eq!(axes.y_range(), (0.0, 1.0));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0, 1.0), "2");
        assert_eq!(format_tick(0.5, 0.5), "0.5");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(1e-12, 0.2), "0.0");
    }

    #[test]
    fn test_text_labels_follow_visibility() {
        let mut axes = Axes::new(300, 200).unwrap();
        axes.set_x_range(0.0, 10.0);
        axes.set_x_ticks(numeric_ticks((0.0, 10.0)));
        axes.set_y_ticks(numeric_ticks((0.0, 1.0)));
        axes.set_title("time = 2020");
        axes.set_xlabel("lon");
        axes.set_ylabel("lat");

        let all = axes.text_labels();
        assert!(all.iter().any(|l| l.text == "lon"));
        assert!(all.iter().any(|l| l.text == "lat" && l.rotate == -90.0));

        axes.show_axes(false, true);
        let some = axes.text_labels();
        assert!(!some.iter().any(|l| l.text == "lon"));
        assert!(some.iter().any(|l| l.text == "time = 2020"));
    }

    #[test]
    fn test_draw_frame_inks_border() {
        let mut axes = Axes::new(120, 100).unwrap();
        axes.draw_frame();
        let area = axes.plot_area();
        let px = axes
            .framebuffer()
            .get_pixel(area.x as u32 - 1, area.center().y as u32);
        assert_eq!(px, Some(Rgba::AXIS_GREY));
    }

    #[test]
    fn test_with_dimensions() {
        let mut axes = Axes::new(200, 100).unwrap();
        axes.set_dimensions(320, 240);
        assert_eq!((axes.width(), axes.height()), (320, 240));
        axes.set_dimensions(10, 10);
        assert_eq!((axes.width(), axes.height()), (320, 240));
    }
}
