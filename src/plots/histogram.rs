//! Histogram of every finite value of an array.
//!
//! Supports fixed binning and the Sturges, Scott and Freedman-Diaconis rules.

use crate::axes::Axes;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::stats::{finite_extent, percentile};

/// Bins used when nothing else is asked for.
pub const DEFAULT_BINS: usize = 10;

/// Binning strategy for histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BinStrategy {
    /// Sturges' rule: ceil(log2(n) + 1)
    Sturges,
    /// Scott's rule: 3.5 * std / n^(1/3)
    Scott,
    /// Freedman-Diaconis rule: 2 * IQR / n^(1/3)
    FreedmanDiaconis,
    /// Fixed number of bins
    Fixed(usize),
}

impl Default for BinStrategy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_BINS)
    }
}

/// Builder for histograms.
#[derive(Debug, Clone)]
pub struct Histogram {
    data: Vec<f32>,
    bin_strategy: BinStrategy,
    color: Rgba,
    range: Option<(f32, f32)>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    /// Create a new histogram builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bin_strategy: BinStrategy::default(),
            color: Rgba::rgb(70, 130, 180),
            range: None,
        }
    }

    /// Set the data. Non-finite values are dropped.
    #[must_use]
    pub fn data(mut self, data: impl IntoIterator<Item = f32>) -> Self {
        self.data = data.into_iter().filter(|v| v.is_finite()).collect();
        self
    }

    /// Set the binning strategy.
    #[must_use]
    pub fn bins(mut self, strategy: BinStrategy) -> Self {
        self.bin_strategy = strategy;
        self
    }

    /// Set the bar color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Bin over this range instead of the data extent (shared facet bins).
    #[must_use]
    pub fn range(mut self, lo: f32, hi: f32) -> Self {
        self.range = Some((lo, hi));
        self
    }

    /// Number of finite values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no finite values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Calculate the number of bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        let n = self.data.len();
        if n == 0 {
            return 1;
        }

        match self.bin_strategy {
            BinStrategy::Sturges => sturges(n),
            BinStrategy::Scott => {
                let width = 3.5 * self.std_dev() / (n as f32).powf(1.0 / 3.0);
                self.bins_for_width(width).unwrap_or_else(|| sturges(n))
            }
            BinStrategy::FreedmanDiaconis => {
                let width = 2.0 * self.iqr() / (n as f32).powf(1.0 / 3.0);
                self.bins_for_width(width).unwrap_or_else(|| sturges(n))
            }
            BinStrategy::Fixed(bins) => bins,
        }
        .max(1)
    }

    fn bins_for_width(&self, width: f32) -> Option<usize> {
        let (lo, hi) = self.bin_range()?;
        (width > 0.0).then(|| ((hi - lo) / width).ceil() as usize)
    }

    /// Range the bins cover, widened when degenerate.
    #[must_use]
    pub fn bin_range(&self) -> Option<(f32, f32)> {
        let (lo, hi) = self.range.or_else(|| finite_extent(&self.data))?;
        if hi > lo {
            Some((lo, hi))
        } else {
            Some((lo - 0.5, hi + 0.5))
        }
    }

    fn std_dev(&self) -> f32 {
        if self.data.len() < 2 {
            return 0.0;
        }
        let mean = self.data.iter().sum::<f32>() / self.data.len() as f32;
        let variance = self.data.iter().map(|x| (x - mean).powi(2)).sum::<f32>()
            / (self.data.len() - 1) as f32;
        variance.sqrt()
    }

    fn iqr(&self) -> f32 {
        match (percentile(&self.data, 25.0), percentile(&self.data, 75.0)) {
            (Some(q1), Some(q3)) => q3 - q1,
            _ => 0.0,
        }
    }

    /// Bin edges (`bin_count + 1` values).
    #[must_use]
    pub fn bin_edges(&self) -> Vec<f32> {
        let Some((lo, hi)) = self.bin_range() else {
            return Vec::new();
        };
        let bins = self.bin_count();
        let width = (hi - lo) / bins as f32;
        let mut edges: Vec<f32> = (0..bins).map(|i| lo + width * i as f32).collect();
        edges.push(hi);
        edges
    }

    /// Count per bin. Values outside an explicit range are not counted; the
    /// last bin is closed on the right.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        let Some((lo, hi)) = self.bin_range() else {
            return Vec::new();
        };
        let bins = self.bin_count();
        let width = (hi - lo) / bins as f32;

        let mut counts = vec![0usize; bins];
        for &value in &self.data {
            if value < lo || value > hi {
                continue;
            }
            let bin = (((value - lo) / width).floor() as usize).min(bins - 1);
            counts[bin] += 1;
        }
        counts
    }

    /// Largest bin count.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts().into_iter().max().unwrap_or(0)
    }

    /// Build and validate the histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no finite values, or the explicit range
    /// is not finite and increasing.
    pub fn build(self) -> Result<Self> {
        if self.data.is_empty() {
            return Err(Error::EmptyData);
        }
        if let Some((lo, hi)) = self.range {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(Error::ScaleDomain(format!("invalid histogram range {lo}..{hi}")));
            }
        }
        Ok(self)
    }

    /// Draw bars into `axes` using its current data ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn render(&self, axes: &mut Axes) -> Result<()> {
        let edges = self.bin_edges();
        let counts = self.counts();
        let area = axes.plot_area();

        for (i, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let x0 = axes.x_to_px(f64::from(edges[i]));
            let x1 = axes.x_to_px(f64::from(edges[i + 1]));
            let y0 = axes.y_to_px(0.0);
            let y1 = axes.y_to_px(count as f64);

            let left = x0.min(x1).max(area.x);
            let right = x0.max(x1).min(area.right());
            let top = y0.min(y1).max(area.y);
            let bottom = y0.max(y1).min(area.bottom());
            if right - left < 1.0 || bottom - top < 0.5 {
                continue;
            }

            // One-pixel gap between neighbouring bars.
            let width = (right - left).round() as u32;
            axes.framebuffer_mut().fill_rect(
                left.round() as u32,
                top.round() as u32,
                width.saturating_sub(1).max(1),
                (bottom - top).round().max(1.0) as u32,
                self.color,
            );
        }

        Ok(())
    }
}

fn sturges(n: usize) -> usize {
    ((n as f32).log2().ceil() + 1.0) as usize
}
