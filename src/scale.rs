//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to visual properties (position, color).
//! Based on the Grammar of Graphics [Wilkinson 2005].

use crate::color::Rgba;
use crate::colormap::{Colormap, ColormapKind};
use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
///
/// A reversed range (`range.0 > range.1`) flips the axis direction.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Which ends of a color scale are clipped.
///
/// A clipped end is drawn as a triangular cap on the colorbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Extend {
    /// Data fits inside the bounds.
    #[default]
    Neither,
    /// Data extends below the lower bound.
    Min,
    /// Data extends above the upper bound.
    Max,
    /// Data extends past both bounds.
    Both,
}

impl Extend {
    /// Combine "below lower bound" and "above upper bound" flags.
    #[must_use]
    pub const fn from_flags(below: bool, above: bool) -> Self {
        match (below, above) {
            (true, true) => Self::Both,
            (true, false) => Self::Min,
            (false, true) => Self::Max,
            (false, false) => Self::Neither,
        }
    }

    /// Whether the lower end is clipped.
    #[must_use]
    pub const fn extends_min(self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    /// Whether the upper end is clipped.
    #[must_use]
    pub const fn extends_max(self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }
}

/// Value-to-color mapping with bounds, optional discrete levels and
/// clipping markers.
///
/// One instance is shared by every cell of a facet grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    colormap: Colormap,
    vmin: f32,
    vmax: f32,
    levels: Option<Vec<f32>>,
    extend: Extend,
    diverging: bool,
}

impl ColorScale {
    /// Create a continuous color scale over `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty, reversed or not finite.
    pub fn new(colormap: Colormap, domain: (f32, f32)) -> Result<Self> {
        let (vmin, vmax) = domain;
        if !vmin.is_finite() || !vmax.is_finite() {
            return Err(Error::ScaleDomain("Color scale bounds must be finite".to_string()));
        }
        if vmin >= vmax {
            return Err(Error::ScaleDomain("Color scale needs vmin < vmax".to_string()));
        }

        Ok(Self {
            colormap,
            vmin,
            vmax,
            levels: None,
            extend: Extend::Neither,
            diverging: false,
        })
    }

    /// Use discrete level boundaries. The bounds become the first and last
    /// edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless the edges are finite, strictly
    /// increasing and at least two.
    pub fn with_levels(mut self, edges: Vec<f32>) -> Result<Self> {
        validate_level_edges(&edges)?;
        self.vmin = edges[0];
        self.vmax = edges[edges.len() - 1];
        self.levels = Some(edges);
        Ok(self)
    }

    /// Mark clipped ends.
    #[must_use]
    pub fn with_extend(mut self, extend: Extend) -> Self {
        self.extend = extend;
        self
    }

    /// Mark the scale as centered on a midpoint.
    #[must_use]
    pub fn diverging(mut self, diverging: bool) -> Self {
        self.diverging = diverging;
        self
    }

    /// Lower bound.
    #[must_use]
    pub const fn vmin(&self) -> f32 {
        self.vmin
    }

    /// Upper bound.
    #[must_use]
    pub const fn vmax(&self) -> f32 {
        self.vmax
    }

    /// Discrete level edges, if the scale is stepped.
    #[must_use]
    pub fn levels(&self) -> Option<&[f32]> {
        self.levels.as_deref()
    }

    /// Number of discrete bins (0 for a continuous scale).
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.levels.as_ref().map_or(0, |l| l.len() - 1)
    }

    /// Clipping markers.
    #[must_use]
    pub const fn extend(&self) -> Extend {
        self.extend
    }

    /// Whether any end is clipped.
    #[must_use]
    pub const fn is_clipped(&self) -> bool {
        !matches!(self.extend, Extend::Neither)
    }

    /// Whether the scale is centered on a midpoint.
    #[must_use]
    pub const fn is_diverging(&self) -> bool {
        self.diverging
    }

    /// The colormap.
    #[must_use]
    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    /// Level bin holding `value`; values outside the edges clamp to the end
    /// bins. `None` for NaN or a continuous scale.
    #[must_use]
    pub fn bin_index(&self, value: f32) -> Option<usize> {
        let levels = self.levels.as_ref()?;
        if value.is_nan() {
            return None;
        }
        let bins = levels.len() - 1;
        let upper = levels[1..].partition_point(|&edge| edge <= value);
        Some(upper.min(bins - 1))
    }

    /// Color of level bin `index`.
    #[must_use]
    pub fn bin_color(&self, index: usize) -> Rgba {
        let bins = self.bin_count().max(1);
        if self.colormap.kind() == ColormapKind::Listed {
            let stops = self.colormap.stops();
            return stops[index % stops.len()];
        }
        self.colormap.sample((index as f32 + 0.5) / bins as f32)
    }

    /// Normalized position of `value` in `[0, 1]` (unclamped).
    #[must_use]
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.vmin) / (self.vmax - self.vmin)
    }
}

impl Scale<f32, Rgba> for ColorScale {
    fn scale(&self, value: f32) -> Rgba {
        if value.is_nan() {
            return Rgba::TRANSPARENT;
        }
        match self.bin_index(value) {
            Some(bin) => self.bin_color(bin),
            None => self.colormap.sample(self.normalize(value)),
        }
    }

    fn domain(&self) -> (f32, f32) {
        (self.vmin, self.vmax)
    }

    fn range(&self) -> (Rgba, Rgba) {
        (self.scale(self.vmin), self.scale(self.vmax))
    }
}

/// Check that level edges are finite, strictly increasing and at least two.
pub(crate) fn validate_level_edges(edges: &[f32]) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::config(format!(
            "levels need at least 2 boundaries, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(Error::config("level boundaries must be finite"));
    }
    if let Some(pair) = edges.windows(2).find(|w| w[1] <= w[0]) {
        return Err(Error::config(format!(
            "level boundaries must be strictly increasing ({} is followed by {})",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 1.0)).expect("operation should succeed");
        assert!((scale.scale(0.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(50.0) - 0.5).abs() < 0.001);
        assert!((scale.scale(100.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_scale_reversed_range() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 0.0)).expect("operation should succeed");
        assert!((scale.scale(0.0) - 100.0).abs() < 0.001);
        assert!((scale.scale(10.0) - 0.0).abs() < 0.001);
        assert!((scale.scale(5.0) - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_linear_scale_equal_domain_error() {
        assert!(LinearScale::new((5.0, 5.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_color_scale_continuous() {
        let scale = ColorScale::new(Colormap::greys(), (0.0, 1.0))
            .expect("color scale creation should succeed");
        assert_eq!(scale.scale(0.0), Rgba::WHITE);
        assert_eq!(scale.scale(1.0), Rgba::BLACK);
        let mid = scale.scale(0.5);
        assert!(mid.r > 100 && mid.r < 150);
        assert_eq!(scale.bin_count(), 0);
        assert_eq!(scale.bin_index(0.5), None);
    }

    #[test]
    fn test_color_scale_nan_transparent() {
        let scale = ColorScale::new(Colormap::viridis(), (0.0, 1.0)).unwrap();
        assert_eq!(scale.scale(f32::NAN), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_color_scale_invalid_domain() {
        assert!(ColorScale::new(Colormap::viridis(), (5.0, 5.0)).is_err());
        assert!(ColorScale::new(Colormap::viridis(), (5.0, 1.0)).is_err());
        assert!(ColorScale::new(Colormap::viridis(), (f32::NAN, 1.0)).is_err());
    }

    #[test]
    fn test_color_scale_adjacent_large_bounds() {
        let scale = ColorScale::new(Colormap::viridis(), (16_777_216.0, 16_777_218.0)).unwrap();
        assert!((scale.normalize(16_777_218.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_scale_levels_bins() {
        let scale = ColorScale::new(Colormap::viridis(), (0.0, 30.0))
            .unwrap()
            .with_levels(vec![0.0, 12.0, 18.0, 30.0])
            .unwrap();

        assert_eq!(scale.bin_count(), 3);
        assert_eq!(scale.bin_index(0.0), Some(0));
        assert_eq!(scale.bin_index(11.9), Some(0));
        assert_eq!(scale.bin_index(12.0), Some(1));
        assert_eq!(scale.bin_index(29.0), Some(2));
        assert_eq!(scale.bin_index(30.0), Some(2));
        assert_eq!(scale.bin_index(-5.0), Some(0));
        assert_eq!(scale.bin_index(99.0), Some(2));
        assert_eq!(scale.scale(13.0), scale.scale(17.0));
        assert_ne!(scale.scale(11.0), scale.scale(13.0));
    }

    #[test]
    fn test_levels_reset_bounds() {
        let scale = ColorScale::new(Colormap::viridis(), (-100.0, 100.0))
            .unwrap()
            .with_levels(vec![0.0, 10.0])
            .unwrap();
        assert_eq!(scale.domain(), (0.0, 10.0));
    }

    #[test]
    fn test_levels_rejected() {
        let base = ColorScale::new(Colormap::viridis(), (0.0, 30.0)).unwrap();
        assert!(matches!(
            base.clone().with_levels(vec![0.0, 30.0, 18.0]),
            Err(Error::Config(_))
        ));
        assert!(base.clone().with_levels(vec![1.0, 1.0]).is_err());
        assert!(base.clone().with_levels(vec![1.0]).is_err());
        assert!(base.with_levels(vec![0.0, f32::INFINITY]).is_err());
    }

    #[test]
    fn test_listed_bins_cycle() {
        let cmap = Colormap::listed(vec![Rgba::RED, Rgba::BLUE]).unwrap();
        let scale = ColorScale::new(cmap, (0.0, 3.0))
            .unwrap()
            .with_levels(vec![0.0, 1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(scale.bin_color(0), Rgba::RED);
        assert_eq!(scale.bin_color(1), Rgba::BLUE);
        assert_eq!(scale.bin_color(2), Rgba::RED);
    }

    #[test]
    fn test_extend_flags() {
        assert_eq!(Extend::from_flags(true, true), Extend::Both);
        assert_eq!(Extend::from_flags(true, false), Extend::Min);
        assert_eq!(Extend::from_flags(false, true), Extend::Max);
        assert_eq!(Extend::from_flags(false, false), Extend::Neither);
        assert!(Extend::Both.extends_min() && Extend::Both.extends_max());
        assert!(!Extend::Max.extends_min());
    }

    #[test]
    fn test_clipped_marker() {
        let scale = ColorScale::new(Colormap::viridis(), (0.0, 1.0)).unwrap();
        assert!(!scale.is_clipped());
        assert!(scale.with_extend(Extend::Max).is_clipped());
    }
}
