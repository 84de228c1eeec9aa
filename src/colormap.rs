//! Named and listed colormaps.
//!
//! A colormap maps `t` in `[0, 1]` to a color. Continuous maps interpolate
//! between evenly spaced stops; listed maps (built from a user-supplied
//! discrete palette) pick the stop containing `t`.
//!
//! # References
//!
//! - Borland, D., & Taylor, R. M. (2007). "Rainbow Color Map (Still) Considered Harmful."
//!   IEEE Computer Graphics and Applications.
//! - Moreland, K. (2009). "Diverging Color Maps for Scientific Visualization."

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Default palette for data that does not cross the center value.
pub const DEFAULT_SEQUENTIAL: &str = "viridis";

/// Default palette for data centered on a meaningful midpoint.
pub const DEFAULT_DIVERGING: &str = "RdBu_r";

/// How a colormap is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColormapKind {
    /// Monotonic lightness from low to high.
    Sequential,
    /// Two hues diverging from a neutral midpoint.
    Diverging,
    /// Explicit discrete colors, one per level bin.
    Listed,
}

/// A colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    stops: Vec<Rgba>,
    kind: ColormapKind,
}

impl Colormap {
    fn builtin(name: &str, kind: ColormapKind, stops: &[Rgba]) -> Self {
        Self {
            name: name.to_string(),
            stops: stops.to_vec(),
            kind,
        }
    }

    /// Viridis (perceptually uniform, colorblind-safe).
    #[must_use]
    pub fn viridis() -> Self {
        Self::builtin(
            "viridis",
            ColormapKind::Sequential,
            &[
                Rgba::rgb(68, 1, 84),
                Rgba::rgb(59, 82, 139),
                Rgba::rgb(33, 145, 140),
                Rgba::rgb(94, 201, 98),
                Rgba::rgb(253, 231, 37),
            ],
        )
    }

    /// Magma (sequential, perceptually uniform).
    #[must_use]
    pub fn magma() -> Self {
        Self::builtin(
            "magma",
            ColormapKind::Sequential,
            &[
                Rgba::rgb(0, 0, 4),
                Rgba::rgb(81, 18, 124),
                Rgba::rgb(183, 55, 121),
                Rgba::rgb(252, 137, 97),
                Rgba::rgb(252, 253, 191),
            ],
        )
    }

    /// Sequential blues.
    #[must_use]
    pub fn blues() -> Self {
        Self::builtin(
            "Blues",
            ColormapKind::Sequential,
            &[
                Rgba::rgb(247, 251, 255),
                Rgba::rgb(198, 219, 239),
                Rgba::rgb(107, 174, 214),
                Rgba::rgb(33, 113, 181),
                Rgba::rgb(8, 48, 107),
            ],
        )
    }

    /// Heat (black-red-yellow-white).
    #[must_use]
    pub fn heat() -> Self {
        Self::builtin(
            "heat",
            ColormapKind::Sequential,
            &[
                Rgba::rgb(0, 0, 0),
                Rgba::rgb(128, 0, 0),
                Rgba::rgb(255, 0, 0),
                Rgba::rgb(255, 128, 0),
                Rgba::rgb(255, 255, 0),
                Rgba::rgb(255, 255, 255),
            ],
        )
    }

    /// Greyscale.
    #[must_use]
    pub fn greys() -> Self {
        Self::builtin("Greys", ColormapKind::Sequential, &[Rgba::WHITE, Rgba::BLACK])
    }

    /// Diverging red-white-blue, red at the low end.
    #[must_use]
    pub fn rd_bu() -> Self {
        Self::builtin(
            "RdBu",
            ColormapKind::Diverging,
            &[
                Rgba::rgb(178, 24, 43),
                Rgba::rgb(239, 138, 98),
                Rgba::rgb(247, 247, 247),
                Rgba::rgb(103, 169, 207),
                Rgba::rgb(33, 102, 172),
            ],
        )
    }

    /// Diverging blue-white-red, blue at the low end.
    #[must_use]
    pub fn rd_bu_r() -> Self {
        Self::rd_bu().reversed()
    }

    /// Look up a colormap by name.
    ///
    /// Names are case-insensitive; a trailing `_r` reverses the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown name.
    pub fn named(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let (base, reverse) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };

        let cmap = match base {
            "viridis" => Self::viridis(),
            "magma" => Self::magma(),
            "blues" => Self::blues(),
            "heat" | "hot" => Self::heat(),
            "greys" | "grays" | "greyscale" | "grayscale" => Self::greys(),
            "rdbu" | "red_blue" => Self::rd_bu(),
            _ => return Err(Error::config(format!("unknown colormap '{name}'"))),
        };

        Ok(if reverse { cmap.reversed() } else { cmap })
    }

    /// A listed colormap from an explicit discrete palette.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `colors` is empty.
    pub fn listed(colors: Vec<Rgba>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::config("colors must contain at least one color"));
        }
        Ok(Self {
            name: "listed".to_string(),
            stops: colors,
            kind: ColormapKind::Listed,
        })
    }

    /// The same map traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix("_r") {
            Some(base) => base.to_string(),
            None => format!("{}_r", self.name),
        };
        let mut stops = self.stops.clone();
        stops.reverse();
        Self {
            name,
            stops,
            kind: self.kind,
        }
    }

    /// Colormap name (`listed` for explicit palettes).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the map is meant to be read.
    #[must_use]
    pub const fn kind(&self) -> ColormapKind {
        self.kind
    }

    /// Color stops.
    #[must_use]
    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    /// Color at `t` in `[0, 1]` (clamped).
    #[must_use]
    pub fn sample(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        if self.stops.len() == 1 {
            return self.stops[0];
        }

        if self.kind == ColormapKind::Listed {
            let n = self.stops.len();
            let idx = ((t * n as f32).floor() as usize).min(n - 1);
            return self.stops[idx];
        }

        let segment_count = self.stops.len() - 1;
        let segment = ((t * segment_count as f32).floor() as usize).min(segment_count - 1);
        let local_t = t * segment_count as f32 - segment as f32;

        self.stops[segment].lerp(self.stops[segment + 1], local_t)
    }
}

/// Pick the default palette from the data bounds.
///
/// With `diverging` unset, data with both negative and positive values reads
/// as diverging and anything else as sequential. `Some(_)` forces the choice.
#[must_use]
pub fn choose_colormap(vmin: f32, vmax: f32, diverging: Option<bool>) -> Colormap {
    if diverging.unwrap_or(vmin < 0.0 && vmax > 0.0) {
        Colormap::rd_bu_r()
    } else {
        Colormap::viridis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        assert_eq!(Colormap::named("viridis").unwrap().name(), "viridis");
        assert_eq!(Colormap::named("RdBu_r").unwrap().name(), "RdBu_r");
        assert_eq!(Colormap::named("MAGMA").unwrap().kind(), ColormapKind::Sequential);
        assert_eq!(Colormap::named("rdbu").unwrap().kind(), ColormapKind::Diverging);
    }

    #[test]
    fn test_named_unknown() {
        assert!(matches!(Colormap::named("jet"), Err(Error::Config(_))));
    }

    #[test]
    fn test_reversed_roundtrip_name() {
        let cmap = Colormap::viridis().reversed();
        assert_eq!(cmap.name(), "viridis_r");
        assert_eq!(cmap.reversed().name(), "viridis");
        assert_eq!(cmap.sample(0.0), Colormap::viridis().sample(1.0));
    }

    #[test]
    fn test_rd_bu_r_is_blue_low_red_high() {
        let cmap = Colormap::rd_bu_r();
        let low = cmap.sample(0.0);
        let high = cmap.sample(1.0);
        assert!(low.b > low.r);
        assert!(high.r > high.b);
        let mid = cmap.sample(0.5);
        assert_eq!(mid, Rgba::rgb(247, 247, 247));
    }

    #[test]
    fn test_sample_clamps() {
        let cmap = Colormap::greys();
        assert_eq!(cmap.sample(-1.0), Rgba::WHITE);
        assert_eq!(cmap.sample(2.0), Rgba::BLACK);
        assert_eq!(cmap.sample(f32::NAN), Rgba::WHITE);
    }

    #[test]
    fn test_listed_picks_stop() {
        let cmap = Colormap::listed(vec![Rgba::RED, Rgba::GREEN, Rgba::BLUE]).unwrap();
        assert_eq!(cmap.sample(0.1), Rgba::RED);
        assert_eq!(cmap.sample(0.5), Rgba::GREEN);
        assert_eq!(cmap.sample(1.0), Rgba::BLUE);
        assert!(Colormap::listed(vec![]).is_err());
    }

    #[test]
    fn test_choose_colormap() {
        assert_eq!(choose_colormap(5.0, 50.0, None).name(), DEFAULT_SEQUENTIAL);
        assert_eq!(choose_colormap(-10.0, 30.0, None).name(), DEFAULT_DIVERGING);
        assert_eq!(choose_colormap(0.0, 50.0, None).name(), DEFAULT_SEQUENTIAL);
        assert_eq!(choose_colormap(5.0, 50.0, Some(true)).name(), DEFAULT_DIVERGING);
        assert_eq!(choose_colormap(-10.0, 30.0, Some(false)).name(), DEFAULT_SEQUENTIAL);
    }
}
