//! Plot configuration.
//!
//! [`PlotOptions`] enumerates every recognized option with its type. Fields
//! are public; builder methods cover the common cases. With the `config`
//! feature options load from YAML.

use crate::color::Rgba;
use crate::dispatch::PlotKind;
use crate::error::{Error, Result};
use crate::plots::BinStrategy;
use crate::scale::{validate_level_edges, Extend};

/// Discrete color levels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Levels {
    /// `n` equal-width bins over the inferred bounds.
    Count(usize),
    /// Explicit, strictly increasing bin edges.
    Edges(Vec<f32>),
}

/// Midpoint of a diverging color scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Center {
    /// Center on zero when the data crosses zero.
    #[default]
    Auto,
    /// Always diverge around this value.
    Value(f32),
    /// Never diverge.
    Disabled,
}

/// Options passed through to the kind-specific drawer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KindOptions {
    /// Line color; hue series use the color wheel when unset.
    pub line_color: Option<Rgba>,
    /// Line thickness in pixels.
    pub line_thickness: f32,
    /// Draw a marker at each line point.
    pub markers: bool,
    /// Histogram binning.
    pub bins: BinStrategy,
    /// Histogram bar color.
    pub bar_color: Rgba,
    /// Outline color for mesh cells.
    pub mesh_borders: Option<Rgba>,
}

impl Default for KindOptions {
    fn default() -> Self {
        Self {
            line_color: None,
            line_thickness: 1.5,
            markers: false,
            bins: BinStrategy::default(),
            bar_color: Rgba::rgb(70, 130, 180),
            mesh_borders: None,
        }
    }
}

/// Everything `plot` and `FacetGrid` accept.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlotOptions {
    /// Explicit plot kind; inferred from the array when unset.
    pub kind: Option<PlotKind>,
    /// Dimension or coordinate on the horizontal axis.
    pub x: Option<String>,
    /// Dimension or coordinate on the vertical axis.
    pub y: Option<String>,
    /// Dimension drawn as one line per value.
    pub hue: Option<String>,
    /// Facet rows.
    pub row: Option<String>,
    /// Facet columns.
    pub col: Option<String>,
    /// Wrap a column-only facet after this many columns.
    pub col_wrap: Option<usize>,
    /// Use 2nd/98th percentiles as color bounds.
    pub robust: bool,
    /// Discrete color levels.
    pub levels: Option<Levels>,
    /// Explicit discrete palette.
    pub colors: Option<Vec<Rgba>>,
    /// Colormap name.
    pub cmap: Option<String>,
    /// Lower color bound.
    pub vmin: Option<f32>,
    /// Upper color bound.
    pub vmax: Option<f32>,
    /// Diverging midpoint.
    pub center: Center,
    /// Explicit clipping markers.
    pub extend: Option<Extend>,
    /// `Some(false)` flips the x axis.
    pub xincrease: Option<bool>,
    /// `Some(false)` flips the y axis.
    pub yincrease: Option<bool>,
    /// Draw a colorbar; defaults to on for color-mapped kinds.
    pub add_colorbar: Option<bool>,
    /// Draw titles and axis labels.
    pub add_labels: bool,
    /// Pixel width of one axes.
    pub width: u32,
    /// Pixel height of one axes.
    pub height: u32,
    /// Kind-specific options.
    pub kind_options: KindOptions,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            kind: None,
            x: None,
            y: None,
            hue: None,
            row: None,
            col: None,
            col_wrap: None,
            robust: false,
            levels: None,
            colors: None,
            cmap: None,
            vmin: None,
            vmax: None,
            center: Center::Auto,
            extend: None,
            xincrease: None,
            yincrease: None,
            add_colorbar: None,
            add_labels: true,
            width: 400,
            height: 300,
            kind_options: KindOptions::default(),
        }
    }
}

impl PlotOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a plot kind.
    #[must_use]
    pub fn kind(mut self, kind: PlotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Horizontal axis dimension or coordinate.
    #[must_use]
    pub fn x(mut self, dim: &str) -> Self {
        self.x = Some(dim.to_string());
        self
    }

    /// Vertical axis dimension or coordinate.
    #[must_use]
    pub fn y(mut self, dim: &str) -> Self {
        self.y = Some(dim.to_string());
        self
    }

    /// One line per value of `dim`.
    #[must_use]
    pub fn hue(mut self, dim: &str) -> Self {
        self.hue = Some(dim.to_string());
        self
    }

    /// Facet rows.
    #[must_use]
    pub fn row(mut self, dim: &str) -> Self {
        self.row = Some(dim.to_string());
        self
    }

    /// Facet columns.
    #[must_use]
    pub fn col(mut self, dim: &str) -> Self {
        self.col = Some(dim.to_string());
        self
    }

    /// Wrap facet columns.
    #[must_use]
    pub fn col_wrap(mut self, wrap: usize) -> Self {
        self.col_wrap = Some(wrap);
        self
    }

    /// Percentile color bounds.
    #[must_use]
    pub fn robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    /// Discrete color levels.
    #[must_use]
    pub fn levels(mut self, levels: Levels) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Explicit palette.
    #[must_use]
    pub fn colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Named colormap.
    #[must_use]
    pub fn cmap(mut self, name: &str) -> Self {
        self.cmap = Some(name.to_string());
        self
    }

    /// Lower color bound.
    #[must_use]
    pub fn vmin(mut self, vmin: f32) -> Self {
        self.vmin = Some(vmin);
        self
    }

    /// Upper color bound.
    #[must_use]
    pub fn vmax(mut self, vmax: f32) -> Self {
        self.vmax = Some(vmax);
        self
    }

    /// Diverging midpoint.
    #[must_use]
    pub fn center(mut self, center: Center) -> Self {
        self.center = center;
        self
    }

    /// Explicit clipping markers.
    #[must_use]
    pub fn extend(mut self, extend: Extend) -> Self {
        self.extend = Some(extend);
        self
    }

    /// Axis directions.
    #[must_use]
    pub fn increase(mut self, x: bool, y: bool) -> Self {
        self.xincrease = Some(x);
        self.yincrease = Some(y);
        self
    }

    /// Toggle the colorbar.
    #[must_use]
    pub fn add_colorbar(mut self, add: bool) -> Self {
        self.add_colorbar = Some(add);
        self
    }

    /// Toggle titles and axis labels.
    #[must_use]
    pub fn add_labels(mut self, add: bool) -> Self {
        self.add_labels = add;
        self
    }

    /// Pixel size of one axes.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Kind-specific options.
    #[must_use]
    pub fn kind_options(mut self, kind_options: KindOptions) -> Self {
        self.kind_options = kind_options;
        self
    }

    /// Check option combinations that are wrong regardless of the data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for `colors` with `cmap`, `col_wrap` with
    /// `row`, `col_wrap == 0`, `vmin > vmax`, malformed levels, and
    /// [`Error::InvalidDimensions`] for a zero-sized axes.
    pub fn validate(&self) -> Result<()> {
        if self.colors.is_some() && self.cmap.is_some() {
            return Err(Error::config("cannot specify both 'colors' and 'cmap'"));
        }
        if self.col_wrap.is_some() && self.row.is_some() {
            return Err(Error::config("cannot use 'col_wrap' together with 'row'"));
        }
        if self.col_wrap == Some(0) {
            return Err(Error::config("'col_wrap' must be at least 1"));
        }
        if let (Some(lo), Some(hi)) = (self.vmin, self.vmax) {
            if lo > hi {
                return Err(Error::config(format!("vmin ({lo}) is greater than vmax ({hi})")));
            }
        }
        if let Some(colors) = &self.colors {
            if colors.is_empty() {
                return Err(Error::config("'colors' must contain at least one color"));
            }
        }
        match &self.levels {
            Some(Levels::Count(0)) => {
                return Err(Error::config("level count must be at least 1"));
            }
            Some(Levels::Edges(edges)) => validate_level_edges(edges)?,
            _ => {}
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Whether the x axis runs left to right.
    #[must_use]
    pub fn x_increasing(&self) -> bool {
        self.xincrease.unwrap_or(true)
    }

    /// Whether the y axis runs bottom to top.
    #[must_use]
    pub fn y_increasing(&self) -> bool {
        self.yincrease.unwrap_or(true)
    }
}

#[cfg(feature = "config")]
impl PlotOptions {
    /// Parse options from YAML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] on malformed input and [`Error::Config`] for
    /// invalid combinations.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml_ng::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize options as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}
