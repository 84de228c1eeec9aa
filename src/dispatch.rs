//! Plot-kind dispatch.
//!
//! The kind follows from the array's effective rank: one dimension draws a
//! line, two draw a mesh, anything else a histogram of the values. An
//! explicit kind always wins but is checked against the array's shape and
//! coordinate layout.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::array::LabeledData;
use crate::error::{Error, Result};
use crate::options::PlotOptions;
use crate::scale::ColorScale;
use crate::stats::is_evenly_spaced;

/// What to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlotKind {
    /// Polyline over one dimension.
    Line,
    /// Histogram of every finite value.
    Histogram,
    /// One colored quad per cell.
    Mesh,
    /// Iso-lines at the level edges.
    Contour,
    /// Regions between level edges.
    #[cfg_attr(feature = "serde", serde(alias = "contourf"))]
    FilledContour,
    /// Raster over evenly spaced coordinates.
    Image,
}

impl PlotKind {
    /// Whether the kind maps values through a color scale.
    #[must_use]
    pub const fn is_color_mapped(self) -> bool {
        matches!(self, Self::Mesh | Self::Contour | Self::FilledContour | Self::Image)
    }

    /// Whether the kind needs exactly two non-trivial dimensions.
    #[must_use]
    pub const fn is_two_dimensional(self) -> bool {
        self.is_color_mapped()
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Histogram => "histogram",
            Self::Mesh => "mesh",
            Self::Contour => "contour",
            Self::FilledContour => "filled contour",
            Self::Image => "image",
        };
        f.write_str(name)
    }
}

/// The resolved rendering decision for one axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    /// Kind to draw.
    pub kind: PlotKind,
    /// Dimension or coordinate on the horizontal axis.
    pub x: Option<String>,
    /// Dimension or coordinate on the vertical axis.
    pub y: Option<String>,
    /// Dimension drawn as separate lines.
    pub hue: Option<String>,
    /// x axis runs left to right.
    pub xincrease: bool,
    /// y axis runs bottom to top.
    pub yincrease: bool,
    /// Color scale for color-mapped kinds.
    pub color_scale: Option<Arc<ColorScale>>,
}

/// Pick a kind from the effective rank alone.
///
/// # Example
///
/// ```
/// use labelplot::array::LabeledArray;
/// use labelplot::dispatch::{choose_plot_kind, PlotKind};
///
/// let arr = LabeledArray::new(vec![0.0; 6], &["y", "x"], &[2, 3]).unwrap();
/// assert_eq!(choose_plot_kind(&arr), PlotKind::Mesh);
/// ```
#[must_use]
pub fn choose_plot_kind<A: LabeledData + ?Sized>(array: &A) -> PlotKind {
    match array.effective_rank() {
        1 => PlotKind::Line,
        2 => PlotKind::Mesh,
        _ => PlotKind::Histogram,
    }
}

/// Dimensions longer than one, in storage order.
pub(crate) fn active_dims<A: LabeledData + ?Sized>(array: &A) -> Vec<String> {
    array
        .dims()
        .iter()
        .zip(array.shape())
        .filter(|(_, &n)| n > 1)
        .map(|(d, _)| d.clone())
        .collect()
}

/// Explicit kind, or the rank rule with `hue` turning a 2D array into lines.
///
/// # Errors
///
/// Returns [`Error::Shape`] when an explicit kind cannot draw the array and
/// [`Error::Config`] for an unknown `hue`.
pub fn resolve_kind<A: LabeledData + ?Sized>(array: &A, options: &PlotOptions) -> Result<PlotKind> {
    let rank = array.effective_rank();
    let active = active_dims(array);

    if let Some(hue) = &options.hue {
        if !active.contains(hue) {
            return Err(Error::config(format!(
                "hue '{hue}' is not a dimension of length > 1 (dims: {active:?})"
            )));
        }
    }

    let kind = match options.kind {
        Some(kind) => kind,
        None if options.hue.is_some() && rank == 2 => PlotKind::Line,
        None => choose_plot_kind(array),
    };

    match kind {
        PlotKind::Line => {
            let ok = rank == 1 || (rank == 2 && options.hue.is_some());
            if !ok {
                let reason = if rank == 2 {
                    "a 2D line plot needs a hue dimension"
                } else {
                    "lines need one dimension, or two with a hue dimension"
                };
                return Err(Error::shape(kind, rank, reason));
            }
        }
        PlotKind::Histogram => {}
        _ if kind.is_two_dimensional() && rank != 2 => {
            return Err(Error::shape(kind, rank, "needs exactly two dimensions of length > 1"));
        }
        _ => {}
    }

    Ok(kind)
}

/// Resolve kind, axes and directions. The color scale is filled in by the
/// caller.
///
/// # Errors
///
/// Returns [`Error::Shape`] or [`Error::Config`] as described on
/// [`resolve_kind`], plus [`Error::Config`] for unknown or conflicting `x`/`y`
/// names and [`Error::Shape`] for coordinates that cannot describe the grid.
pub fn resolve_plot_spec<A: LabeledData + ?Sized>(array: &A, options: &PlotOptions) -> Result<PlotSpec> {
    let kind = resolve_kind(array, options)?;
    let active = active_dims(array);

    let (x, y) = match kind {
        PlotKind::Histogram => (None, None),
        PlotKind::Line => line_axes(array, options, &active)?,
        _ => grid_axes(array, options, kind, &active)?,
    };

    debug!(%kind, ?x, ?y, hue = ?options.hue, "resolved plot");

    Ok(PlotSpec {
        kind,
        x,
        y,
        hue: if kind == PlotKind::Line { options.hue.clone() } else { None },
        xincrease: options.x_increasing(),
        yincrease: options.y_increasing(),
        color_scale: None,
    })
}

/// Dimensions a named axis spans, or `None` for an unknown name.
fn spanned_dims<A: LabeledData + ?Sized>(array: &A, name: &str) -> Option<Vec<String>> {
    if array.coord(name).is_some() {
        return Some(vec![name.to_string()]);
    }
    array.aux_coord(name).map(|aux| aux.dims().to_vec())
}

fn known<A: LabeledData + ?Sized>(array: &A, name: &str) -> Result<Vec<String>> {
    spanned_dims(array, name).ok_or_else(|| {
        Error::config(format!(
            "'{name}' is neither a dimension nor a coordinate (dims: {:?})",
            array.dims()
        ))
    })
}

fn line_axes<A: LabeledData + ?Sized>(
    array: &A,
    options: &PlotOptions,
    active: &[String],
) -> Result<(Option<String>, Option<String>)> {
    let along: Vec<&String> = active.iter().filter(|d| Some(*d) != options.hue.as_ref()).collect();
    let Some(&line_dim) = along.first() else {
        return Err(Error::shape(PlotKind::Line, active.len(), "no dimension left to draw along"));
    };

    if let Some(x) = &options.x {
        check_line_coord(array, x, line_dim)?;
        return Ok((Some(x.clone()), None));
    }
    if let Some(y) = &options.y {
        check_line_coord(array, y, line_dim)?;
        return Ok((None, Some(y.clone())));
    }
    Ok((Some(line_dim.clone()), None))
}

fn check_line_coord<A: LabeledData + ?Sized>(array: &A, name: &str, line_dim: &str) -> Result<()> {
    let dims = known(array, name)?;
    if dims.len() != 1 || dims[0] != line_dim {
        return Err(Error::config(format!(
            "'{name}' must be a 1D coordinate along '{line_dim}'"
        )));
    }
    Ok(())
}

fn grid_axes<A: LabeledData + ?Sized>(
    array: &A,
    options: &PlotOptions,
    kind: PlotKind,
    active: &[String],
) -> Result<(Option<String>, Option<String>)> {
    let other = |name: &str| -> Result<String> {
        let dims = known(array, name)?;
        if dims.len() != 1 {
            return Err(Error::config(format!(
                "'{name}' spans two dimensions; give both x and y"
            )));
        }
        active
            .iter()
            .find(|d| **d != dims[0])
            .cloned()
            .ok_or_else(|| Error::config(format!("no dimension left besides '{name}'")))
    };

    let (x, y) = match (&options.x, &options.y) {
        (None, None) => (active[1].clone(), active[0].clone()),
        (Some(x), None) => (x.clone(), other(x)?),
        (None, Some(y)) => (other(y)?, y.clone()),
        (Some(x), Some(y)) => (x.clone(), y.clone()),
    };
    if x == y {
        return Err(Error::config(format!("x and y both name '{x}'")));
    }

    let x_dims = known(array, &x)?;
    let y_dims = known(array, &y)?;
    for d in x_dims.iter().chain(&y_dims) {
        if !active.contains(d) {
            return Err(Error::shape(
                kind,
                active.len(),
                format!("coordinate over '{d}' does not broadcast against the data"),
            ));
        }
    }
    let covers_both = active.iter().all(|d| x_dims.contains(d) || y_dims.contains(d));
    if !covers_both {
        return Err(Error::shape(
            kind,
            active.len(),
            format!("x '{x}' and y '{y}' do not span both dimensions {active:?}"),
        ));
    }

    if kind == PlotKind::Image {
        for name in [&x, &y] {
            if spanned_dims(array, name).map_or(0, |d| d.len()) != 1 {
                return Err(Error::shape(kind, 2, format!("'{name}' must be one-dimensional")));
            }
            if let Some(values) = numeric_values(array, name) {
                if !is_evenly_spaced(&values) {
                    return Err(Error::shape(
                        kind,
                        2,
                        format!("'{name}' is not evenly spaced; use a mesh instead"),
                    ));
                }
            }
        }
    }

    Ok((Some(x), Some(y)))
}

/// Numeric values of a dimension coordinate or 1D/2D auxiliary coordinate.
/// Label coordinates yield their positions.
pub(crate) fn numeric_values<A: LabeledData + ?Sized>(array: &A, name: &str) -> Option<Vec<f64>> {
    if let Some(coord) = array.coord(name) {
        return Some(coord.positions());
    }
    array.aux_coord(name).map(|aux| aux.values().to_vec())
}
