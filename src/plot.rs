//! Single-axes plotting entry points.
//!
//! [`plot`] squeezes the array, resolves a [`PlotSpec`], infers the color
//! scale for color-mapped kinds and draws into a fresh [`Axes`]. [`plot_on`]
//! draws into an existing one.
//!
//! The drawing itself is split into a [`Layer`] (what to draw, built from the
//! array) and [`draw`] (ranges, ticks, labels). Facet grids reuse both so all
//! cells can share ranges computed from every layer.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::array::{Coordinate, LabeledArray, LabeledData};
use crate::axes::{label_ticks, numeric_ticks, Axes, Tick};
use crate::color::hue_wheel;
use crate::dispatch::{numeric_values, resolve_plot_spec, PlotKind, PlotSpec};
use crate::error::{Error, Result};
use crate::inference::infer_color_scale_for;
use crate::options::{Levels, PlotOptions};
use crate::plots::{Contour, GridCoords, Histogram, Image, LinePlot, LineSeries, Mesh};
use crate::scale::ColorScale;

/// Levels drawn by contour kinds when none are requested.
pub const DEFAULT_CONTOUR_LEVELS: usize = 7;

/// Relative padding added around line values.
const LINE_PADDING: f64 = 0.05;

/// `((x_lo, x_hi), (y_lo, y_hi))` in data units.
pub(crate) type Extent = ((f64, f64), (f64, f64));

/// Plot `array` into a new axes of `options.width` x `options.height`.
///
/// # Errors
///
/// Returns [`Error::Config`] for invalid or conflicting options,
/// [`Error::Shape`] when the requested kind cannot draw the array, and
/// [`Error::EmptyData`] when a color-mapped kind has no finite values.
///
/// # Example
///
/// ```
/// use labelplot::array::LabeledArray;
/// use labelplot::dispatch::PlotKind;
/// use labelplot::options::PlotOptions;
/// use labelplot::plot::plot;
///
/// let arr = LabeledArray::new((0..12).map(|v| v as f32).collect(), &["y", "x"], &[3, 4]).unwrap();
/// let axes = plot(&arr, &PlotOptions::new()).unwrap();
/// assert_eq!(axes.spec().map(|s| s.kind), Some(PlotKind::Mesh));
/// ```
pub fn plot(array: &LabeledArray, options: &PlotOptions) -> Result<Axes> {
    options.validate()?;
    let mut axes = Axes::new(options.width, options.height)?;
    plot_on(array, &mut axes, options)?;
    Ok(axes)
}

/// Plot `array` into `axes`.
///
/// # Errors
///
/// Same as [`plot`]. `row`/`col` are rejected; use
/// [`FacetGrid`](crate::facet::FacetGrid) for small multiples.
pub fn plot_on(array: &LabeledArray, axes: &mut Axes, options: &PlotOptions) -> Result<()> {
    options.validate()?;
    if options.row.is_some() || options.col.is_some() {
        return Err(Error::config(
            "'row' and 'col' need a facet grid; use FacetGrid::new",
        ));
    }

    let array = array.squeeze();
    let mut spec = resolve_plot_spec(&array, options)?;
    if spec.kind.is_color_mapped() {
        let scale = infer_color_scale_for(&array, &scale_options(spec.kind, options))?;
        spec.color_scale = Some(Arc::new(scale));
    }

    let layer = Layer::build(&array, &spec, options, None)?;
    let extent = layer.extent();
    draw(&array, &spec, options, &layer, extent, axes)
}

/// Options used for color-scale inference: contour kinds get default levels.
pub(crate) fn scale_options(kind: PlotKind, options: &PlotOptions) -> Cow<'_, PlotOptions> {
    let contour = matches!(kind, PlotKind::Contour | PlotKind::FilledContour);
    if contour && options.levels.is_none() && options.colors.is_none() {
        let mut owned = options.clone();
        owned.levels = Some(Levels::Count(DEFAULT_CONTOUR_LEVELS));
        Cow::Owned(owned)
    } else {
        Cow::Borrowed(options)
    }
}

// ============================================================================
// Layers
// ============================================================================

/// What one axes draws, built from a squeezed array.
#[derive(Debug, Clone)]
pub(crate) enum Layer {
    /// One or more line series; `horizontal` puts values on x.
    Lines { plot: LinePlot, horizontal: bool },
    Histogram(Histogram),
    Mesh(Mesh),
    Contour(Contour),
    Image(Image),
    /// No finite values.
    Empty,
}

impl Layer {
    /// Build the layer for `spec`. `bin_range` shares histogram bins
    /// between facets.
    pub(crate) fn build(
        array: &LabeledArray,
        spec: &PlotSpec,
        options: &PlotOptions,
        bin_range: Option<(f32, f32)>,
    ) -> Result<Self> {
        match spec.kind {
            PlotKind::Line => line_layer(array, spec, options),
            PlotKind::Histogram => {
                let mut hist = Histogram::new()
                    .data(array.finite_values())
                    .bins(options.kind_options.bins)
                    .color(options.kind_options.bar_color);
                if let Some((lo, hi)) = bin_range {
                    hist = hist.range(lo, hi);
                }
                match hist.build() {
                    Ok(hist) => Ok(Self::Histogram(hist)),
                    Err(Error::EmptyData) => Ok(Self::Empty),
                    Err(e) => Err(e),
                }
            }
            kind => grid_layer(array, spec, options, kind),
        }
    }

    /// Data extent of what will be drawn, `None` when empty.
    pub(crate) fn extent(&self) -> Option<Extent> {
        match self {
            Self::Lines { plot, horizontal } => {
                let (x, y) = plot.data_extent()?;
                if *horizontal {
                    Some((pad(x), y))
                } else {
                    Some((x, pad(y)))
                }
            }
            Self::Histogram(hist) => {
                let (lo, hi) = hist.bin_range()?;
                let top = hist.max_count().max(1) as f64 * 1.05;
                Some(((f64::from(lo), f64::from(hi)), (0.0, top)))
            }
            Self::Mesh(mesh) => mesh.extent(),
            Self::Contour(contour) => contour.extent(),
            Self::Image(image) => image.extent(),
            Self::Empty => None,
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    const fn is_horizontal(&self) -> bool {
        matches!(self, Self::Lines { horizontal: true, .. })
    }

    fn render(&self, axes: &mut Axes, scale: Option<&ColorScale>) -> Result<()> {
        let needs_scale = || {
            scale.ok_or_else(|| Error::config("color-mapped plot has no color scale"))
        };
        match self {
            Self::Lines { plot, .. } => plot.render(axes),
            Self::Histogram(hist) => hist.render(axes),
            Self::Mesh(mesh) => mesh.render(axes, needs_scale()?),
            Self::Contour(contour) => contour.render(axes, needs_scale()?),
            Self::Image(image) => image.render(axes, needs_scale()?),
            Self::Empty => Ok(()),
        }
    }
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    let margin = (hi - lo) * LINE_PADDING;
    (lo - margin, hi + margin)
}

fn line_layer(array: &LabeledArray, spec: &PlotSpec, options: &PlotOptions) -> Result<Layer> {
    let horizontal = spec.y.is_some();
    let Some(axis_name) = spec.x.as_deref().or(spec.y.as_deref()) else {
        return Err(Error::shape(PlotKind::Line, array.effective_rank(), "no axis coordinate"));
    };
    let kind_options = &options.kind_options;

    // (series name, 1D slice) pairs; a hue dimension splits the array.
    let slices: Vec<(String, LabeledArray)> = match &spec.hue {
        Some(hue) => {
            let coord = array.coord(hue);
            let n = array.extent(hue).unwrap_or(0);
            (0..n)
                .map(|i| {
                    let name = coord
                        .and_then(|c| c.value(i))
                        .map_or_else(|| i.to_string(), |v| v.to_string());
                    Ok((name, array.isel(hue, i)?))
                })
                .collect::<Result<_>>()?
        }
        None => vec![(array.name().unwrap_or_default().to_string(), array.clone())],
    };

    let colors = hue_wheel(slices.len());
    let mut plot = LinePlot::new()
        .markers(kind_options.markers)
        .marker_size(kind_options.line_thickness * 3.0);

    for (i, (name, slice)) in slices.into_iter().enumerate() {
        let positions = numeric_values(&slice, axis_name).ok_or_else(|| {
            Error::config(format!("'{axis_name}' is not a coordinate of the line"))
        })?;
        let values: Vec<f64> = slice.data().iter().map(|&v| f64::from(v)).collect();
        let color = match (kind_options.line_color, &spec.hue) {
            (Some(color), None) => color,
            _ => colors[i],
        };

        let (x, y) = if horizontal { (values, positions) } else { (positions, values) };
        plot = plot.add_series(
            LineSeries::new(name)
                .data(x, y)
                .color(color)
                .thickness(kind_options.line_thickness),
        );
    }

    let plot = plot.build()?;
    if plot.data_extent().is_none() {
        return Ok(Layer::Empty);
    }
    Ok(Layer::Lines { plot, horizontal })
}

fn grid_layer(
    array: &LabeledArray,
    spec: &PlotSpec,
    options: &PlotOptions,
    kind: PlotKind,
) -> Result<Layer> {
    let (Some(x), Some(y)) = (spec.x.as_deref(), spec.y.as_deref()) else {
        return Err(Error::shape(kind, array.effective_rank(), "needs x and y coordinates"));
    };
    if array.ndim() != 2 {
        return Err(Error::shape(kind, array.effective_rank(), "needs exactly two dimensions"));
    }

    let array = orient(array, x, y)?;
    let (rows, cols) = (array.shape()[0], array.shape()[1]);
    let values = array.data().to_vec();

    match kind {
        PlotKind::Image => {
            let xs = numeric_values(&*array, x).unwrap_or_default();
            let ys = numeric_values(&*array, y).unwrap_or_default();
            Ok(Layer::Image(Image::new(values, xs, ys).build()?))
        }
        _ => {
            let grid = GridCoords::new(
                rows,
                cols,
                broadcast(&array, x, kind)?,
                broadcast(&array, y, kind)?,
            )?;
            match kind {
                PlotKind::Contour => Ok(Layer::Contour(Contour::lines(values, grid).build()?)),
                PlotKind::FilledContour => {
                    Ok(Layer::Contour(Contour::filled(values, grid).build()?))
                }
                _ => Ok(Layer::Mesh(
                    Mesh::new(values, grid)
                        .borders(options.kind_options.mesh_borders)
                        .build()?,
                )),
            }
        }
    }
}

fn spanned(array: &LabeledArray, name: &str) -> Vec<String> {
    if array.coord(name).is_some() {
        vec![name.to_string()]
    } else {
        array.aux_coord(name).map(|a| a.dims().to_vec()).unwrap_or_default()
    }
}

/// Transpose so a 1D `x` runs along columns and a 1D `y` along rows.
fn orient<'a>(array: &'a LabeledArray, x: &str, y: &str) -> Result<Cow<'a, LabeledArray>> {
    let dims = array.dims();
    let flipped = spanned(array, x) == [dims[0].clone()] || spanned(array, y) == [dims[1].clone()];
    if flipped {
        let order = [dims[1].as_str(), dims[0].as_str()];
        Ok(Cow::Owned(array.transpose(&order)?))
    } else {
        Ok(Cow::Borrowed(array))
    }
}

/// Values of `name` at every cell center, row-major.
fn broadcast(array: &LabeledArray, name: &str, kind: PlotKind) -> Result<Vec<f64>> {
    let dims = array.dims();
    let (rows, cols) = (array.shape()[0], array.shape()[1]);
    let values = numeric_values(array, name)
        .ok_or_else(|| Error::config(format!("unknown coordinate '{name}'")))?;
    let spans = spanned(array, name);

    match spans.as_slice() {
        [d] if *d == dims[1] => Ok((0..rows).flat_map(|_| values.iter().copied()).collect()),
        [d] if *d == dims[0] => Ok(values
            .iter()
            .flat_map(|&v| std::iter::repeat(v).take(cols))
            .collect()),
        [a, b] if *a == dims[0] && *b == dims[1] => Ok(values),
        [a, b] if *a == dims[1] && *b == dims[0] => Ok((0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| values[c * rows + r])
            .collect()),
        _ => Err(Error::shape(
            kind,
            2,
            format!("'{name}' does not broadcast against dimensions {dims:?}"),
        )),
    }
}

// ============================================================================
// Drawing
// ============================================================================

fn axis_ticks(array: &LabeledArray, name: Option<&str>, range: (f64, f64)) -> Vec<Tick> {
    match name.and_then(|n| array.coord(n)) {
        Some(Coordinate::Labels(labels)) => label_ticks(labels),
        _ => numeric_ticks(range),
    }
}

/// Axis labels: coordinate names, with the array label on the value axis.
pub(crate) fn set_axis_labels(array: &LabeledArray, spec: &PlotSpec, layer: &Layer, axes: &mut Axes) {
    let label = array.label();
    let (xlabel, ylabel) = match spec.kind {
        PlotKind::Histogram => (Some(label), None),
        PlotKind::Line if layer.is_horizontal() => (Some(label), spec.y.clone()),
        PlotKind::Line => (spec.x.clone(), Some(label)),
        _ => (spec.x.clone(), spec.y.clone()),
    };
    if let Some(xlabel) = xlabel.filter(|l| !l.is_empty()) {
        axes.set_xlabel(xlabel);
    }
    if let Some(ylabel) = ylabel.filter(|l| !l.is_empty()) {
        axes.set_ylabel(ylabel);
    }
}

/// Draw `layer` into `axes` over `extent`, then ticks, frame and labels.
pub(crate) fn draw(
    array: &LabeledArray,
    spec: &PlotSpec,
    options: &PlotOptions,
    layer: &Layer,
    extent: Option<Extent>,
    axes: &mut Axes,
) -> Result<()> {
    let ((x0, x1), (y0, y1)) = extent.unwrap_or(((0.0, 1.0), (0.0, 1.0)));
    axes.set_x_range(x0, x1);
    axes.set_y_range(y0, y1);
    axes.set_direction(spec.xincrease, spec.yincrease);

    let horizontal = layer.is_horizontal();
    let (x_coord, y_coord) = match spec.kind {
        PlotKind::Histogram => (None, None),
        PlotKind::Line if horizontal => (None, spec.y.as_deref()),
        PlotKind::Line => (spec.x.as_deref(), None),
        _ => (spec.x.as_deref(), spec.y.as_deref()),
    };
    axes.set_x_ticks(axis_ticks(array, x_coord, axes.x_range()));
    axes.set_y_ticks(axis_ticks(array, y_coord, axes.y_range()));

    layer.render(axes, spec.color_scale.as_deref())?;
    if layer.is_empty() {
        axes.mark_empty();
    }
    axes.draw_frame();

    if let Layer::Lines { plot, .. } = layer {
        if spec.hue.is_some() {
            for series in plot.series() {
                axes.add_legend_entry(series.name.clone(), series.color);
            }
        }
    }

    if options.add_labels {
        let title = array.scalar_title();
        if !title.is_empty() {
            axes.set_title(title);
        }
        set_axis_labels(array, spec, layer, axes);
    }

    if let Some(scale) = &spec.color_scale {
        if options.add_colorbar.unwrap_or(spec.kind.is_color_mapped()) {
            let label = array.label();
            let cb_label = (!label.is_empty()).then_some(label);
            axes.set_colorbar(Arc::clone(scale), cb_label);
        }
    }

    debug!(kind = %spec.kind, empty = layer.is_empty(), x = ?axes.x_range(), y = ?axes.y_range(), "drew axes");
    axes.set_spec(spec.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Center;

    fn grid(rows: usize, cols: usize) -> LabeledArray {
        LabeledArray::new(
            (0..rows * cols).map(|v| v as f32).collect(),
            &["y", "x"],
            &[rows, cols],
        )
        .unwrap()
    }

    #[test]
    fn test_plot_mesh_with_colorbar() {
        let arr = grid(3, 4).with_name("t").with_units("K");
        let axes = plot(&arr, &PlotOptions::new()).unwrap();
        let spec = axes.spec().unwrap();
        assert_eq!(spec.kind, PlotKind::Mesh);
        assert!(spec.color_scale.is_some());
        assert!(axes.colorbar().is_some());
        assert_eq!(axes.colorbar_label(), Some("t [K]"));
        assert_eq!(axes.xlabel(), Some("x"));
        assert_eq!(axes.ylabel(), Some("y"));
    }

    #[test]
    fn test_plot_line_squeezes_and_titles() {
        let arr = LabeledArray::new(vec![1.0, 2.0, 3.0], &["time", "x"], &[1, 3])
            .unwrap()
            .with_coord("time", Coordinate::Numeric(vec![2020.0]))
            .unwrap();
        let axes = plot(&arr, &PlotOptions::new()).unwrap();
        assert_eq!(axes.spec().unwrap().kind, PlotKind::Line);
        assert_eq!(axes.title(), Some("time = 2020"));
        assert!(axes.colorbar().is_none());
    }

    #[test]
    fn test_line_y_padding() {
        let arr = LabeledArray::new(vec![0.0, 10.0], &["x"], &[2]).unwrap();
        let axes = plot(&arr, &PlotOptions::new()).unwrap();
        let (lo, hi) = axes.y_range();
        assert!((lo + 0.5).abs() < 1e-9 && (hi - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_hue_lines_get_legend() {
        let arr = grid(3, 5)
            .with_coord("y", Coordinate::labels(&["a", "b", "c"]))
            .unwrap();
        let axes = plot(&arr, &PlotOptions::new().hue("y")).unwrap();
        assert_eq!(axes.spec().unwrap().kind, PlotKind::Line);
        let names: Vec<&str> = axes.legend().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_ne!(axes.legend()[0].1, axes.legend()[1].1);
    }

    #[test]
    fn test_horizontal_line() {
        let arr = LabeledArray::new(vec![5.0, 6.0, 7.0], &["depth"], &[3]).unwrap();
        let axes = plot(&arr, &PlotOptions::new().y("depth")).unwrap();
        assert_eq!(axes.ylabel(), Some("depth"));
        let (lo, hi) = axes.y_range();
        assert_eq!((lo, hi), (0.0, 2.0));
    }

    #[test]
    fn test_histogram_of_3d() {
        let arr = LabeledArray::new((0..24).map(|v| v as f32).collect(), &["a", "b", "c"], &[2, 3, 4])
            .unwrap();
        let axes = plot(&arr, &PlotOptions::new()).unwrap();
        assert_eq!(axes.spec().unwrap().kind, PlotKind::Histogram);
        assert_eq!(axes.y_range().0, 0.0);
    }

    #[test]
    fn test_all_nan_line_is_empty_axes() {
        let arr = LabeledArray::new(vec![f32::NAN; 4], &["x"], &[4]).unwrap();
        let axes = plot(&arr, &PlotOptions::new()).unwrap();
        assert!(axes.is_empty());
    }

    #[test]
    fn test_all_nan_mesh_errors() {
        let arr = LabeledArray::new(vec![f32::NAN; 4], &["y", "x"], &[2, 2]).unwrap();
        assert!(matches!(plot(&arr, &PlotOptions::new()), Err(Error::EmptyData)));
    }

    #[test]
    fn test_contour_defaults_to_seven_levels() {
        let arr = grid(4, 4);
        let axes = plot(&arr, &PlotOptions::new().kind(PlotKind::Contour)).unwrap();
        let scale = axes.spec().unwrap().color_scale.clone().unwrap();
        assert_eq!(scale.bin_count(), DEFAULT_CONTOUR_LEVELS);
    }

    #[test]
    fn test_contour_on_line_is_shape_error() {
        let arr = LabeledArray::new(vec![1.0, 2.0, 3.0], &["x"], &[3]).unwrap();
        let err = plot(&arr, &PlotOptions::new().kind(PlotKind::Contour)).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_swapped_axes_transposes_image() {
        let arr = grid(2, 3);
        let axes = plot(&arr, &PlotOptions::new().kind(PlotKind::Image).x("y")).unwrap();
        let spec = axes.spec().unwrap();
        assert_eq!(spec.x.as_deref(), Some("y"));
        assert_eq!(axes.x_range(), (-0.5, 1.5));
        assert_eq!(axes.y_range(), (-0.5, 2.5));
    }

    #[test]
    fn test_curvilinear_mesh() {
        let lon: Vec<f64> = (0..6).map(|i| f64::from(i % 3) * 10.0 + f64::from(i / 3)).collect();
        let lat: Vec<f64> = (0..6).map(|i| f64::from(i / 3) * 5.0).collect();
        let arr = grid(2, 3)
            .with_aux_coord("lon", &["y", "x"], lon)
            .unwrap()
            .with_aux_coord("lat", &["y", "x"], lat)
            .unwrap();
        let axes = plot(&arr, &PlotOptions::new().x("lon").y("lat")).unwrap();
        let (x0, x1) = axes.x_range();
        assert!(x0 < 0.0 && x1 > 21.0);
    }

    #[test]
    fn test_flipped_direction() {
        let arr = grid(2, 2);
        let axes = plot(&arr, &PlotOptions::new().increase(false, true)).unwrap();
        assert!(!axes.x_increasing());
        assert!(axes.y_increasing());
    }

    #[test]
    fn test_row_col_rejected() {
        let arr = grid(2, 2);
        assert!(matches!(
            plot(&arr, &PlotOptions::new().col("x")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_explicit_center_diverges() {
        let arr = grid(2, 2);
        let axes = plot(&arr, &PlotOptions::new().center(Center::Value(1.0))).unwrap();
        let scale = axes.spec().unwrap().color_scale.clone().unwrap();
        assert!(scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-1.0, 3.0));
    }
}
