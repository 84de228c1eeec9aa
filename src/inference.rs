//! Color-scale inference.
//!
//! Turns finite-value statistics and [`PlotOptions`] into a [`ColorScale`]:
//! bounds, sequential or diverging palette, discrete levels and clipping
//! markers.
//!
//! Rules, in order:
//!
//! 1. Bounds start at the finite min/max, or the 2nd/98th percentiles with
//!    `robust`. Explicit `vmin`/`vmax` win.
//! 2. The scale diverges when the bounds from step 1 straddle the center
//!    (zero unless `center` names one), when `center` is explicit, or when
//!    level edges straddle zero. Giving both `vmin` and `vmax` turns the
//!    inference off. A diverging scale is symmetric around its center.
//! 3. Levels replace the bounds with their first and last edge.
//! 4. Ends are marked clipped when the true data extent reaches past them.

use tracing::{debug, warn};

use crate::array::LabeledData;
use crate::colormap::{choose_colormap, Colormap};
use crate::error::{Error, Result};
use crate::options::{Center, Levels, PlotOptions};
use crate::scale::{ColorScale, Extend};
use crate::stats::{finite_extent, percentile, ROBUST_PERCENTILE};

/// Infer a color scale over `values`.
///
/// # Errors
///
/// - [`Error::EmptyData`] when there are no finite values and the bounds are
///   not both given (and no level edges fix them).
/// - [`Error::Config`] for `colors` with `cmap`, an unknown colormap,
///   malformed levels or `vmin > vmax`.
///
/// # Example
///
/// ```
/// use labelplot::inference::infer_color_scale;
/// use labelplot::options::PlotOptions;
///
/// let scale = infer_color_scale(&[-10.0, 5.0, 30.0], &PlotOptions::new()).unwrap();
/// assert!(scale.is_diverging());
/// assert_eq!((scale.vmin(), scale.vmax()), (-30.0, 30.0));
/// ```
pub fn infer_color_scale(values: &[f32], options: &PlotOptions) -> Result<ColorScale> {
    options.validate()?;

    let extent = finite_extent(values);
    let edges = match &options.levels {
        Some(Levels::Edges(edges)) => Some(edges.as_slice()),
        _ => None,
    };

    let (data_min, data_max) = match (extent, options.vmin, options.vmax, edges) {
        (Some(extent), _, _, _) => {
            if options.robust {
                robust_bounds(values, extent)
            } else {
                extent
            }
        }
        (None, Some(lo), Some(hi), _) => (lo, hi),
        (None, _, _, Some(edges)) => (edges[0], edges[edges.len() - 1]),
        (None, _, _, None) => return Err(Error::EmptyData),
    };

    let user_both = options.vmin.is_some() && options.vmax.is_some();
    let mut vmin = options.vmin.unwrap_or(data_min);
    let mut vmax = options.vmax.unwrap_or(data_max);

    let center = match options.center {
        Center::Value(c) => c,
        Center::Auto | Center::Disabled => 0.0,
    };
    let diverging = match options.center {
        Center::Disabled => false,
        Center::Value(_) => true,
        Center::Auto if user_both => false,
        Center::Auto => {
            let edges_straddle = edges.is_some_and(|e| e[0] < 0.0 && e[e.len() - 1] > 0.0);
            edges_straddle || (vmin < center && vmax > center)
        }
    };

    if diverging {
        match (options.vmin, options.vmax) {
            (Some(lo), None) => vmax = 2.0 * center - lo,
            (None, Some(hi)) => vmin = 2.0 * center - hi,
            (Some(_), Some(_)) => {}
            (None, None) => {
                let half = (vmin - center).abs().max((vmax - center).abs());
                vmin = center - half;
                vmax = center + half;
            }
        }
    }

    if vmin > vmax {
        return Err(Error::config(format!(
            "inferred vmin ({vmin}) exceeds vmax ({vmax}); check the explicit bound"
        )));
    }
    if vmin == vmax {
        (vmin, vmax) = widen(vmin);
    }

    let colormap = if let Some(colors) = &options.colors {
        Colormap::listed(colors.clone())?
    } else if let Some(name) = &options.cmap {
        Colormap::named(name)?
    } else {
        choose_colormap(vmin, vmax, Some(diverging))
    };

    let levels = match (&options.levels, &options.colors) {
        (Some(levels), _) => Some(levels.clone()),
        (None, Some(colors)) => Some(Levels::Count(colors.len())),
        (None, None) => None,
    };

    let mut scale = ColorScale::new(colormap, (vmin, vmax))?.diverging(diverging);
    if let Some(levels) = levels {
        let edges = match levels {
            Levels::Count(n) => equal_bins(vmin, vmax, n),
            Levels::Edges(edges) => edges,
        };
        scale = scale.with_levels(edges)?;
    }

    let extend = options.extend.unwrap_or_else(|| match extent {
        Some((lo, hi)) => Extend::from_flags(lo < scale.vmin(), hi > scale.vmax()),
        None => Extend::Neither,
    });
    let scale = scale.with_extend(extend);

    debug!(
        vmin = scale.vmin(),
        vmax = scale.vmax(),
        diverging,
        colormap = scale.colormap().name(),
        bins = scale.bin_count(),
        extend = ?scale.extend(),
        "inferred color scale"
    );
    Ok(scale)
}

/// Infer a color scale over every finite value of `array`.
///
/// # Errors
///
/// Same as [`infer_color_scale`].
pub fn infer_color_scale_for<A: LabeledData + ?Sized>(
    array: &A,
    options: &PlotOptions,
) -> Result<ColorScale> {
    let values: Vec<f32> = array.finite_values().collect();
    infer_color_scale(&values, options)
}

fn robust_bounds(values: &[f32], extent: (f32, f32)) -> (f32, f32) {
    let lo = percentile(values, ROBUST_PERCENTILE).unwrap_or(extent.0);
    let hi = percentile(values, 100.0 - ROBUST_PERCENTILE).unwrap_or(extent.1);

    let full = extent.1 - extent.0;
    if full > 0.0 && (hi - lo) < 0.5 * full {
        warn!(
            robust_min = lo,
            robust_max = hi,
            data_min = extent.0,
            data_max = extent.1,
            "robust bounds discard more than half of the data range"
        );
    }
    (lo, hi)
}

/// Widen a single value into a range of at least one unit, scaled with its
/// magnitude so the ends stay distinct in `f32`.
fn widen(value: f32) -> (f32, f32) {
    let v = f64::from(value);
    let half = (v.abs() * 1e-3).max(0.5);
    let clamp = |x: f64| x.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32;
    (clamp(v - half), clamp(v + half))
}

/// `n + 1` evenly spaced edges from `lo` to `hi`, with both ends exact.
///
/// Edges that round to the same `f32` merge, so a range narrower than `n`
/// representable steps yields fewer bins.
fn equal_bins(lo: f32, hi: f32, n: usize) -> Vec<f32> {
    let n = n.max(1);
    let step = (f64::from(hi) - f64::from(lo)) / n as f64;
    let mut edges: Vec<f32> = (0..n)
        .map(|i| (f64::from(lo) + step * i as f64) as f32)
        .collect();
    edges.push(hi);
    edges.dedup();
    if edges.len() < n + 1 {
        debug!(requested = n, bins = edges.len() - 1, "merged level edges below f32 resolution");
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::colormap::{DEFAULT_DIVERGING, DEFAULT_SEQUENTIAL};
    use approx::assert_relative_eq;

    #[test]
    fn test_positive_data_sequential_exact_bounds() {
        let scale = infer_color_scale(&[5.0, 20.0, 50.0], &PlotOptions::new()).unwrap();
        assert!(!scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (5.0, 50.0));
        assert_eq!(scale.colormap().name(), DEFAULT_SEQUENTIAL);
        assert_eq!(scale.extend(), Extend::Neither);
    }

    #[test]
    fn test_zero_crossing_diverging_symmetric() {
        let scale = infer_color_scale(&[-10.0, 0.0, 30.0], &PlotOptions::new()).unwrap();
        assert!(scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-30.0, 30.0));
        assert_eq!(scale.colormap().name(), DEFAULT_DIVERGING);
    }

    #[test]
    fn test_nan_and_inf_ignored() {
        let data = [f32::NAN, 5.0, f32::INFINITY, 50.0, f32::NEG_INFINITY];
        let scale = infer_color_scale(&data, &PlotOptions::new()).unwrap();
        assert_eq!((scale.vmin(), scale.vmax()), (5.0, 50.0));
    }

    #[test]
    fn test_empty_data() {
        assert!(matches!(
            infer_color_scale(&[f32::NAN], &PlotOptions::new()),
            Err(Error::EmptyData)
        ));
        let bounded = PlotOptions::new().vmin(0.0).vmax(1.0);
        assert!(infer_color_scale(&[], &bounded).is_ok());
    }

    #[test]
    fn test_robust_uses_percentiles_and_clips() {
        let mut data: Vec<f32> = (0..100).map(|v| v as f32).collect();
        data[0] = -1000.0;
        data[99] = 1000.0;

        let scale = infer_color_scale(&data, &PlotOptions::new().robust(true)).unwrap();
        let lo = percentile(&data, 2.0).unwrap();
        let hi = percentile(&data, 98.0).unwrap();
        assert_relative_eq!(scale.vmin(), lo);
        assert_relative_eq!(scale.vmax(), hi);
        assert!(scale.is_clipped());
        assert_eq!(scale.extend(), Extend::Both);
        // Robust bounds sit above zero, so no diverging palette.
        assert!(!scale.is_diverging());
    }

    #[test]
    fn test_robust_then_diverging() {
        let mut data: Vec<f32> = (-50..50).map(|v| v as f32).collect();
        data[0] = -5000.0;
        let scale = infer_color_scale(&data, &PlotOptions::new().robust(true)).unwrap();
        assert!(scale.is_diverging());
        assert_relative_eq!(scale.vmin(), -scale.vmax());
    }

    #[test]
    fn test_explicit_bounds_disable_diverging() {
        let opts = PlotOptions::new().vmin(-10.0).vmax(30.0);
        let scale = infer_color_scale(&[-10.0, 30.0], &opts).unwrap();
        assert!(!scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-10.0, 30.0));
        assert_eq!(scale.colormap().name(), DEFAULT_SEQUENTIAL);
    }

    #[test]
    fn test_single_bound_mirrored_when_diverging() {
        let scale = infer_color_scale(&[-10.0, 30.0], &PlotOptions::new().vmax(20.0)).unwrap();
        assert!(scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-20.0, 20.0));
        assert_eq!(scale.extend(), Extend::Max);
    }

    #[test]
    fn test_center_value_and_disabled() {
        let centered = PlotOptions::new().center(Center::Value(10.0));
        let scale = infer_color_scale(&[12.0, 40.0], &centered).unwrap();
        assert!(scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-20.0, 40.0));

        let off = PlotOptions::new().center(Center::Disabled);
        let scale = infer_color_scale(&[-10.0, 30.0], &off).unwrap();
        assert!(!scale.is_diverging());
        assert_eq!((scale.vmin(), scale.vmax()), (-10.0, 30.0));
    }

    #[test]
    fn test_explicit_levels() {
        let opts = PlotOptions::new().levels(Levels::Edges(vec![0.0, 12.0, 18.0, 30.0]));
        let scale = infer_color_scale(&[1.0, 29.0], &opts).unwrap();
        assert_eq!(scale.bin_count(), 3);
        assert_eq!(scale.levels(), Some(&[0.0, 12.0, 18.0, 30.0][..]));

        let bad = PlotOptions::new().levels(Levels::Edges(vec![0.0, 30.0, 18.0]));
        assert!(matches!(infer_color_scale(&[1.0], &bad), Err(Error::Config(_))));
    }

    #[test]
    fn test_level_count() {
        let opts = PlotOptions::new().levels(Levels::Count(4));
        let scale = infer_color_scale(&[0.0, 8.0], &opts).unwrap();
        assert_eq!(scale.levels(), Some(&[0.0, 2.0, 4.0, 6.0, 8.0][..]));
    }

    #[test]
    fn test_levels_straddling_zero_diverge() {
        let opts = PlotOptions::new().levels(Levels::Edges(vec![-1.0, 0.0, 1.0]));
        let scale = infer_color_scale(&[0.2, 0.8], &opts).unwrap();
        assert!(scale.is_diverging());
        assert_eq!(scale.extend(), Extend::Neither);
    }

    #[test]
    fn test_extend_from_levels() {
        let opts = PlotOptions::new().levels(Levels::Edges(vec![0.0, 10.0]));
        let scale = infer_color_scale(&[-5.0, 5.0], &opts).unwrap();
        assert_eq!(scale.extend(), Extend::Min);

        let forced = opts.extend(Extend::Both);
        assert_eq!(infer_color_scale(&[5.0], &forced).unwrap().extend(), Extend::Both);
    }

    #[test]
    fn test_colors_imply_levels() {
        let opts = PlotOptions::new().colors(vec![Rgba::RED, Rgba::GREEN, Rgba::BLUE]);
        let scale = infer_color_scale(&[0.0, 3.0], &opts).unwrap();
        assert_eq!(scale.bin_count(), 3);
        assert_eq!(scale.bin_color(0), Rgba::RED);
        assert_eq!(scale.bin_color(2), Rgba::BLUE);
    }

    #[test]
    fn test_colors_with_cmap_is_config_error() {
        let opts = PlotOptions::new().colors(vec![Rgba::RED]).cmap("magma");
        assert!(matches!(infer_color_scale(&[1.0], &opts), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_cmap_is_config_error() {
        let opts = PlotOptions::new().cmap("no-such-map");
        assert!(matches!(infer_color_scale(&[1.0], &opts), Err(Error::Config(_))));
    }

    #[test]
    fn test_degenerate_range_widened() {
        let scale = infer_color_scale(&[7.0, 7.0], &PlotOptions::new()).unwrap();
        assert_eq!((scale.vmin(), scale.vmax()), (6.5, 7.5));

        let zero = infer_color_scale(&[0.0], &PlotOptions::new()).unwrap();
        assert_eq!((zero.vmin(), zero.vmax()), (-0.5, 0.5));
    }

    #[test]
    fn test_vmin_above_data_is_error() {
        let opts = PlotOptions::new().vmin(100.0);
        assert!(matches!(infer_color_scale(&[1.0, 50.0], &opts), Err(Error::Config(_))));
    }

    #[test]
    fn test_large_constant_field_widens() {
        let scale = infer_color_scale(&[1.0e8, 1.0e8], &PlotOptions::new()).unwrap();
        assert!(scale.vmin() < 1.0e8 && 1.0e8 < scale.vmax());
        assert_relative_eq!(scale.vmax() - scale.vmin(), 2.0e5, max_relative = 1e-3);
        assert!(!scale.is_diverging());
    }

    #[test]
    fn test_narrow_large_magnitude_range() {
        let data = [16_777_216.0, 16_777_218.0];
        let scale = infer_color_scale(&data, &PlotOptions::new()).unwrap();
        assert_eq!((scale.vmin(), scale.vmax()), (16_777_216.0, 16_777_218.0));

        let stepped = infer_color_scale(&data, &PlotOptions::new().levels(Levels::Count(10))).unwrap();
        assert_eq!(stepped.levels(), Some(&[16_777_216.0, 16_777_218.0][..]));
    }

    #[test]
    fn test_level_count_below_resolution_merges_bins() {
        let opts = PlotOptions::new().levels(Levels::Count(50));
        let scale = infer_color_scale(&[1.0e6, 1.0e6 + 1.0], &opts).unwrap();
        let edges = scale.levels().unwrap();
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert_eq!((edges[0], edges[edges.len() - 1]), (1.0e6, 1.0e6 + 1.0));
        assert!(scale.bin_count() >= 1 && scale.bin_count() < 50);
    }

    #[test]
    fn test_equal_bins_exact_ends() {
        let edges = equal_bins(0.1, 0.7, 3);
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0], 0.1);
        assert_eq!(edges[3], 0.7);
    }
}
