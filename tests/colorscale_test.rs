//! Color-scale inference: rules and properties.
//!
//! Run: cargo test --test colorscale_test

#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use labelplot::colormap::{DEFAULT_DIVERGING, DEFAULT_SEQUENTIAL};
use labelplot::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Rules
// ============================================================================

#[test]
fn sequential_for_one_signed_data() {
    let scale = infer_color_scale(&[1.0, 4.0, 9.0], &PlotOptions::new()).unwrap();
    assert!(!scale.is_diverging());
    assert_eq!(scale.colormap().name(), DEFAULT_SEQUENTIAL);
    assert_eq!((scale.vmin(), scale.vmax()), (1.0, 9.0));
    assert_eq!(scale.extend(), Extend::Neither);
}

#[test]
fn diverging_is_symmetric_around_zero() {
    let scale = infer_color_scale(&[-2.0, 1.0, 8.0], &PlotOptions::new()).unwrap();
    assert!(scale.is_diverging());
    assert_eq!(scale.colormap().name(), DEFAULT_DIVERGING);
    assert_eq!((scale.vmin(), scale.vmax()), (-8.0, 8.0));
}

#[test]
fn nan_and_infinities_are_ignored() {
    let values = [f32::NAN, 2.0, f32::INFINITY, 5.0, f32::NEG_INFINITY];
    let scale = infer_color_scale(&values, &PlotOptions::new()).unwrap();
    assert_eq!((scale.vmin(), scale.vmax()), (2.0, 5.0));
}

#[test]
fn robust_zero_crossing_is_diverging_and_symmetric() {
    // Percentiles straddle zero; outliers only widen the raw extent.
    let mut values: Vec<f32> = (-50..=50).map(|v| v as f32 * 0.1).collect();
    values.extend([-1000.0, 2000.0]);
    let scale = infer_color_scale(&values, &PlotOptions::new().robust(true)).unwrap();

    assert!(scale.is_diverging());
    assert_relative_eq!(scale.vmin(), -scale.vmax());
    assert!(scale.vmax() < 100.0);
    assert_eq!(scale.extend(), Extend::Both);
}

#[test]
fn both_bounds_disable_diverging() {
    let opts = PlotOptions::new().vmin(-1.0).vmax(3.0);
    let scale = infer_color_scale(&[-1.0, 3.0], &opts).unwrap();
    assert!(!scale.is_diverging());
    assert_eq!((scale.vmin(), scale.vmax()), (-1.0, 3.0));
}

#[test]
fn center_disabled_keeps_sequential() {
    let opts = PlotOptions::new().center(Center::Disabled);
    let scale = infer_color_scale(&[-4.0, 2.0], &opts).unwrap();
    assert!(!scale.is_diverging());
    assert_eq!((scale.vmin(), scale.vmax()), (-4.0, 2.0));
}

#[test]
fn explicit_center_shifts_midpoint() {
    let opts = PlotOptions::new().center(Center::Value(10.0));
    let scale = infer_color_scale(&[12.0, 16.0], &opts).unwrap();
    assert!(scale.is_diverging());
    assert_eq!((scale.vmin(), scale.vmax()), (4.0, 16.0));
}

#[test]
fn level_edges_set_bounds() {
    let opts = PlotOptions::new().levels(Levels::Edges(vec![0.0, 1.0, 5.0]));
    let scale = infer_color_scale(&[-3.0, 2.0, 9.0], &opts).unwrap();
    assert_eq!((scale.vmin(), scale.vmax()), (0.0, 5.0));
    assert_eq!(scale.bin_count(), 2);
    assert_eq!(scale.extend(), Extend::Both);
}

#[test]
fn colors_imply_levels() {
    let opts = PlotOptions::new().colors(vec![Rgba::RED, Rgba::GREEN, Rgba::BLUE]);
    let scale = infer_color_scale(&[0.0, 3.0], &opts).unwrap();
    assert_eq!(scale.bin_count(), 3);
    assert_eq!(scale.scale(0.5), Rgba::RED);
    assert_eq!(scale.scale(2.9), Rgba::BLUE);
}

#[test]
fn colors_with_cmap_is_config_error() {
    let opts = PlotOptions::new().colors(vec![Rgba::RED]).cmap("viridis");
    assert!(matches!(infer_color_scale(&[1.0], &opts), Err(Error::Config(_))));
}

#[test]
fn non_increasing_levels_are_config_error() {
    let opts = PlotOptions::new().levels(Levels::Edges(vec![0.0, 2.0, 1.0]));
    assert!(matches!(infer_color_scale(&[1.0], &opts), Err(Error::Config(_))));
}

#[test]
fn unknown_colormap_is_config_error() {
    let opts = PlotOptions::new().cmap("no-such-map");
    assert!(matches!(infer_color_scale(&[1.0, 2.0], &opts), Err(Error::Config(_))));
}

#[test]
fn all_nan_is_empty_data() {
    assert!(matches!(
        infer_color_scale(&[f32::NAN, f32::NAN], &PlotOptions::new()),
        Err(Error::EmptyData)
    ));
    let opts = PlotOptions::new().vmin(0.0).vmax(1.0);
    assert!(infer_color_scale(&[f32::NAN], &opts).is_ok());
}

#[test]
fn constant_data_widens() {
    let scale = infer_color_scale(&[3.0, 3.0], &PlotOptions::new()).unwrap();
    assert_eq!((scale.vmin(), scale.vmax()), (2.5, 3.5));
    let zero = infer_color_scale(&[0.0], &PlotOptions::new()).unwrap();
    assert_eq!((zero.vmin(), zero.vmax()), (-0.5, 0.5));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_bounds_contain_data(
        values in prop::collection::vec((-10_000i16..10_000).prop_map(f32::from), 1..64),
    ) {
        let scale = infer_color_scale(&values, &PlotOptions::new()).unwrap();
        for &v in &values {
            prop_assert!(scale.vmin() <= v && v <= scale.vmax());
        }
        prop_assert_eq!(scale.extend(), Extend::Neither);
    }

    #[test]
    fn prop_diverging_is_symmetric(
        neg in prop::collection::vec(-1e4f32..-0.01, 1..16),
        pos in prop::collection::vec(0.01f32..1e4, 1..16),
    ) {
        let values: Vec<f32> = neg.into_iter().chain(pos).collect();
        let scale = infer_color_scale(&values, &PlotOptions::new()).unwrap();
        prop_assert!(scale.is_diverging());
        prop_assert_eq!(scale.vmin(), -scale.vmax());
    }

    #[test]
    fn prop_level_count_gives_equal_bins(
        values in prop::collection::vec((0u8..100).prop_map(f32::from), 2..32),
        n in 1usize..12,
    ) {
        let scale = infer_color_scale(&values, &PlotOptions::new().levels(Levels::Count(n))).unwrap();
        let edges = scale.levels().unwrap();
        prop_assert_eq!(scale.bin_count(), n);
        prop_assert_eq!(edges.len(), n + 1);
        prop_assert_eq!(edges[0], scale.vmin());
        prop_assert_eq!(edges[n], scale.vmax());
        prop_assert!(edges.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_extend_reports_clipping(
        values in prop::collection::vec(-100.0f32..100.0, 1..32),
        lo in -50.0f32..0.0,
        hi in 0.0f32..50.0,
    ) {
        let opts = PlotOptions::new().vmin(lo).vmax(hi.max(lo + 1.0));
        let scale = infer_color_scale(&values, &opts).unwrap();
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert_eq!(scale.extend().extends_min(), min < scale.vmin());
        prop_assert_eq!(scale.extend().extends_max(), max > scale.vmax());
    }
}
