//! # labelplot
//!
//! Plotting for labeled multi-dimensional arrays.
//!
//! Given an array with named dimensions and coordinates, labelplot picks a
//! plot kind from its shape, infers a color scale from its finite values and
//! renders into its own framebuffer. Facet grids draw small multiples of one
//! array keyed by one or two grouping dimensions, all sharing one scale.
//!
//! ## Features
//!
//! - **Shape dispatch**: one dimension draws a line, two a mesh, anything
//!   else a histogram; explicit kinds are validated against the array
//! - **Color-scale inference**: robust percentiles, diverging palettes
//!   around a center, discrete levels and clipping markers
//! - **Facet grids**: column, row and wrapped layouts with shared ranges
//! - **Pure Rust output**: PNG and SVG, no system libraries
//!
//! ## Quick Start
//!
//! ```rust
//! use labelplot::prelude::*;
//!
//! let data: Vec<f32> = (0..12).map(|v| v as f32 - 6.0).collect();
//! let arr = LabeledArray::new(data, &["lat", "lon"], &[3, 4])?;
//!
//! let axes = plot(&arr, &PlotOptions::new())?;
//! let scale = axes.colorbar().expect("mesh has a colorbar");
//! assert!(scale.is_diverging());
//!
//! let png = Figure::from_axes(axes).to_png_bytes()?;
//! assert!(!png.is_empty());
//! # Ok::<(), labelplot::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for options and colors
//! - `config`: load [`PlotOptions`](options::PlotOptions) from YAML
//!
//! ## References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Lorensen, W. E., & Cline, H. E. (1987). Marching Cubes. SIGGRAPH '87.
//! - Hyndman, R. J., & Fan, Y. (1996). "Sample Quantiles in Statistical
//!   Packages." *The American Statistician*.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Data Model
// ============================================================================

/// Labeled n-dimensional arrays and the capability trait plotting reads.
pub mod array;

/// Plot options and their validation.
pub mod options;

// ============================================================================
// Inference
// ============================================================================

/// Plot-kind dispatch from shape and coordinates.
pub mod dispatch;

/// Color-scale inference from finite values.
pub mod inference;

/// Numeric helpers: extents, percentiles, cell edges, ticks.
pub mod stats;

// ============================================================================
// Core Rendering
// ============================================================================

/// Color types and color space conversions.
pub mod color;

/// Named and listed colormaps.
pub mod colormap;

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, lines, rectangles).
pub mod geometry;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// Rasterization of lines, polygons and circles.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Plotting
// ============================================================================

/// Drawing surfaces with ranges, ticks and labels.
pub mod axes;

/// Plot primitives (line, histogram, mesh, contour, image).
pub mod plots;

/// Single-axes plotting.
pub mod plot;

/// Small multiples.
pub mod facet;

/// Composed figures and colorbars.
pub mod figure;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for labelplot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use labelplot::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;

    pub use crate::array::{AuxCoord, CoordValue, Coordinate, LabeledArray, LabeledData};
    pub use crate::axes::Axes;
    pub use crate::color::{Hsla, Rgba};
    pub use crate::colormap::{choose_colormap, Colormap};
    pub use crate::dispatch::{choose_plot_kind, resolve_kind, resolve_plot_spec, PlotKind, PlotSpec};
    pub use crate::error::{Error, Result};
    pub use crate::facet::{FacetGrid, FacetKey, FacetOptions};
    pub use crate::figure::Figure;
    pub use crate::framebuffer::Framebuffer;
    pub use crate::inference::{infer_color_scale, infer_color_scale_for};
    pub use crate::options::{Center, KindOptions, Levels, PlotOptions};
    pub use crate::plot::{plot, plot_on};
    pub use crate::plots::BinStrategy;
    pub use crate::scale::{ColorScale, Extend, LinearScale, Scale};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
