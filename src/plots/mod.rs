//! Plot primitives.
//!
//! Each primitive draws into an [`Axes`](crate::axes::Axes) whose data
//! ranges are already set. Color-mapped primitives take the resolved
//! [`ColorScale`](crate::scale::ColorScale) so facets can share one scale.

mod contour;
pub(crate) mod grid;
mod histogram;
mod image;
mod line;
mod mesh;

pub use contour::{Contour, IndexSegment};
pub use grid::GridCoords;
pub use histogram::{BinStrategy, Histogram, DEFAULT_BINS};
pub use image::Image;
pub use line::{LinePlot, LineSeries};
pub use mesh::Mesh;
