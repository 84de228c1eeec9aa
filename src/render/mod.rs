//! Rasterization of geometric primitives.
//!
//! # Algorithms
//!
//! - **Wu's Anti-aliased Line**: Smooth line rendering with sub-pixel accuracy
//! - **Bresenham's Line**: Fast non-antialiased line drawing
//! - **Scanline polygon fill**: Mesh quads, filled contours, colorbar caps
//! - **Midpoint Circle**: Line plot markers
//!
//! # References
//!
//! - Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod primitives;

pub use primitives::{
    draw_circle, draw_line, draw_line_aa, draw_rect_outline, draw_thick_line, fill_polygon,
    Drawable,
};
