//! Primitive rendering functions.
//!
//! Implements rasterization algorithms for basic geometric shapes.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Line, Point};

/// Trait for drawable primitives.
pub trait Drawable {
    /// Draw this primitive to a framebuffer.
    fn draw(&self, fb: &mut Framebuffer, color: Rgba);

    /// Draw this primitive with anti-aliasing if supported.
    fn draw_aa(&self, fb: &mut Framebuffer, color: Rgba) {
        self.draw(fb, color);
    }
}

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw a line using Bresenham's algorithm (non-antialiased).
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        if x >= 0 && y >= 0 {
            fb.set_pixel(x as u32, y as u32, color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Two pixels are plotted per step along the major axis, weighted by the
/// fractional distance from the ideal line.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { dy / dx };

    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl1, xpxl1, color, rfpart(yend) * xgap);
        plot(fb, ypxl1 + 1, xpxl1, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl1, ypxl1, color, rfpart(yend) * xgap);
        plot(fb, xpxl1, ypxl1 + 1, color, fpart(yend) * xgap);
    }

    let mut intery = yend + gradient;

    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl2, xpxl2, color, rfpart(yend) * xgap);
        plot(fb, ypxl2 + 1, xpxl2, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl2, ypxl2, color, rfpart(yend) * xgap);
        plot(fb, xpxl2, ypxl2 + 1, color, fpart(yend) * xgap);
    }

    for x in (xpxl1 + 1)..xpxl2 {
        let ipart = intery.floor() as i32;
        if steep {
            plot(fb, ipart, x, color, rfpart(intery));
            plot(fb, ipart + 1, x, color, fpart(intery));
        } else {
            plot(fb, x, ipart, color, rfpart(intery));
            plot(fb, x, ipart + 1, color, fpart(intery));
        }
        intery += gradient;
    }
}

/// Draw a line `thickness` pixels wide by stacking offset Bresenham lines.
pub fn draw_thick_line(fb: &mut Framebuffer, from: Point, to: Point, thickness: f32, color: Rgba) {
    let (x0, y0, x1, y1) = (
        from.x.round() as i32,
        from.y.round() as i32,
        to.x.round() as i32,
        to.y.round() as i32,
    );
    let half = (thickness.max(1.0) / 2.0).floor() as i32;
    let horizontal = (x1 - x0).abs() >= (y1 - y0).abs();

    for offset in -half..=half {
        if horizontal {
            draw_line(fb, x0, y0 + offset, x1, y1 + offset, color);
        } else {
            draw_line(fb, x0 + offset, y0, x1 + offset, y1, color);
        }
    }
}

#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 && x < fb.width() as i32 && y < fb.height() as i32 {
        let alpha = (f32::from(color.a) * intensity) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

impl Drawable for Line {
    fn draw(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_line(
            fb,
            self.start.x as i32,
            self.start.y as i32,
            self.end.x as i32,
            self.end.y as i32,
            color,
        );
    }

    fn draw_aa(&self, fb: &mut Framebuffer, color: Rgba) {
        draw_line_aa(fb, self.start.x, self.start.y, self.end.x, self.end.y, color);
    }
}

// ============================================================================
// Rectangle and Polygon Drawing
// ============================================================================

/// Draw a rectangle outline.
pub fn draw_rect_outline(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba,
    thickness: u32,
) {
    let thickness = thickness.max(1);
    let x = x.max(0) as u32;
    let y = y.max(0) as u32;

    fb.fill_rect(x, y, width, thickness, color);
    if height > thickness {
        fb.fill_rect(x, y + height - thickness, width, thickness, color);
    }
    if height > 2 * thickness {
        fb.fill_rect(x, y + thickness, thickness, height - 2 * thickness, color);
        if width > thickness {
            fb.fill_rect(x + width - thickness, y + thickness, thickness, height - 2 * thickness, color);
        }
    }
}

/// Fill a polygon using an even-odd scanline rasterizer.
///
/// Pixel centers (`x + 0.5`, `y + 0.5`) decide coverage, so adjacent quads
/// sharing an edge neither overlap nor leave gaps.
pub fn fill_polygon(fb: &mut Framebuffer, vertices: &[Point], color: Rgba) {
    if vertices.len() < 3 || vertices.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return;
    }

    let min_y = vertices.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = vertices.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let y_start = min_y.floor().max(0.0) as i32;
    let y_end = max_y.ceil().min(fb.height() as f32) as i32;

    let mut crossings: Vec<f32> = Vec::with_capacity(vertices.len());

    for y in y_start..y_end {
        let sample_y = y as f32 + 0.5;
        crossings.clear();

        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            let (lo, hi) = if a.y <= b.y { (*a, b) } else { (b, *a) };
            if sample_y >= lo.y && sample_y < hi.y {
                let t = (sample_y - lo.y) / (hi.y - lo.y);
                crossings.push(lo.x + t * (hi.x - lo.x));
            }
        }

        crossings.sort_by(f32::total_cmp);

        for pair in crossings.chunks_exact(2) {
            let x_start = (pair[0] - 0.5).ceil().max(0.0) as i32;
            let x_end = (pair[1] - 0.5).ceil().min(fb.width() as f32) as i32;
            if x_start < x_end {
                fb.fill_rect(x_start as u32, y as u32, (x_end - x_start) as u32, 1, color);
            }
        }
    }
}

// ============================================================================
// Circle Drawing
// ============================================================================

/// Draw a filled circle using the midpoint algorithm.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        if radius == 0 && cx >= 0 && cy >= 0 {
            fb.set_pixel(cx as u32, cy as u32, color);
        }
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        draw_horizontal_line(fb, cx - x, cx + x, cy + y, color);
        draw_horizontal_line(fb, cx - x, cx + x, cy - y, color);
        draw_horizontal_line(fb, cx - y, cx + y, cy + x, color);
        draw_horizontal_line(fb, cx - y, cx + y, cy - x, color);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

#[inline]
fn draw_horizontal_line(fb: &mut Framebuffer, x1: i32, x2: i32, y: i32, color: Rgba) {
    if y < 0 || y >= fb.height() as i32 {
        return;
    }

    let x_start = x1.max(0) as u32;
    let x_end = (x2 + 1).max(0).min(fb.width() as i32) as u32;

    if x_start < x_end {
        fb.fill_rect(x_start, y as u32, x_end - x_start, 1, color);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);
        fb
    }

    #[test]
    fn test_draw_line_horizontal() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, 10, 50, 90, 50, Rgba::BLACK);

        assert_eq!(fb.get_pixel(10, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 50), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, 10, 10, 90, 90, Rgba::BLACK);

        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 90), Some(Rgba::BLACK));
    }

    #[test]
    fn test_line_out_of_bounds() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, -10, -10, 110, 110, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_line_aa_marks_path() {
        let mut fb = white(100, 100);
        draw_line_aa(&mut fb, 10.0, 10.0, 90.0, 50.0, Rgba::BLACK);
        assert!(fb.count_ink(0, 0, 100, 100, Rgba::WHITE) > 50);
    }

    #[test]
    fn test_draw_thick_line() {
        let mut fb = white(50, 50);
        draw_thick_line(&mut fb, Point::new(5.0, 25.0), Point::new(45.0, 25.0), 3.0, Rgba::RED);

        assert_eq!(fb.get_pixel(20, 24), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(20, 25), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(20, 26), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(20, 28), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut fb = white(100, 100);
        draw_rect_outline(&mut fb, 20, 20, 30, 30, Rgba::RED, 2);

        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(49, 35), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(35, 35), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_square() {
        let mut fb = white(20, 20);
        let square = [
            Point::new(5.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(5.0, 10.0),
        ];
        fill_polygon(&mut fb, &square, Rgba::BLUE);

        assert_eq!(fb.count_ink(0, 0, 20, 20, Rgba::WHITE), 25);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_adjacent_quads_do_not_overlap() {
        let mut fb = white(20, 10);
        let left = [
            Point::new(0.0, 0.0),
            Point::new(7.5, 0.0),
            Point::new(7.5, 10.0),
            Point::new(0.0, 10.0),
        ];
        let right = [
            Point::new(7.5, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(7.5, 10.0),
        ];
        fill_polygon(&mut fb, &left, Rgba::RED);
        fill_polygon(&mut fb, &right, Rgba::BLUE);

        assert_eq!(fb.count_ink(0, 0, 20, 10, Rgba::WHITE), 200);
        assert_eq!(fb.get_pixel(6, 5), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(7, 5), Some(Rgba::BLUE));
    }

    #[test]
    fn test_fill_polygon_triangle_and_degenerate() {
        let mut fb = white(20, 20);
        let tri = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        fill_polygon(&mut fb, &tri, Rgba::GREEN);
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::GREEN));
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::WHITE));

        let before = fb.count_ink(0, 0, 20, 20, Rgba::WHITE);
        fill_polygon(&mut fb, &tri[..2], Rgba::RED);
        fill_polygon(&mut fb, &[Point::new(f32::NAN, 0.0), tri[1], tri[2]], Rgba::RED);
        assert_eq!(fb.count_ink(0, 0, 20, 20, Rgba::WHITE), before);
    }

    #[test]
    fn test_draw_circle() {
        let mut fb = white(100, 100);
        draw_circle(&mut fb, 50, 50, 20, Rgba::BLUE);

        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_drawable_trait_line() {
        let mut fb = white(100, 100);
        Line::new(Point::new(10.0, 10.0), Point::new(90.0, 90.0)).draw(&mut fb, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
    }
}
