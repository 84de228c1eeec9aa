//! SVG output.
//!
//! The raster is embedded as a base64 PNG; titles, axis labels and tick
//! labels are laid over it as real `<text>` elements so they stay crisp and
//! searchable.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;

/// Horizontal alignment of a text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Text starts at the position.
    #[default]
    Start,
    /// Text is centered on the position.
    Middle,
    /// Text ends at the position.
    End,
}

impl TextAnchor {
    const fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// A text label in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    /// Anchor x.
    pub x: f32,
    /// Baseline y.
    pub y: f32,
    /// Content.
    pub text: String,
    /// Font size in pixels.
    pub size: f32,
    /// Alignment.
    pub anchor: TextAnchor,
    /// Clockwise rotation in degrees around the anchor.
    pub rotate: f32,
}

impl TextLabel {
    /// Unrotated label.
    #[must_use]
    pub fn new(x: f32, y: f32, text: impl Into<String>, size: f32, anchor: TextAnchor) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            size,
            anchor,
            rotate: 0.0,
        }
    }

    /// Rotate around the anchor.
    #[must_use]
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    /// Shift by an offset.
    #[must_use]
    pub fn offset(mut self, dx: f32, dy: f32) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }
}

/// An SVG element.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    /// Embedded raster image (data URI).
    Image {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// `data:` URI.
        data: String,
    },
    /// Text label.
    Text {
        /// The label.
        label: TextLabel,
        /// Fill color.
        fill: Rgba,
    },
}

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

impl SvgEncoder {
    /// Empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Document sized to `fb` with the framebuffer embedded as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn from_framebuffer(fb: &Framebuffer) -> Result<Self> {
        let png_bytes = super::PngEncoder::to_bytes(fb)?;
        let data = format!("data:image/png;base64,{}", STANDARD.encode(&png_bytes));

        let mut encoder = Self::new(fb.width(), fb.height()).background(None);
        encoder.elements.push(SvgElement::Image {
            x: 0.0,
            y: 0.0,
            width: fb.width() as f32,
            height: fb.height() as f32,
            data,
        });
        Ok(encoder)
    }

    /// Set the background color (`None` for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a text label.
    #[must_use]
    pub fn text(mut self, label: TextLabel, fill: Rgba) -> Self {
        self.elements.push(SvgElement::Text { label, fill });
        self
    }

    /// Add many text labels in one color.
    #[must_use]
    pub fn texts<'a>(mut self, labels: impl IntoIterator<Item = &'a TextLabel>, fill: Rgba) -> Self {
        self.elements.extend(labels.into_iter().map(|label| SvgElement::Text {
            label: label.clone(),
            fill,
        }));
        self
    }

    /// Elements added so far.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render the document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, rgba_to_css(bg));
        }
        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

fn rgba_to_css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({},{},{},{:.3})",
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Image {
            x,
            y,
            width,
            height,
            data,
        } => format!(
            r#"<image x="{x}" y="{y}" width="{width}" height="{height}" xlink:href="{data}"/>"#
        ),
        SvgElement::Text { label, fill } => {
            let transform = if label.rotate == 0.0 {
                String::new()
            } else {
                format!(
                    r#" transform="rotate({} {} {})""#,
                    label.rotate, label.x, label.y
                )
            };
            format!(
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{}" font-family="sans-serif"{transform}>{}</text>"#,
                label.x,
                label.y,
                label.size,
                rgba_to_css(*fill),
                label.anchor.as_svg(),
                escape_xml(&label.text)
            )
        }
    }
}
