//! Drawable layer elements: strokes, text, images and formula images.

use super::Color;
use serde::{Deserialize, Serialize};

/// A drawable element on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Stroke(Stroke),
    Text(Text),
    Image(Image),
    TexImage(TexImage),
}

impl Element {
    /// Short element name, matching the tag it was read from.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Stroke(_) => "stroke",
            Element::Text(_) => "text",
            Element::Image(_) => "image",
            Element::TexImage(_) => "teximage",
        }
    }

    /// Check if this element is a stroke.
    pub fn is_stroke(&self) -> bool {
        matches!(self, Element::Stroke(_))
    }

    /// Borrow the stroke, if this is one.
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Element::Stroke(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the text, if this is one.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Borrow the image, if this is one.
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Element::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Borrow the formula image, if this is one.
    pub fn as_tex_image(&self) -> Option<&TexImage> {
        match self {
            Element::TexImage(t) => Some(t),
            _ => None,
        }
    }
}

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Drawing tool that produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    #[default]
    Pen,
    Eraser,
    Highlighter,
}

impl StrokeTool {
    /// Parse the `tool` attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pen" => Some(StrokeTool::Pen),
            "eraser" => Some(StrokeTool::Eraser),
            "highlighter" => Some(StrokeTool::Highlighter),
            _ => None,
        }
    }
}

/// A freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: StrokeTool,
    pub color: Color,
    /// Base width, used for every segment when there is no pressure data
    pub width: f64,
    /// Per-segment widths; `points.len() - 1` entries when present
    pub pressure: Option<Vec<f64>>,
    /// Fill opacity (0-255), if the stroke is filled
    pub fill: Option<i32>,
    pub points: Vec<Point>,
    /// Audio recording offset (`ts`) the stroke was drawn at
    pub timestamp: Option<i64>,
    /// Audio recording (`fn`) the stroke is linked to
    pub audio_filename: Option<String>,
}

impl Stroke {
    pub fn new(tool: StrokeTool, color: Color, width: f64) -> Self {
        Self {
            tool,
            color,
            width,
            pressure: None,
            fill: None,
            points: Vec::new(),
            timestamp: None,
            audio_filename: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn has_pressure(&self) -> bool {
        self.pressure.is_some()
    }

    /// Whether the stroke is linked to an audio recording.
    pub fn has_audio(&self) -> bool {
        self.audio_filename.is_some()
    }

    /// Width of segment `index` (between point `index` and `index + 1`).
    pub fn segment_width(&self, index: usize) -> f64 {
        self.pressure
            .as_ref()
            .and_then(|p| p.get(index).copied())
            .unwrap_or(self.width)
    }
}

/// A text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    pub font: String,
    pub size: f64,
    pub color: Color,
    pub x: f64,
    pub y: f64,
    pub timestamp: Option<i64>,
    pub audio_filename: Option<String>,
}

impl Text {
    /// Create an empty text box at `(x, y)`.
    pub fn new(font: impl Into<String>, size: f64, color: Color, x: f64, y: f64) -> Self {
        Self {
            text: String::new(),
            font: font.into(),
            size,
            color,
            x,
            y,
            timestamp: None,
            audio_filename: None,
        }
    }

    /// Whether the text is linked to an audio recording.
    pub fn has_audio(&self) -> bool {
        self.audio_filename.is_some()
    }
}

/// An embedded raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub bounds: Rect,
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,
}

/// A rendered formula together with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexImage {
    /// Formula source text
    pub text: String,
    pub bounds: Rect,
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,
}

/// Guess a file extension for a decoded payload from its magic bytes.
pub fn payload_extension(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        "png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        "gif"
    } else if data.starts_with(b"%PDF-") {
        "pdf"
    } else {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_width() {
        let mut stroke = Stroke::new(StrokeTool::Pen, Color::BLACK, 1.5);
        stroke.points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
        assert_eq!(stroke.segment_width(1), 1.5);

        stroke.pressure = Some(vec![0.5, 0.8]);
        assert_eq!(stroke.segment_width(0), 0.5);
        assert_eq!(stroke.segment_width(1), 0.8);
    }

    #[test]
    fn test_rect_size() {
        let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn test_payload_extension() {
        assert_eq!(payload_extension(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]), "png");
        assert_eq!(payload_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), "jpg");
        assert_eq!(payload_extension(b"hello"), "bin");
    }

    #[test]
    fn test_tool_parse() {
        assert_eq!(StrokeTool::parse("highlighter"), Some(StrokeTool::Highlighter));
        assert_eq!(StrokeTool::parse("brush"), None);
    }
}
