//! Page-level types.

use super::{Color, Layer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single page in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page width in points (1 point = 1/72 inch)
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Page backdrop
    pub background: Background,

    /// Layers, bottom first
    pub layers: Vec<Layer>,
}

impl Page {
    /// Create a new page with the given dimensions and a plain white background.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Background::default(),
            layers: Vec::new(),
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.27559, 841.88976)
    }

    /// Add a layer on top of the existing ones.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Get the number of layers on the page.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of elements across all layers.
    pub fn element_count(&self) -> usize {
        self.layers.iter().map(Layer::element_count).sum()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::letter()
    }
}

/// Ruling drawn over a solid background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    Plain,
    Lined,
    Ruled,
    Graph,
    Dotted,
}

impl BackgroundStyle {
    /// Parse the `style` attribute of a solid background.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(BackgroundStyle::Plain),
            "lined" => Some(BackgroundStyle::Lined),
            "ruled" => Some(BackgroundStyle::Ruled),
            "graph" => Some(BackgroundStyle::Graph),
            "dotted" => Some(BackgroundStyle::Dotted),
            _ => None,
        }
    }
}

/// Where a pixmap background comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PixmapSource {
    /// Image bytes embedded in the document
    Inline {
        #[serde(skip_serializing, default)]
        data: Vec<u8>,
    },
    /// Image file on disk; `attached` files live next to the document
    File { path: PathBuf, attached: bool },
    /// Same image as the background of an earlier page (0-based)
    Clone { page: usize },
}

/// Page backdrop. Exactly one kind per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid {
        color: Color,
        style: BackgroundStyle,
    },
    Pixmap(PixmapSource),
    /// A page of the document's attached PDF (0-based page number)
    Pdf { page_number: usize },
}

impl Background {
    /// Plain white paper.
    pub fn blank() -> Self {
        Background::Solid {
            color: Color::WHITE,
            style: BackgroundStyle::Plain,
        }
    }

    /// Check if this background refers to the attached PDF.
    pub fn is_pdf(&self) -> bool {
        matches!(self, Background::Pdf { .. })
    }

    /// Short kind name, matching the `type` attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            Background::Solid { .. } => "solid",
            Background::Pixmap(_) => "pixmap",
            Background::Pdf { .. } => "pdf",
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Stroke, StrokeTool};

    #[test]
    fn test_page_new() {
        let page = Page::new(612.0, 792.0);
        assert_eq!(page.dimensions(), (612.0, 792.0));
        assert_eq!(page.layer_count(), 0);
        assert_eq!(page.background, Background::blank());
    }

    #[test]
    fn test_page_letter_a4() {
        assert!(!Page::letter().is_landscape());
        assert!(!Page::a4().is_landscape());
    }

    #[test]
    fn test_element_count() {
        let mut page = Page::letter();
        let mut layer = Layer::new();
        layer.add_element(Element::Stroke(Stroke::new(StrokeTool::Pen, Color::BLACK, 1.0)));
        page.add_layer(layer);
        page.add_layer(Layer::new());
        assert_eq!(page.element_count(), 1);
    }

    #[test]
    fn test_background_kind() {
        assert_eq!(Background::blank().kind(), "solid");
        assert!(Background::Pdf { page_number: 0 }.is_pdf());
        assert_eq!(BackgroundStyle::parse("graph"), Some(BackgroundStyle::Graph));
        assert_eq!(BackgroundStyle::parse("staves"), None);
    }
}
