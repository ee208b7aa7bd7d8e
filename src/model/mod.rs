//! Document model types for loaded notes.
//!
//! Ownership runs strictly downwards: a [`Document`] owns its pages, a
//! [`Page`] owns its layers and background, a [`Layer`] owns its elements.

mod color;
mod document;
mod element;
mod layer;
mod page;

pub use color::Color;
pub use document::{Document, PdfAttachment};
pub use element::{
    payload_extension, Element, Image, Point, Rect, Stroke, StrokeTool, TexImage, Text,
};
pub use layer::Layer;
pub use page::{Background, BackgroundStyle, Page, PixmapSource};
