//! Document loading pipeline.
//!
//! Markup events from [`MarkupParser`] drive a [`ParserPosition`] state
//! machine inside [`LoadHandler`]; legal transitions build the document
//! model, everything else fails the load with a typed error.

mod attributes;
mod background;
mod builder;
mod load_handler;
mod markup;
mod options;
mod payload;
mod position;
mod warning;

pub use attributes::Attributes;
pub use background::PdfRepair;
pub use load_handler::LoadHandler;
pub use markup::{Attribute, MarkupHandler, MarkupParser};
pub use options::{ErrorMode, ExtractMode, ParseOptions};
pub use payload::decode_base64;
pub use position::{ParserPosition, Transition};
pub use warning::LoadWarning;
