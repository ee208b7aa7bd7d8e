//! # unxoj
//!
//! Streaming loader for Xournal (`.xoj`) and Xournal++ (`.xopp`) note
//! documents.
//!
//! Documents are gzip-compressed XML. The loader decompresses on the fly,
//! tokenizes the markup as a stream of events and builds an in-memory
//! [`Document`] of pages, layers and elements without ever materializing a
//! DOM. Malformed input fails the load with a typed [`Error`]; conditions
//! the loader can recover from are reported as [`LoadWarning`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unxoj::load_file;
//!
//! fn main() -> unxoj::Result<()> {
//!     let doc = load_file("lecture.xopp")?;
//!     for (i, page) in doc.pages.iter().enumerate() {
//!         println!("page {}: {} elements", i + 1, page.element_count());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Missing PDF backgrounds
//!
//! Annotated PDFs reference the PDF by path. When it cannot be found the
//! load still succeeds; use a [`LoadHandler`] to find out and repair:
//!
//! ```no_run
//! use unxoj::LoadHandler;
//!
//! let mut handler = LoadHandler::new();
//! handler.load_document("annotated.xopp")?;
//! if handler.is_attached_pdf_missing() {
//!     handler.set_pdf_replacement("/papers/moved.pdf", false);
//!     let doc = handler.reload()?;
//!     assert!(!doc.is_pdf_missing());
//! }
//! # Ok::<(), unxoj::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Both containers**: gzip-compressed and plain XML input
//! - **Strict structure**: illegal nesting and bad attributes are typed errors
//! - **Lenient payloads**: optionally drop elements with broken base64 data
//! - **Parallel processing**: load many documents at once with Rayon
//! - **Async**: `load_document_async` with the `async` feature

pub mod container;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use container::ContainerReader;
pub use detect::{detect_format_from_bytes, detect_format_from_path, ContainerFormat};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Background, BackgroundStyle, Color, Document, Element, Image, Layer, Page, PdfAttachment,
    PixmapSource, Point, Rect, Stroke, StrokeTool, TexImage, Text,
};
pub use parser::{
    ErrorMode, ExtractMode, LoadHandler, LoadWarning, ParseOptions, ParserPosition, PdfRepair,
};
pub use render::JsonFormat;

use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Load a document file.
///
/// # Example
///
/// ```no_run
/// use unxoj::load_file;
///
/// let doc = load_file("notes.xoj").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    LoadHandler::new().load_document(path)
}

/// Load a document file with custom options.
///
/// # Example
///
/// ```no_run
/// use unxoj::{load_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().structure_only();
/// let doc = load_file_with_options("notes.xopp", options).unwrap();
/// ```
pub fn load_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    LoadHandler::with_options(options).load_document(path)
}

/// Load a document from bytes (compressed or plain).
///
/// Attachment paths are resolved relative to the working directory.
///
/// # Example
///
/// ```no_run
/// use unxoj::load_bytes;
///
/// let data = std::fs::read("notes.xopp").unwrap();
/// let doc = load_bytes(&data).unwrap();
/// ```
pub fn load_bytes(data: &[u8]) -> Result<Document> {
    load_bytes_with_options(data, ParseOptions::default())
}

/// Load a document from bytes with custom options.
pub fn load_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let reader = ContainerReader::from_bytes(data.to_vec())?;
    LoadHandler::with_options(options).load_container(reader)
}

/// Load a document from a reader.
///
/// # Example
///
/// ```no_run
/// use unxoj::load_reader;
/// use std::fs::File;
///
/// let file = File::open("notes.xopp").unwrap();
/// let doc = load_reader(file).unwrap();
/// ```
pub fn load_reader<R: Read + Send + 'static>(reader: R) -> Result<Document> {
    load_reader_with_options(reader, ParseOptions::default())
}

/// Load a document from a reader with custom options.
pub fn load_reader_with_options<R: Read + Send + 'static>(
    reader: R,
    options: ParseOptions,
) -> Result<Document> {
    let reader = ContainerReader::from_reader(reader)?;
    LoadHandler::with_options(options).load_container(reader)
}

/// Load several documents in parallel.
///
/// Each load is independent; results are returned in input order.
///
/// # Example
///
/// ```no_run
/// use unxoj::{load_documents, ParseOptions};
///
/// let results = load_documents(&["a.xopp", "b.xoj"], &ParseOptions::default());
/// for result in results {
///     match result {
///         Ok(doc) => println!("{} pages", doc.page_count()),
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// ```
pub fn load_documents<P>(paths: &[P], options: &ParseOptions) -> Vec<Result<Document>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| load_file_with_options(path, options.clone()))
        .collect()
}

/// Load a document on Tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn load_document_async(
    path: impl Into<PathBuf>,
    options: ParseOptions,
) -> Result<Document> {
    let path = path.into();
    tokio::task::spawn_blocking(move || load_file_with_options(path, options))
        .await
        .map_err(|e| Error::Other(format!("load task failed: {}", e)))?
}

/// Load a document and convert it to JSON.
///
/// # Example
///
/// ```no_run
/// use unxoj::{to_json, JsonFormat};
///
/// let json = to_json("notes.xopp", JsonFormat::Pretty).unwrap();
/// std::fs::write("notes.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = load_file(path)?;
    render::to_json(&doc, format)
}

/// Default output directory for extracted payloads: `<stem>_assets` next
/// to the input file.
pub fn default_asset_dir(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!("{}_assets", stem))
}
