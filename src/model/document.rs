//! Document-level types.

use super::Page;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A loaded note document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Application that wrote the file
    pub creator: String,

    /// Format version from the root tag (1 for files that predate it)
    pub file_version: u32,

    /// Document title, if the file carries one
    pub title: Option<String>,

    /// Path the document was loaded from
    pub filename: Option<PathBuf>,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// PDF used as page backgrounds
    pub pdf: Option<PdfAttachment>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            creator: "Unknown".to_string(),
            file_version: 1,
            title: None,
            filename: None,
            pages: Vec::new(),
            pdf: None,
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by index (0-based).
    pub fn get_page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of elements across all pages and layers.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(Page::element_count).sum()
    }

    /// Whether the document references a PDF that could not be found.
    pub fn is_pdf_missing(&self) -> bool {
        self.pdf.as_ref().is_some_and(|pdf| pdf.missing)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// The PDF backing a document's `pdf` backgrounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfAttachment {
    /// Resolved path of the PDF file
    pub path: PathBuf,

    /// `true` when the PDF is a copy stored next to the document,
    /// `false` when it is linked by path
    pub attached: bool,

    /// The file did not exist when the document was loaded
    pub missing: bool,
}

impl PdfAttachment {
    pub fn new(path: impl Into<PathBuf>, attached: bool) -> Self {
        Self {
            path: path.into(),
            attached,
            missing: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
