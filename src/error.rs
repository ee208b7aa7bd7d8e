//! Error types for unxoj library.

use std::io;
use thiserror::Error;

/// Result type alias for unxoj operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading a document.
///
/// A missing PDF background is deliberately absent from this list: it is
/// reported on the loaded [`Document`](crate::Document) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when opening, reading or decompressing the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data is neither gzip-compressed nor plain XML.
    #[error("Unknown file format: not a Xournal document")]
    UnknownFormat,

    /// Markup syntax error reported by the tokenizer.
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// A start tag that is not legal in the current parser position.
    #[error("Unexpected element <{element}> while {position}")]
    UnexpectedElement { element: String, position: String },

    /// An end tag that does not close the currently open element.
    #[error("Mismatched end tag </{found}>, expected </{expected}>")]
    MismatchedEndTag { expected: String, found: String },

    /// The input ended before the root element was closed.
    #[error("Unexpected end of document while {0}")]
    UnexpectedEof(String),

    /// A required attribute is absent.
    #[error("Missing attribute \"{attribute}\" on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// An attribute value failed to parse or is out of range.
    #[error("Invalid value \"{value}\" for attribute \"{attribute}\" on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Character data that does not form a valid element body.
    #[error("Invalid content in <{element}>: {reason}")]
    InvalidContent {
        element: &'static str,
        reason: String,
    },

    /// An inline base64 payload could not be decoded.
    #[error("Invalid base64 payload in <{element}>: {reason}")]
    InvalidPayload {
        element: &'static str,
        reason: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be opened, read or decompressed.
    Io,
    /// The content is not a well-formed document.
    Format,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Format,
        }
    }

    /// Whether this is a format error (as opposed to an I/O failure).
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}
