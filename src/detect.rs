//! Container format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How the document markup is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// gzip-compressed XML (the normal case)
    Gzip,
    /// Uncompressed XML
    PlainXml,
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerFormat::Gzip => write!(f, "gzip"),
            ContainerFormat::PlainXml => write!(f, "xml"),
        }
    }
}

/// gzip magic bytes
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the container format from a file path.
///
/// # Example
/// ```no_run
/// use unxoj::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("notes.xopp").unwrap();
/// println!("Container: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<ContainerFormat> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    detect_format_from_bytes(&header[..filled])
}

/// Detect the container format from the first bytes of a file.
///
/// # Returns
/// * `Ok(ContainerFormat)` for gzip data or data that starts like XML
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<ContainerFormat> {
    if data.starts_with(GZIP_MAGIC) {
        return Ok(ContainerFormat::Gzip);
    }

    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    match data.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Ok(ContainerFormat::PlainXml),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if bytes look like a loadable container.
pub fn is_container_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
