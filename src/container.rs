//! Container reader: transparent gzip decompression over a file handle.
//!
//! Documents are normally gzip-compressed XML. Uncompressed XML is accepted
//! as well, so the reader sniffs the first bytes and only installs the
//! decoder when the gzip magic is present.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::bufread::MultiGzDecoder;

use crate::detect::{detect_format_from_bytes, ContainerFormat};
use crate::error::{Error, Result};

/// Decompressed, buffered view of a document container.
///
/// The underlying handle is owned by the reader and closed when it is
/// dropped, on success and error paths alike.
pub struct ContainerReader {
    inner: Box<dyn BufRead + Send>,
    format: ContainerFormat,
    path: Option<PathBuf>,
}

impl ContainerReader {
    /// Open a container file.
    ///
    /// Fails with [`Error::Io`] if the file cannot be opened or read, or if
    /// the gzip stream is corrupt before any content is produced.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = Self::from_buf_reader(BufReader::new(file))?;
        reader.path = Some(path.to_path_buf());
        Ok(reader)
    }

    /// Read a container from memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_buf_reader(Cursor::new(data))
    }

    /// Read a container from any reader.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        Self::from_buf_reader(BufReader::new(reader))
    }

    fn from_buf_reader<R: BufRead + Send + 'static>(mut source: R) -> Result<Self> {
        let header = read_header(&mut source)?;
        let format = detect_format_from_bytes(&header)?;
        let source = Cursor::new(header).chain(source);

        let mut inner: Box<dyn BufRead + Send> = match format {
            ContainerFormat::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(source))),
            ContainerFormat::PlainXml => Box::new(source),
        };

        // Surface a corrupt gzip header now rather than mid-parse.
        let available = inner.fill_buf()?.len();
        if available == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "container is empty after decompression",
            )));
        }

        log::debug!("Opened {} container", format);
        Ok(Self {
            inner,
            format,
            path: None,
        })
    }

    /// Container format that was detected.
    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Path the container was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the next line (including its terminator) into `buf`.
    ///
    /// Returns the number of bytes read; `0` at end of stream.
    pub fn read_line(&mut self, buf: &mut String) -> Result<usize> {
        Ok(self.inner.read_line(buf)?)
    }

    /// Read up to `buf.len()` raw decompressed bytes.
    ///
    /// Returns the number of bytes read; `0` at end of stream.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.inner.read(buf)?)
    }
}

/// Number of leading bytes inspected for format detection.
const HEADER_LEN: usize = 16;

/// Read up to [`HEADER_LEN`] bytes, stopping early only at end of stream.
///
/// A single `fill_buf` may return fewer bytes than the magic needs, so keep
/// pulling until the header is full.
fn read_header<R: BufRead>(source: &mut R) -> io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    while header.len() < HEADER_LEN {
        let available = match source.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }
        let take = available.len().min(HEADER_LEN - header.len());
        header.extend_from_slice(&available[..take]);
        source.consume(take);
    }
    Ok(header)
}

impl Read for ContainerReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for ContainerReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl std::fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("format", &self.format)
            .field("path", &self.path)
            .finish()
    }
}
