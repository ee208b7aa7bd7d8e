//! Inline base64 payloads of `image`, `teximage` and pixmap backgrounds.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Decode the accumulated character data of `element`.
///
/// The writer wraps long payloads over many lines, so all ASCII whitespace
/// is removed before decoding.
pub fn decode_base64(element: &'static str, text: &str) -> Result<Vec<u8>> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::InvalidPayload {
            element,
            reason: e.to_string(),
        })
}
