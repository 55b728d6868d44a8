//! ASCII encoding utilities for EZPL printers
//!
//! EZPL is a line-oriented ASCII protocol. Anything outside the 7-bit range
//! would be mangled by the printer, so it is rejected before the port is
//! opened instead of being silently replaced.

use crate::error::{PrintError, PrintResult};

/// Find the first non-ASCII character and its byte offset
pub fn first_non_ascii(s: &str) -> Option<(usize, char)> {
    s.char_indices().find(|(_, c)| !c.is_ascii())
}

/// Encode label text as ASCII bytes
///
/// Bytes are passed through unchanged; no framing is added.
pub fn encode_ascii(s: &str) -> PrintResult<Vec<u8>> {
    if let Some((offset, c)) = first_non_ascii(s) {
        return Err(PrintError::Encoding(format!(
            "non-ASCII character {:?} at byte {}",
            c, offset
        )));
    }
    Ok(s.as_bytes().to_vec())
}
