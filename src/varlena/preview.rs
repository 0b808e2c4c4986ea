//! Best-effort payload interpretation heuristics.
//!
//! Ordered, first-match-wins chain over the captured preview bytes:
//! printable text, then C string, then fixed-width numerics, then a raw
//! hex fallback. Every step is total (no step may fault), and nothing
//! here influences computed offsets or lengths; the chain is display
//! only and runs solely on variants carrying inline payload bytes.

use byteorder::{ByteOrder, LittleEndian};

use super::models::{Interpretation, PayloadPreview};

/// Build a preview from captured bytes and the payload length the value
/// declares. `truncated` is set whenever fewer bytes were captured than
/// declared, whether from the preview cap or a short read.
pub fn capture(bytes: Vec<u8>, declared_len: u32) -> PayloadPreview {
    let truncated = (bytes.len() as u32) < declared_len;
    let interpretations = inspect(&bytes, declared_len);
    PayloadPreview {
        bytes,
        declared_len,
        truncated,
        interpretations,
    }
}

/// Run the interpretation chain.
///
/// Only the 8-byte numeric case reports two interpretations together
/// (the int64 and double views of the same bytes).
pub fn inspect(bytes: &[u8], declared_len: u32) -> Vec<Interpretation> {
    if bytes.is_empty() {
        return Vec::new();
    }
    if let Some(text) = printable_utf8(bytes) {
        return vec![Interpretation::Text(text.to_string())];
    }
    if let Some(cstring) = c_string(bytes) {
        return vec![cstring];
    }
    if declared_len == 4 && bytes.len() >= 4 {
        return vec![Interpretation::Int32(LittleEndian::read_u32(bytes))];
    }
    if declared_len == 8 && bytes.len() >= 8 {
        let raw = LittleEndian::read_u64(bytes);
        return vec![
            Interpretation::Int64(raw),
            Interpretation::Double(f64::from_bits(raw)),
        ];
    }
    vec![Interpretation::RawHex]
}

/// The bytes as UTF-8, if they decode cleanly and every character is
/// printable or whitespace.
fn printable_utf8(bytes: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(bytes).ok()?;
    if text.chars().all(|c| c.is_whitespace() || !c.is_control()) {
        Some(text)
    } else {
        None
    }
}

/// A NUL strictly after position 0 with a printable prefix reads as a
/// C string; the bytes after the terminator are kept for a hex dump.
fn c_string(bytes: &[u8]) -> Option<Interpretation> {
    let nul = bytes.iter().position(|&b| b == 0)?;
    if nul == 0 {
        return None;
    }
    let text = printable_utf8(&bytes[..nul])?;
    Some(Interpretation::CString {
        text: text.to_string(),
        trailing: bytes[nul + 1..].to_vec(),
    })
}
