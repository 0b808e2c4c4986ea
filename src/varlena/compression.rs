//! Compression-metadata bit-field extraction.

use super::models::{CompressionInfo, CompressionMethod};

/// Width of the size portion of a packed compression-info word.
pub const EXTSIZE_BITS: u32 = 30;
/// Mask selecting the size portion of a packed compression-info word.
pub const EXTSIZE_MASK: u32 = (1 << EXTSIZE_BITS) - 1;

/// Decompose a packed `(original_size, method)` word.
///
/// The layout is identical for the `va_tcinfo` word of an inline
/// compressed value and the `va_extinfo` field of an on-disk pointer:
/// the low 30 bits carry the size, the top 2 bits select the codec.
/// Method ids outside the known enumeration map to
/// [`CompressionMethod::Unknown`] instead of failing.
pub fn unpack(word: u32) -> CompressionInfo {
    CompressionInfo {
        original_size: word & EXTSIZE_MASK,
        method: CompressionMethod::from((word >> EXTSIZE_BITS) as u8),
    }
}
