//! Varlena representation classification from raw header bytes.
//!
//! The convention is the little-endian one of the target engine: bit 0 of
//! the first byte distinguishes the 4-byte family (0) from the 1-byte and
//! external families (1), and a first byte of exactly `0x01` introduces
//! an external TOAST pointer whose second byte is the sub-format tag.

use byteorder::{ByteOrder, LittleEndian};

use super::external;
use super::models::VarlenaClass;

/// Bit 0 of the first header byte: set for the 1-byte/external families.
const ONE_BYTE_FLAG: u8 = 0x01;
/// A first byte of exactly 0x01 marks an external TOAST pointer.
const EXTERNAL_HEADER: u8 = 0x01;
/// Bit 1 of the 4-byte header word: set for inline-compressed values.
const COMPRESSED_FLAG: u32 = 0x02;

/// Classify a varlena from its first four header bytes.
///
/// Exactly one class applies to any header; callers dispatch on the
/// result with an exhaustive match, so unknown external tags surface as
/// [`VarlenaClass::ExternalUnknown`] instead of falling through.
pub fn classify(header: [u8; 4]) -> VarlenaClass {
    let byte0 = header[0];
    if byte0 & ONE_BYTE_FLAG == 0 {
        let word = LittleEndian::read_u32(&header);
        if word & COMPRESSED_FLAG != 0 {
            VarlenaClass::FourByteCompressed
        } else {
            VarlenaClass::FourByteRaw
        }
    } else if byte0 == EXTERNAL_HEADER {
        match external::VarTag::try_from(header[1]) {
            Ok(external::VarTag::OnDisk) => VarlenaClass::ExternalOnDisk,
            Ok(external::VarTag::Indirect) => VarlenaClass::ExternalIndirect,
            Ok(external::VarTag::ExpandedRo) => VarlenaClass::ExternalExpandedRo,
            Ok(external::VarTag::ExpandedRw) => VarlenaClass::ExternalExpandedRw,
            Err(_) => VarlenaClass::ExternalUnknown(header[1]),
        }
    } else {
        VarlenaClass::OneByteShort
    }
}
