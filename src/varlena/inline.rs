//! Inline varlena decoding: the plain and compressed 4-byte headers and
//! the short 1-byte header.

use byteorder::{ByteOrder, LittleEndian};
use log::warn;

use super::compression;
use super::error::{DecodeError, Result};
use super::memory::{self, MemoryReader};
use super::models::{PayloadPreview, VarlenaBody};
use super::preview;
use super::DecodeConfig;

/// Size of the 4-byte varlena header.
pub const FOUR_BYTE_HEADER: u32 = 4;
/// Header size of an inline-compressed value (length word + tcinfo word).
pub const COMPRESSED_HEADER: u32 = 8;
/// Size of the short-form header.
pub const ONE_BYTE_HEADER: u32 = 1;

/// Mask selecting the length portion of a 4-byte header word.
const LENGTH_MASK: u32 = 0x3FFF_FFFF;

/// Total length encoded in a 4-byte header word (headers included).
pub fn four_byte_length(word: u32) -> u32 {
    (word >> 2) & LENGTH_MASK
}

/// Total length encoded in a 1-byte header (header included, at most 127).
pub fn one_byte_length(byte0: u8) -> u32 {
    ((byte0 >> 1) & 0x7F) as u32
}

/// Decode a plain 4-byte varlena, previewing up to the configured cap of
/// its payload.
pub fn decode_raw<R: MemoryReader>(
    reader: &mut R,
    address: u64,
    word: u32,
    config: &DecodeConfig,
    faults: &mut Vec<DecodeError>,
) -> (u32, VarlenaBody) {
    let total = four_byte_length(word);
    let payload_len = clamped_payload_len(total, FOUR_BYTE_HEADER, "4-byte header length", faults);
    let preview = read_preview(
        reader,
        address + u64::from(FOUR_BYTE_HEADER),
        payload_len,
        config.raw_preview_cap,
        faults,
    );
    (total, VarlenaBody::FourByteRaw { payload_len, preview })
}

/// Decode a compressed 4-byte varlena.
///
/// The second header word carries the packed compression info; a short
/// read of it is fatal for the node. The payload preview is kept small
/// since compressed bytes are not human-readable.
pub fn decode_compressed<R: MemoryReader>(
    reader: &mut R,
    address: u64,
    word: u32,
    config: &DecodeConfig,
    faults: &mut Vec<DecodeError>,
) -> Result<(u32, VarlenaBody)> {
    let total = four_byte_length(word);
    let tcinfo = memory::read_exact(reader, address + u64::from(FOUR_BYTE_HEADER), 4)?;
    let info = compression::unpack(LittleEndian::read_u32(&tcinfo));
    let payload_len = clamped_payload_len(total, COMPRESSED_HEADER, "compressed header length", faults);
    let preview = read_preview(
        reader,
        address + u64::from(COMPRESSED_HEADER),
        payload_len,
        config.compressed_preview_cap,
        faults,
    );
    Ok((
        total,
        VarlenaBody::FourByteCompressed {
            info,
            payload_len,
            preview,
        },
    ))
}

/// Decode a short 1-byte varlena. The payload is at most 126 bytes, so
/// no preview cap applies.
pub fn decode_short<R: MemoryReader>(
    reader: &mut R,
    address: u64,
    byte0: u8,
    faults: &mut Vec<DecodeError>,
) -> (u32, VarlenaBody) {
    let total = one_byte_length(byte0);
    let payload_len = clamped_payload_len(total, ONE_BYTE_HEADER, "1-byte header length", faults);
    let preview = read_preview(
        reader,
        address + u64::from(ONE_BYTE_HEADER),
        payload_len,
        payload_len,
        faults,
    );
    (total, VarlenaBody::OneByteShort { payload_len, preview })
}

/// Payload length after the header, clamped to zero when the encoded
/// total is smaller than the header it must cover. A clamp is recorded
/// as a fault and must never drive a negative-size read.
fn clamped_payload_len(total: u32, header: u32, field: &'static str, faults: &mut Vec<DecodeError>) -> u32 {
    match total.checked_sub(header) {
        Some(len) => len,
        None => {
            warn!("{field} {total} is smaller than its {header}-byte header, clamping payload to 0");
            faults.push(DecodeError::CorruptLength { field, value: total });
            0
        }
    }
}

/// Capture up to `cap` payload bytes for display.
///
/// Structural fields are already decoded by the time the preview is
/// read, so a failed or short read here records a fault and yields an
/// empty or partial preview instead of aborting the node.
fn read_preview<R: MemoryReader>(
    reader: &mut R,
    address: u64,
    declared_len: u32,
    cap: u32,
    faults: &mut Vec<DecodeError>,
) -> PayloadPreview {
    let want = declared_len.min(cap);
    if want == 0 {
        return preview::capture(Vec::new(), declared_len);
    }
    match reader.read_bytes(address, want) {
        Ok(bytes) => preview::capture(bytes, declared_len),
        Err(err) => {
            warn!("payload preview read of {want} bytes at {address:#x} failed: {err}");
            faults.push(DecodeError::AddressUnreadable {
                address,
                requested: want,
            });
            preview::capture(Vec::new(), declared_len)
        }
    }
}
