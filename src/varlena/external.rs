//! External ("TOAST") pointer decoding.
//!
//! An external varlena starts with a `0x01` marker byte followed by a
//! tag byte selecting one of four sub-formats: an on-disk pointer into a
//! TOAST relation, an in-memory indirect pointer to another varlena, or
//! a read-only/read-write pointer to an expanded object header.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use super::compression;
use super::error::{DecodeError, Result};
use super::inline::FOUR_BYTE_HEADER;
use super::memory::{self, MemoryReader};
use super::models::{
    CompressionInfo, ExpandedMode, ExpandedPointer, IndirectPointer, OnDiskPointer, VarlenaBody,
};
use super::{RecursionGuard, VarlenaDecoder};

pub const TAG_INDIRECT: u8 = 1;
pub const TAG_EXPANDED_RO: u8 = 2;
pub const TAG_EXPANDED_RW: u8 = 3;
pub const TAG_ONDISK: u8 = 18;

/// Offset of the pointer payload behind the marker and tag bytes.
const POINTER_OFFSET: u64 = 2;
/// Size of the on-disk pointer payload: four u32 fields.
const ONDISK_LEN: u32 = 16;
/// Size of an indirect or expanded pointer payload: one address.
const ADDRESS_LEN: u32 = 8;

/// Tag byte selecting the external pointer sub-format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarTag {
    Indirect,
    ExpandedRo,
    ExpandedRw,
    OnDisk,
}

impl TryFrom<u8> for VarTag {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            TAG_INDIRECT => Ok(Self::Indirect),
            TAG_EXPANDED_RO => Ok(Self::ExpandedRo),
            TAG_EXPANDED_RW => Ok(Self::ExpandedRw),
            TAG_ONDISK => Ok(Self::OnDisk),
            other => Err(DecodeError::ExternalTagUnknown { tag: other }),
        }
    }
}

/// Decode an external pointer from its tag byte onward.
///
/// An unknown tag is reported, not fatal: the body carries the raw tag
/// and no structural decode is attempted behind it.
pub(super) fn decode<R: MemoryReader>(
    decoder: &mut VarlenaDecoder<R>,
    address: u64,
    tag_byte: u8,
    guard: &mut RecursionGuard,
    faults: &mut Vec<DecodeError>,
) -> Result<(u32, VarlenaBody)> {
    let tag = match VarTag::try_from(tag_byte) {
        Ok(tag) => tag,
        Err(err) => {
            debug!("external pointer at {address:#x} carries unknown tag {tag_byte}");
            faults.push(err);
            return Ok((
                POINTER_OFFSET as u32,
                VarlenaBody::ExternalUnknown { tag: tag_byte },
            ));
        }
    };
    match tag {
        VarTag::OnDisk => decode_on_disk(decoder, address, faults),
        VarTag::Indirect => decode_indirect(decoder, address, guard),
        VarTag::ExpandedRo => decode_expanded(decoder, address, ExpandedMode::ReadOnly),
        VarTag::ExpandedRw => decode_expanded(decoder, address, ExpandedMode::ReadWrite),
    }
}

/// Decode the `varatt_external` payload: four little-endian u32 fields.
///
/// A value is compressed on disk iff its external size is smaller than
/// its raw size minus the 4-byte header it would carry inline; the flag
/// is derived here, never stored.
fn decode_on_disk<R: MemoryReader>(
    decoder: &mut VarlenaDecoder<R>,
    address: u64,
    faults: &mut Vec<DecodeError>,
) -> Result<(u32, VarlenaBody)> {
    let buf = memory::read_exact(&mut decoder.reader, address + POINTER_OFFSET, ONDISK_LEN)?;
    let raw_size = LittleEndian::read_u32(&buf[0..4]);
    let ext_info = LittleEndian::read_u32(&buf[4..8]);
    let value_id = LittleEndian::read_u32(&buf[8..12]);
    let toast_relation_id = LittleEndian::read_u32(&buf[12..16]);

    let CompressionInfo {
        method,
        original_size: ext_size,
    } = compression::unpack(ext_info);

    let is_compressed = match raw_size.checked_sub(FOUR_BYTE_HEADER) {
        Some(inline_size) => ext_size < inline_size,
        None => {
            faults.push(DecodeError::CorruptLength {
                field: "on-disk raw size",
                value: raw_size,
            });
            false
        }
    };

    Ok((
        POINTER_OFFSET as u32 + ONDISK_LEN,
        VarlenaBody::OnDisk(OnDiskPointer {
            raw_size,
            ext_size,
            compress: method,
            is_compressed,
            value_id,
            toast_relation_id,
        }),
    ))
}

/// Decode an indirect pointer and resolve its target through the full
/// pipeline, under the recursion guard.
///
/// A zero target is a valid null reference. A failure while resolving
/// the target, including a guard trip on a cyclic chain, is captured in
/// the pointer itself so the outer report still renders.
fn decode_indirect<R: MemoryReader>(
    decoder: &mut VarlenaDecoder<R>,
    address: u64,
    guard: &mut RecursionGuard,
) -> Result<(u32, VarlenaBody)> {
    let buf = memory::read_exact(&mut decoder.reader, address + POINTER_OFFSET, ADDRESS_LEN)?;
    let target_address = LittleEndian::read_u64(&buf);
    let resolved = if target_address == 0 {
        None
    } else {
        debug!("indirect pointer at {address:#x} resolves to {target_address:#x}");
        Some(
            decoder
                .decode_guarded(target_address, guard)
                .map(Box::new),
        )
    };
    Ok((
        POINTER_OFFSET as u32 + ADDRESS_LEN,
        VarlenaBody::Indirect(IndirectPointer {
            target_address,
            resolved,
        }),
    ))
}

/// Decode an expanded-object pointer. The header it names is opaque;
/// decoding stops at reporting the mode and address.
fn decode_expanded<R: MemoryReader>(
    decoder: &mut VarlenaDecoder<R>,
    address: u64,
    mode: ExpandedMode,
) -> Result<(u32, VarlenaBody)> {
    let buf = memory::read_exact(&mut decoder.reader, address + POINTER_OFFSET, ADDRESS_LEN)?;
    let header_address = LittleEndian::read_u64(&buf);
    Ok((
        POINTER_OFFSET as u32 + ADDRESS_LEN,
        VarlenaBody::Expanded(ExpandedPointer {
            mode,
            header_address,
        }),
    ))
}
