//! Varlena/TOAST decoding pipeline.
//!
//! Decoding is stateless per call: classify the header bytes, dispatch
//! to the matching variant decoder, optionally recurse through indirect
//! pointers under an explicit guard, interpret inline payload bytes, and
//! assemble the report.
//!
//! ```text
//! classify → { 4-byte | 1-byte | external } → (bounded recursion)
//!          → payload interpretation → DecodedVarlena → render
//! ```
//!
//! A failed or short read aborts only the node being decoded; it
//! surfaces as an error value and never as a fault that could take down
//! the host session.

pub mod error;
pub mod memory;
pub mod models;
pub mod render;

mod classify;
mod compression;
mod external;
mod inline;
mod preview;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

pub use error::{DecodeError, Result};
use memory::{AddressResolver, MemoryReader};
use models::{DecodedVarlena, VarlenaClass};

/// Static decode configuration. Nothing else persists across calls.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Preview cap for plain inline payloads.
    pub raw_preview_cap: u32,
    /// Preview cap for compressed payloads (not human-readable, so small).
    pub compressed_preview_cap: u32,
    /// Longest chain of indirect pointers to follow.
    pub max_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            raw_preview_cap: 1024,
            compressed_preview_cap: 64,
            max_depth: 8,
        }
    }
}

/// Depth and cycle guard threaded through indirect pointer resolution.
#[derive(Debug)]
struct RecursionGuard {
    remaining: usize,
    visited: Vec<u64>,
}

impl RecursionGuard {
    fn new(max_depth: usize) -> Self {
        Self {
            remaining: max_depth,
            visited: Vec::new(),
        }
    }

    /// Register entry into `address`, failing on a revisit or an
    /// exhausted depth budget. Addresses stay registered for the whole
    /// decode, so a cyclic chain trips on its first repeat.
    fn enter(&mut self, address: u64) -> Result<()> {
        if self.remaining == 0 || self.visited.contains(&address) {
            return Err(DecodeError::RecursionLimitExceeded { address });
        }
        self.remaining -= 1;
        self.visited.push(address);
        Ok(())
    }
}

/// Decodes varlena values out of a target address space.
///
/// One decode invocation at a time; every invocation builds a fresh
/// ephemeral [`DecodedVarlena`] for rendering.
pub struct VarlenaDecoder<R: MemoryReader> {
    reader: R,
    config: DecodeConfig,
}

impl<R: MemoryReader> VarlenaDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecodeConfig::default())
    }

    pub fn with_config(reader: R, config: DecodeConfig) -> Self {
        Self { reader, config }
    }

    /// Decode the varlena at `address` into a report.
    ///
    /// # Errors
    /// Fails when the header bytes cannot be read, or when a variant's
    /// own structure (compression-info word, pointer payload) is
    /// unreadable or truncated. Nested indirect failures are captured
    /// inside the report instead.
    pub fn decode(&mut self, address: u64) -> Result<DecodedVarlena> {
        let mut guard = RecursionGuard::new(self.config.max_depth);
        self.decode_guarded(address, &mut guard)
    }

    /// Decode from either a literal address (`0x…` hex or decimal) or an
    /// expression handed to `resolver`.
    pub fn decode_target(
        &mut self,
        target: &str,
        resolver: &mut dyn AddressResolver,
    ) -> Result<DecodedVarlena> {
        let address = parse_address(target, resolver)?;
        self.decode(address)
    }

    fn decode_guarded(&mut self, address: u64, guard: &mut RecursionGuard) -> Result<DecodedVarlena> {
        guard.enter(address)?;

        let header_bytes = memory::read_exact(&mut self.reader, address, 4)?;
        let header = [
            header_bytes[0],
            header_bytes[1],
            header_bytes[2],
            header_bytes[3],
        ];
        let class = classify::classify(header);
        debug!("varlena at {address:#x} classified as {class:?}");

        let mut faults = Vec::new();
        let (total_length, body) = match class {
            VarlenaClass::FourByteRaw => {
                let word = LittleEndian::read_u32(&header);
                inline::decode_raw(&mut self.reader, address, word, &self.config, &mut faults)
            }
            VarlenaClass::FourByteCompressed => {
                let word = LittleEndian::read_u32(&header);
                inline::decode_compressed(&mut self.reader, address, word, &self.config, &mut faults)?
            }
            VarlenaClass::OneByteShort => {
                inline::decode_short(&mut self.reader, address, header[0], &mut faults)
            }
            VarlenaClass::ExternalOnDisk
            | VarlenaClass::ExternalIndirect
            | VarlenaClass::ExternalExpandedRo
            | VarlenaClass::ExternalExpandedRw
            | VarlenaClass::ExternalUnknown(_) => {
                external::decode(self, address, header[1], guard, &mut faults)?
            }
            VarlenaClass::Unclassified(byte) => {
                return Err(DecodeError::UnknownFormat { header: byte })
            }
        };

        Ok(DecodedVarlena {
            source_address: address,
            total_length,
            body,
            faults,
        })
    }
}

/// Parse a literal address, or defer anything symbolic to the resolver.
fn parse_address(target: &str, resolver: &mut dyn AddressResolver) -> Result<u64> {
    let text = target.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map_err(|_| DecodeError::ExpressionInvalid(target.to_string()));
    }
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        return text
            .parse()
            .map_err(|_| DecodeError::ExpressionInvalid(target.to_string()));
    }
    resolver.resolve(text).map_err(|err| {
        debug!("expression resolution failed: {err}");
        DecodeError::ExpressionInvalid(target.to_string())
    })
}
