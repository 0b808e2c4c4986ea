//! # varlena-reader
//!
//! A decoder for the variable-length value encoding ("varlena") used by
//! PostgreSQL-style row engines, including the out-of-line "TOAST"
//! pointer sub-formats. Bytes are read out of a (paused) target
//! process's address space through a pluggable [`MemoryReader`] and
//! rendered as a line-oriented diagnostic report.
//!
//! The target is assumed little-endian throughout; big-endian targets
//! are not supported. Compression codecs are identified, never executed,
//! and the inspected memory is never mutated.
pub mod varlena;

// Re-export the main types for convenience
pub use varlena::{
    memory::{
        AddressResolver, EvalError, MemoryReader, NoSymbols, ProcessReader, ReadError,
        SnapshotReader,
    },
    models::{
        CompressionInfo, CompressionMethod, DecodedVarlena, ExpandedMode, ExpandedPointer,
        IndirectPointer, Interpretation, OnDiskPointer, PayloadPreview, VarlenaBody, VarlenaClass,
    },
    render, DecodeConfig, DecodeError, Result, VarlenaDecoder,
};
