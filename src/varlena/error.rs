//! Custom error types for the varlena-reader crate.

use thiserror::Error;

/// The primary error type for all decoding operations in this crate.
///
/// Every decoding step returns a `Result` rather than faulting; non-fatal
/// structural contradictions are attached to the report as fault entries
/// instead of aborting the whole decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The target address space rejected the read entirely.
    #[error("cannot read {requested} bytes at {address:#x}")]
    AddressUnreadable { address: u64, requested: u32 },

    /// An address expression could not be resolved to a numeric address.
    #[error("invalid address expression: {0:?}")]
    ExpressionInvalid(String),

    /// A read returned fewer bytes than the format requires.
    #[error("truncated read: expected {expected} bytes, got {got}")]
    TruncatedRead { expected: usize, got: usize },

    /// The header byte matches none of the known varlena representations.
    #[error("unknown varlena format, header byte {header:#04x}")]
    UnknownFormat { header: u8 },

    /// An external pointer carries a tag outside the known set.
    #[error("unknown external pointer tag: {tag}")]
    ExternalTagUnknown { tag: u8 },

    /// Indirect pointer resolution exhausted the configured depth budget
    /// or revisited an address already on the chain.
    #[error("recursion limit exceeded resolving indirect pointer to {address:#x}")]
    RecursionLimitExceeded { address: u64 },

    /// A length field is smaller than the header it must cover.
    #[error("corrupt {field}: value {value} is smaller than the enclosing header")]
    CorruptLength { field: &'static str, value: u32 },
}

/// A convenience `Result` type alias using the crate's `DecodeError` type.
pub type Result<T> = std::result::Result<T, DecodeError>;
