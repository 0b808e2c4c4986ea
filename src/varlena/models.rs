//! Data structures representing decoded varlena values.

use std::fmt;

use super::error::DecodeError;

/// The mutually exclusive varlena representations, determined from the
/// first header bytes.
///
/// Classification is total: every header byte maps to exactly one class.
/// `Unclassified` exists so a report can still name a header the
/// classifier refused, should a future format revision introduce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarlenaClass {
    FourByteRaw,
    FourByteCompressed,
    OneByteShort,
    ExternalOnDisk,
    ExternalIndirect,
    ExternalExpandedRo,
    ExternalExpandedRw,
    ExternalUnknown(u8),
    Unclassified(u8),
}

impl VarlenaClass {
    /// Human-readable type name used in rendered reports.
    pub fn type_name(&self) -> String {
        match self {
            Self::FourByteRaw => "plain 4-byte varlena".to_string(),
            Self::FourByteCompressed => "compressed 4-byte varlena".to_string(),
            Self::OneByteShort => "short 1-byte varlena".to_string(),
            Self::ExternalOnDisk => "external TOAST pointer (ONDISK)".to_string(),
            Self::ExternalIndirect => "external TOAST pointer (INDIRECT)".to_string(),
            Self::ExternalExpandedRo => "external TOAST pointer (EXPANDED_RO)".to_string(),
            Self::ExternalExpandedRw => "external TOAST pointer (EXPANDED_RW)".to_string(),
            Self::ExternalUnknown(tag) => format!("external TOAST pointer (UNKNOWN({tag}))"),
            Self::Unclassified(byte) => format!("unclassified varlena (header {byte:#04x})"),
        }
    }
}

/// Compression codec recorded in a value's metadata.
///
/// The decoder identifies codecs; it never runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    None,
    Pglz,
    Lz4,
    Unknown(u8),
}

impl From<u8> for CompressionMethod {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Pglz,
            2 => Self::Lz4,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Pglz => write!(f, "PGLZ"),
            Self::Lz4 => write!(f, "LZ4"),
            Self::Unknown(id) => write!(f, "Unknown({id})"),
        }
    }
}

/// Decomposed `(original_size, method)` compression-info word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionInfo {
    pub method: CompressionMethod,
    pub original_size: u32,
}

/// On-disk TOAST pointer (the engine's `varatt_external` layout).
///
/// `is_compressed` is derived from the size fields, never stored in the
/// pointer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnDiskPointer {
    pub raw_size: u32,
    pub ext_size: u32,
    pub compress: CompressionMethod,
    pub is_compressed: bool,
    pub value_id: u32,
    pub toast_relation_id: u32,
}

/// In-memory indirect pointer: a back-reference to another varlena.
///
/// `resolved` is `None` for a null target. A failure while resolving the
/// target (including a recursion-limit hit on a cyclic chain) is captured
/// per node rather than aborting the outer report.
#[derive(Debug)]
pub struct IndirectPointer {
    pub target_address: u64,
    pub resolved: Option<std::result::Result<Box<DecodedVarlena>, DecodeError>>,
}

/// Access mode of an expanded in-memory object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandedMode {
    ReadOnly,
    ReadWrite,
}

impl fmt::Display for ExpandedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "read-only"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Pointer to an expanded object header. The header's internal structure
/// is opaque to this crate; decoding stops at the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedPointer {
    pub mode: ExpandedMode,
    pub header_address: u64,
}

/// Captured payload bytes plus their best-effort interpretations.
///
/// `bytes` is capped at the configured preview length; `truncated` is set
/// whenever fewer bytes were captured than the value declares.
#[derive(Debug)]
pub struct PayloadPreview {
    pub bytes: Vec<u8>,
    pub declared_len: u32,
    pub truncated: bool,
    pub interpretations: Vec<Interpretation>,
}

/// One reading of a payload produced by the interpretation chain.
///
/// Display-only: interpretations never feed back into structural fields.
#[derive(Debug)]
pub enum Interpretation {
    Text(String),
    CString { text: String, trailing: Vec<u8> },
    Int32(u32),
    Int64(u64),
    Double(f64),
    RawHex,
}

/// Variant-specific decoded fields.
#[derive(Debug)]
pub enum VarlenaBody {
    FourByteRaw {
        payload_len: u32,
        preview: PayloadPreview,
    },
    FourByteCompressed {
        info: CompressionInfo,
        payload_len: u32,
        preview: PayloadPreview,
    },
    OneByteShort {
        payload_len: u32,
        preview: PayloadPreview,
    },
    OnDisk(OnDiskPointer),
    Indirect(IndirectPointer),
    Expanded(ExpandedPointer),
    ExternalUnknown { tag: u8 },
}

/// A fully decoded varlena.
///
/// Ephemeral: constructed per invocation from a reader and an address,
/// consumed by rendering, never persisted. `faults` collects non-fatal
/// structural contradictions encountered along the way; each one becomes
/// a diagnostic line in the rendered report.
#[derive(Debug)]
pub struct DecodedVarlena {
    pub source_address: u64,
    pub total_length: u32,
    pub body: VarlenaBody,
    pub faults: Vec<DecodeError>,
}

impl DecodedVarlena {
    /// The classification this report's body corresponds to.
    pub fn class(&self) -> VarlenaClass {
        match &self.body {
            VarlenaBody::FourByteRaw { .. } => VarlenaClass::FourByteRaw,
            VarlenaBody::FourByteCompressed { .. } => VarlenaClass::FourByteCompressed,
            VarlenaBody::OneByteShort { .. } => VarlenaClass::OneByteShort,
            VarlenaBody::OnDisk(_) => VarlenaClass::ExternalOnDisk,
            VarlenaBody::Indirect(_) => VarlenaClass::ExternalIndirect,
            VarlenaBody::Expanded(p) => match p.mode {
                ExpandedMode::ReadOnly => VarlenaClass::ExternalExpandedRo,
                ExpandedMode::ReadWrite => VarlenaClass::ExternalExpandedRw,
            },
            VarlenaBody::ExternalUnknown { tag } => VarlenaClass::ExternalUnknown(*tag),
        }
    }
}
