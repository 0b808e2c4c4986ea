//! Line-oriented report rendering.

use std::fmt::Write;

use super::models::{DecodedVarlena, Interpretation, PayloadPreview, VarlenaBody};

/// Characters of text shown before the display truncation marker.
const TEXT_DISPLAY_CAP: usize = 100;
/// Bytes per hex dump row.
const HEX_ROW: usize = 16;

/// Render a decoded varlena into its line-oriented diagnostic.
///
/// Pure function of the report: the same report always renders to the
/// same text, so decoding an unchanged address twice yields identical
/// output.
pub fn report(decoded: &DecodedVarlena) -> String {
    let mut out = String::new();
    render_node(&mut out, decoded, 0);
    out
}

fn render_node(out: &mut String, decoded: &DecodedVarlena, indent: usize) {
    let pad = " ".repeat(indent);
    let _ = writeln!(out, "{pad}varlena at {:#x}:", decoded.source_address);
    let _ = writeln!(out, "{pad}  type: {}", decoded.class().type_name());
    let _ = writeln!(out, "{pad}  total length: {} bytes", decoded.total_length);

    match &decoded.body {
        VarlenaBody::FourByteRaw {
            payload_len,
            preview,
        } => {
            render_preview(out, "data", *payload_len, preview, indent);
        }
        VarlenaBody::FourByteCompressed {
            info,
            payload_len,
            preview,
        } => {
            let _ = writeln!(out, "{pad}  original size: {} bytes", info.original_size);
            let _ = writeln!(out, "{pad}  compression method: {}", info.method);
            render_preview(out, "compressed data", *payload_len, preview, indent);
        }
        VarlenaBody::OneByteShort {
            payload_len,
            preview,
        } => {
            render_preview(out, "data", *payload_len, preview, indent);
        }
        VarlenaBody::OnDisk(p) => {
            let _ = writeln!(out, "{pad}  raw size: {} bytes", p.raw_size);
            let _ = writeln!(out, "{pad}  external size: {} bytes", p.ext_size);
            let _ = writeln!(
                out,
                "{pad}  compressed: {}",
                if p.is_compressed { "yes" } else { "no" }
            );
            if p.is_compressed {
                let _ = writeln!(out, "{pad}  compression method: {}", p.compress);
            }
            let _ = writeln!(out, "{pad}  value id: {}", p.value_id);
            let _ = writeln!(out, "{pad}  TOAST relation oid: {}", p.toast_relation_id);
        }
        VarlenaBody::Indirect(p) => {
            if p.target_address == 0 {
                let _ = writeln!(out, "{pad}  points to: null");
            } else {
                let _ = writeln!(out, "{pad}  points to varlena at: {:#x}", p.target_address);
            }
            match &p.resolved {
                Some(Ok(inner)) => {
                    let _ = writeln!(out, "{pad}  pointed-to varlena:");
                    render_node(out, inner, indent + 4);
                }
                Some(Err(err)) => {
                    let _ = writeln!(out, "{pad}  !! {err}");
                }
                None => {}
            }
        }
        VarlenaBody::Expanded(p) => {
            let _ = writeln!(out, "{pad}  expanded object ({})", p.mode);
            if p.header_address == 0 {
                let _ = writeln!(out, "{pad}  object header: null");
            } else {
                let _ = writeln!(out, "{pad}  object header at: {:#x}", p.header_address);
            }
        }
        VarlenaBody::ExternalUnknown { tag } => {
            let _ = writeln!(out, "{pad}  tag byte: {tag}");
        }
    }

    for fault in &decoded.faults {
        let _ = writeln!(out, "{pad}  !! {fault}");
    }
}

fn render_preview(
    out: &mut String,
    label: &str,
    payload_len: u32,
    preview: &PayloadPreview,
    indent: usize,
) {
    if payload_len == 0 {
        return;
    }
    let pad = " ".repeat(indent);
    if preview.truncated {
        let _ = writeln!(
            out,
            "{pad}  {label} ({payload_len} bytes, previewing {}):",
            preview.bytes.len()
        );
    } else {
        let _ = writeln!(out, "{pad}  {label} ({payload_len} bytes):");
    }
    for interpretation in &preview.interpretations {
        match interpretation {
            Interpretation::Text(text) => {
                if text.chars().count() > TEXT_DISPLAY_CAP {
                    let shown: String = text.chars().take(TEXT_DISPLAY_CAP).collect();
                    let _ = writeln!(out, "{pad}    text (first {TEXT_DISPLAY_CAP} chars): \"{shown}...\"");
                } else {
                    let _ = writeln!(out, "{pad}    text: \"{text}\"");
                }
            }
            Interpretation::CString { text, trailing } => {
                let _ = writeln!(out, "{pad}    c string: \"{text}\"");
                if !trailing.is_empty() {
                    let _ = writeln!(
                        out,
                        "{pad}    {} bytes after the terminator:",
                        trailing.len()
                    );
                    hex_dump(out, trailing, indent + 6);
                }
            }
            Interpretation::Int32(v) => {
                let _ = writeln!(out, "{pad}    possible int32: {v} ({v:#x})");
            }
            Interpretation::Int64(v) => {
                let _ = writeln!(out, "{pad}    possible int64: {v} ({v:#x})");
            }
            Interpretation::Double(v) => {
                let _ = writeln!(out, "{pad}    possible double: {v}");
            }
            Interpretation::RawHex => {
                hex_dump(out, &preview.bytes, indent + 4);
            }
        }
    }
}

/// Classic three-column dump: offset, hex bytes, printable ASCII.
fn hex_dump(out: &mut String, bytes: &[u8], indent: usize) {
    let pad = " ".repeat(indent);
    for (row, chunk) in bytes.chunks(HEX_ROW).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{pad}{:04x}: {hex:<48} |{ascii}|", row * HEX_ROW);
    }
}
