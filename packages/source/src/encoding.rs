//! Decoding of uploaded bytes into text.
//!
//! Only the encodings incident exports actually arrive in are supported.
//! Single-byte encodings never fail; UTF-8 fails on invalid sequences.

use incident_map_source_models::Encoding;

use crate::SourceError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Windows-1252 code points for bytes `0x80..=0x9F`. Undefined slots keep
/// their Latin-1 control code point.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decodes `bytes` as `encoding`.
///
/// A leading UTF-8 byte-order mark is stripped.
///
/// # Errors
///
/// Returns [`SourceError::Format`] if `encoding` is UTF-8 and the bytes are
/// not valid UTF-8.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<String, SourceError> {
    match encoding {
        Encoding::Utf8 => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|e| {
                SourceError::format(format!(
                    "upload is not valid UTF-8 (byte offset {}); declare latin-1 or windows-1252 instead",
                    e.utf8_error().valid_up_to()
                ))
            })
        }
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        Encoding::Windows1252 => Ok(bytes.iter().map(|&b| windows_1252_char(b)).collect()),
    }
}

/// Parses a declared encoding name, falling back to `default` when the
/// caller did not declare one.
///
/// # Errors
///
/// Returns [`SourceError::Format`] for an unknown encoding name.
pub fn resolve_encoding(declared: Option<&str>, default: Encoding) -> Result<Encoding, SourceError> {
    match declared.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(name) => name
            .parse()
            .map_err(|_| SourceError::format(format!("unsupported encoding '{name}'"))),
    }
}

const fn windows_1252_char(byte: u8) -> char {
    if matches!(byte, 0x80..=0x9F) {
        WINDOWS_1252_HIGH[(byte - 0x80) as usize]
    } else {
        byte as char
    }
}
