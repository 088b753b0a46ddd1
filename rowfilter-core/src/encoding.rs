// File: rowfilter-core/src/encoding.rs
//! Decoding of raw key/value bytes into text for pattern matching.
//!
//! Regular expressions operate on text, but keys and values are arbitrary
//! bytes. They are decoded with a legacy encoding chosen so that every byte
//! value maps to some character; the default `latin1` label resolves (per
//! the WHATWG Encoding Standard) to windows-1252, which decodes all 256 byte
//! values. Bytes `0x80..=0x9F` therefore come out as windows-1252 characters
//! (`0x80` is `€`), not as C1 controls.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;
use log::{debug, trace};

use crate::errors::FilterError;

/// Label of the encoding used when none is configured.
pub const DEFAULT_SOURCE_ENCODING: &str = "latin1";

/// A character encoding that raw bytes are decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEncoding(&'static Encoding);

impl SourceEncoding {
    /// The default encoding, `latin1` (windows-1252).
    pub fn latin1() -> Self {
        SourceEncoding(encoding_rs::WINDOWS_1252)
    }

    /// Resolves a WHATWG encoding label such as `latin1`, `iso-8859-2`,
    /// `shift_jis` or `utf-8`. Labels are matched case-insensitively.
    ///
    /// Labels that only resolve to the WHATWG "replacement" encoding are
    /// rejected, since that encoding cannot decode anything.
    pub fn for_label(label: &str) -> Result<Self, FilterError> {
        Encoding::for_label_no_replacement(label.trim().as_bytes())
            .map(SourceEncoding)
            .ok_or_else(|| FilterError::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the encoding, e.g. `windows-1252`.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Whether every possible byte sequence decodes without error.
    ///
    /// Only single-byte encodings without unmapped bytes qualify. For any
    /// other encoding, malformed input decodes to the empty string.
    pub fn is_total(&self) -> bool {
        if !self.0.is_single_byte() {
            return false;
        }
        let all_bytes: Vec<u8> = (0..=u8::MAX).collect();
        self.0
            .decode_without_bom_handling_and_without_replacement(&all_bytes)
            .is_some()
    }
}

impl Default for SourceEncoding {
    fn default() -> Self {
        SourceEncoding::latin1()
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes `bytes` from `encoding` into UTF-8 text.
///
/// Never fails: if the bytes are not valid in `encoding`, the result is the
/// empty string. ASCII-only input is borrowed rather than copied.
///
/// # Examples
///
/// ```
/// use rowfilter_core::encoding::{convert_to_utf8, SourceEncoding};
///
/// assert_eq!(convert_to_utf8(&[0x41, 0x42], SourceEncoding::latin1()), "AB");
/// assert_eq!(convert_to_utf8(&[0xe9], SourceEncoding::latin1()), "é");
/// ```
pub fn convert_to_utf8(bytes: &[u8], encoding: SourceEncoding) -> Cow<'_, str> {
    match encoding
        .0
        .decode_without_bom_handling_and_without_replacement(bytes)
    {
        Some(text) => text,
        None => {
            trace!(
                target: "rowfilter_core::encoding",
                "{} bytes are not valid {}; decoding to empty text",
                bytes.len(),
                encoding
            );
            Cow::Borrowed("")
        }
    }
}

/// Decodes `bytes` from the encoding named by `label`.
///
/// An unknown label decodes to the empty string, like malformed input does.
pub fn convert_to_utf8_label<'a>(bytes: &'a [u8], label: &str) -> Cow<'a, str> {
    match SourceEncoding::for_label(label) {
        Ok(encoding) => convert_to_utf8(bytes, encoding),
        Err(e) => {
            debug!("{}; decoding to empty text", e);
            Cow::Borrowed("")
        }
    }
}
