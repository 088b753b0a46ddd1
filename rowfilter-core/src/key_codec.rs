// File: rowfilter-core/src/key_codec.rs
//! Textual representations of binary keys.
//!
//! Keys in the replicated store are uninterpreted byte strings, so operators
//! write key prefixes in an escaped textual form such as `\x00\x01user_`.
//! This module turns those strings back into raw bytes.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::str::FromStr;

use hex::FromHexError;

use crate::errors::FilterError;

/// Supported textual key formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFormat {
    /// The text is the key, byte for byte.
    Raw,
    /// Literal characters mixed with `\xHH`, `\NNN` and C-style escapes.
    #[default]
    Escaped,
    /// Pairs of hexadecimal digits, e.g. `0001ff`.
    Hex,
}

impl KeyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::Raw => "raw",
            KeyFormat::Escaped => "escaped",
            KeyFormat::Hex => "hex",
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(KeyFormat::Raw),
            "escaped" => Ok(KeyFormat::Escaped),
            "hex" => Ok(KeyFormat::Hex),
            other => Err(FilterError::UnsupportedKeyFormat(other.to_string())),
        }
    }
}

/// Parses `text` in the given `format` into raw key bytes.
///
/// Either the whole input parses or an error pointing at the first bad
/// escape is returned; a partial key is never produced.
///
/// # Examples
///
/// ```
/// use rowfilter_core::key_codec::{parse_key, KeyFormat};
///
/// let key = parse_key(KeyFormat::Escaped, r"\x41\x42").unwrap();
/// assert_eq!(key, vec![0x41, 0x42]);
/// ```
pub fn parse_key(format: KeyFormat, text: &str) -> Result<Vec<u8>, FilterError> {
    match format {
        KeyFormat::Raw => Ok(text.as_bytes().to_vec()),
        KeyFormat::Escaped => unescape(text),
        KeyFormat::Hex => decode_hex(text),
    }
}

/// Same as [`parse_key`], with the format given by name (`"raw"`, `"escaped"`, `"hex"`).
pub fn parse_key_with(format: &str, text: &str) -> Result<Vec<u8>, FilterError> {
    parse_key(format.parse()?, text)
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    hex::decode(pair).ok().and_then(|bytes| bytes.first().copied())
}

fn simple_escape(tag: u8) -> Option<u8> {
    let byte = match tag {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0b,
        b'\\' => b'\\',
        b'\'' => b'\'',
        b'"' => b'"',
        _ => return None,
    };
    Some(byte)
}

fn unescape(text: &str) -> Result<Vec<u8>, FilterError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let start = i;
        let Some(&tag) = bytes.get(i + 1) else {
            return Err(FilterError::malformed(start, "trailing backslash"));
        };

        match tag {
            b'x' => {
                let digits = bytes.get(i + 2..i + 4).ok_or_else(|| {
                    FilterError::malformed(start, r"\x must be followed by two hex digits")
                })?;
                let value = hex_byte(digits).ok_or_else(|| {
                    FilterError::malformed(
                        start,
                        format!(r"invalid hex digits in \x{}", String::from_utf8_lossy(digits)),
                    )
                })?;
                out.push(value);
                i += 4;
            }
            b'0'..=b'7' => {
                let digits = bytes.get(i + 1..i + 4).ok_or_else(|| {
                    FilterError::malformed(start, "octal escape needs three digits")
                })?;
                let mut value: u32 = 0;
                for &d in digits {
                    if !(b'0'..=b'7').contains(&d) {
                        return Err(FilterError::malformed(
                            start,
                            format!(r"invalid octal escape \{}", String::from_utf8_lossy(digits)),
                        ));
                    }
                    value = value * 8 + u32::from(d - b'0');
                }
                let value = u8::try_from(value).map_err(|_| {
                    FilterError::malformed(start, format!(r"octal escape \{:o} exceeds one byte", value))
                })?;
                out.push(value);
                i += 4;
            }
            _ => {
                let Some(byte) = simple_escape(tag) else {
                    // The byte after a backslash always starts a char.
                    let shown = text[i + 1..].chars().next().unwrap_or('?');
                    return Err(FilterError::malformed(start, format!("unknown escape '\\{}'", shown)));
                };
                out.push(byte);
                i += 2;
            }
        }
    }

    Ok(out)
}

fn decode_hex(text: &str) -> Result<Vec<u8>, FilterError> {
    hex::decode(text).map_err(|e| match e {
        FromHexError::OddLength => FilterError::malformed(
            text.len().saturating_sub(1),
            "hex key has an odd number of digits",
        ),
        FromHexError::InvalidHexCharacter { c, index } => {
            FilterError::malformed(index, format!("invalid hex digit '{}'", c))
        }
        other => FilterError::malformed(0, other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(text: &str) -> Result<Vec<u8>, FilterError> {
        parse_key(KeyFormat::Escaped, text)
    }

    #[test]
    fn test_hex_escapes_and_literals() {
        assert_eq!(escaped(r"\x41\x42").unwrap(), vec![0x41, 0x42]);
        assert_eq!(escaped(r"\x00\x01user").unwrap(), b"\x00\x01user".to_vec());
        assert_eq!(escaped(r"\xfF").unwrap(), vec![0xff]);
        assert_eq!(escaped("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_non_ascii_literals_pass_through_as_utf8() {
        assert_eq!(escaped("é\\x00").unwrap(), vec![0xc3, 0xa9, 0x00]);
    }

    #[test]
    fn test_c_style_and_octal_escapes() {
        assert_eq!(escaped(r#"\n\t\\\"\'"#).unwrap(), b"\n\t\\\"'".to_vec());
        assert_eq!(escaped(r"\a\b\f\v\r").unwrap(), vec![0x07, 0x08, 0x0c, 0x0b, 0x0d]);
        assert_eq!(escaped(r"\000\101\377").unwrap(), vec![0x00, 0x41, 0xff]);
    }

    #[test]
    fn test_short_hex_escape_is_rejected() {
        let err = escaped(r"ab\x4").unwrap_err();
        match err {
            FilterError::MalformedEscape { offset, .. } => assert_eq!(offset, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(escaped(r"\x").is_err());
    }

    #[test]
    fn test_non_hex_digits_are_rejected() {
        let err = escaped(r"\xZZ").unwrap_err();
        assert!(err.to_string().contains("invalid hex digits"), "{err}");
        assert!(escaped(r"\x4g").is_err());
    }

    #[test]
    fn test_bad_octal_and_unknown_escapes_are_rejected() {
        assert!(escaped(r"\400").is_err());
        assert!(escaped(r"\08").is_err());
        assert!(escaped(r"\01").is_err());
        let err = escaped(r"\q").unwrap_err();
        assert!(err.to_string().contains(r"unknown escape '\q'"), "{err}");
        assert!(escaped("\\é").is_err());
    }

    #[test]
    fn test_trailing_backslash_is_rejected() {
        assert!(matches!(
            escaped("abc\\"),
            Err(FilterError::MalformedEscape { offset: 3, .. })
        ));
    }

    #[test]
    fn test_raw_and_hex_formats() {
        assert_eq!(parse_key(KeyFormat::Raw, r"\x00").unwrap(), b"\\x00".to_vec());
        assert_eq!(parse_key(KeyFormat::Hex, "00ff41").unwrap(), vec![0x00, 0xff, 0x41]);
        assert!(parse_key(KeyFormat::Hex, "0").is_err());
        assert!(parse_key(KeyFormat::Hex, "zz").is_err());
    }

    #[test]
    fn test_hex_errors_point_at_offending_digit() {
        match parse_key(KeyFormat::Hex, "00zz").unwrap_err() {
            FilterError::MalformedEscape { offset, reason } => {
                assert_eq!(offset, 2);
                assert_eq!(reason, "invalid hex digit 'z'");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse_key(KeyFormat::Hex, "abc"),
            Err(FilterError::MalformedEscape { offset: 2, .. })
        ));
        assert_eq!(parse_key(KeyFormat::Hex, "").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_key(KeyFormat::Hex, "DEadBEef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_format_selector() {
        assert_eq!(parse_key_with("escaped", r"\x41").unwrap(), vec![0x41]);
        assert_eq!("hex".parse::<KeyFormat>().unwrap(), KeyFormat::Hex);
        assert!(matches!(
            parse_key_with("base64", "AA=="),
            Err(FilterError::UnsupportedKeyFormat(f)) if f == "base64"
        ));
        assert_eq!(KeyFormat::default().to_string(), "escaped");
    }
}
