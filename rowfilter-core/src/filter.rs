//! filter.rs - Compilation of a `FilterConfig` and the per-event decision.
//!
//! A `Filter` is built once per configuration and never mutated afterwards,
//! so a single instance can be shared by every thread evaluating events.
//! Reconfiguration builds a new `Filter` (see `shared::SharedFilter`).
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;

use log::{debug, trace, warn};
use regex::{Regex, RegexBuilder};

use crate::config::FilterConfig;
use crate::encoding::{convert_to_utf8, SourceEncoding};
use crate::engine::EventFilter;
use crate::errors::FilterError;
use crate::event::{OpType, RowEvent};
use crate::key_codec::{parse_key, KeyFormat};

/// Upper bound on the compiled size of a single pattern.
pub const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// The compiled, immutable form of a `FilterConfig`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    key_prefix: Vec<u8>,
    key_pattern: Option<Regex>,
    value_pattern: Option<Regex>,
    encoding: SourceEncoding,
}

fn compile_key_prefix(text: &str) -> Result<Vec<u8>, FilterError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    parse_key(KeyFormat::Escaped, text).map_err(|e| FilterError::InvalidKeyPrefix(Box::new(e)))
}

/// Rewrites the Perl classes `\d`, `\w`, `\s` (and their negations) and the
/// word boundaries `\b`, `\B` to ASCII-only forms.
///
/// Decoded keys routinely contain non-ASCII letters such as `é` or a
/// no-break space; those are never digits, word characters or whitespace
/// for a pattern rule. `\s` is `[\t\n\f\r ]` without `\v`.
fn ascii_perl_classes(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(next) = chars.next() else {
                    out.push('\\');
                    break;
                };
                match (next, class_depth) {
                    ('d', _) => out.push_str("[0-9]"),
                    ('D', _) => out.push_str("[^0-9]"),
                    ('w', _) => out.push_str("[0-9A-Za-z_]"),
                    ('W', _) => out.push_str("[^0-9A-Za-z_]"),
                    // `\x20` rather than a space, which `(?x)` would drop.
                    ('s', _) => out.push_str(r"[\t\n\f\r\x20]"),
                    ('S', _) => out.push_str(r"[^\t\n\f\r\x20]"),
                    ('b', 0) => out.push_str(r"(?-u:\b)"),
                    ('B', 0) => out.push_str(r"(?-u:\B)"),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            }
            '[' => {
                out.push('[');
                class_depth += 1;
                // A `]` right after `[` or `[^` is a literal.
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                out.push(']');
                class_depth -= 1;
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn compile_pattern(
    pattern: &str,
    attribute: fn(regex::Error) -> FilterError,
) -> Result<Option<Regex>, FilterError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&ascii_perl_classes(pattern))
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map(Some)
        .map_err(attribute)
}

fn resolve_encoding(label: &str) -> Result<SourceEncoding, FilterError> {
    if label.is_empty() {
        return Ok(SourceEncoding::default());
    }
    SourceEncoding::for_label(label).map_err(|e| FilterError::InvalidSourceEncoding(Box::new(e)))
}

impl Filter {
    /// A filter with no rules; it forwards every event.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Validates and compiles `config`, failing on the first malformed rule.
    pub fn compile(config: &FilterConfig) -> Result<Self, FilterError> {
        let filter = Self::try_build(config)?;
        filter.log_compiled();
        Ok(filter)
    }

    /// Compiles every rule of `config` without logging anything.
    pub(crate) fn try_build(config: &FilterConfig) -> Result<Self, FilterError> {
        Ok(Self {
            key_prefix: compile_key_prefix(&config.key_prefix)?,
            key_pattern: compile_pattern(&config.key_pattern, FilterError::InvalidKeyPattern)?,
            value_pattern: compile_pattern(&config.value_pattern, FilterError::InvalidValuePattern)?,
            encoding: resolve_encoding(&config.source_encoding)?,
        })
    }

    /// Builds a filter from a configuration that has already passed
    /// [`FilterConfig::validate`].
    ///
    /// A key prefix that does not parse is ignored (no prefix rule) and an
    /// unknown source encoding falls back to `latin1`; both are logged.
    ///
    /// # Panics
    ///
    /// Panics if a non-empty pattern does not compile. That can only happen
    /// when validation was skipped; use [`Filter::compile`] for untrusted input.
    pub fn new(config: &FilterConfig) -> Self {
        let key_prefix = compile_key_prefix(&config.key_prefix).unwrap_or_else(|e| {
            warn!("Ignoring key-prefix rule: {}", e);
            Vec::new()
        });
        let key_pattern = compile_pattern(&config.key_pattern, FilterError::InvalidKeyPattern)
            .unwrap_or_else(|e| panic!("{} (configuration was not validated)", e));
        let value_pattern =
            compile_pattern(&config.value_pattern, FilterError::InvalidValuePattern)
                .unwrap_or_else(|e| panic!("{} (configuration was not validated)", e));
        let encoding = resolve_encoding(&config.source_encoding).unwrap_or_else(|e| {
            warn!("{}; falling back to latin1", e);
            SourceEncoding::default()
        });
        let filter = Self {
            key_prefix,
            key_pattern,
            value_pattern,
            encoding,
        };
        filter.log_compiled();
        filter
    }

    fn log_compiled(&self) {
        if (self.key_pattern.is_some() || self.value_pattern.is_some()) && !self.encoding.is_total() {
            warn!(
                "Source encoding {} cannot decode every byte sequence; undecodable keys and values are matched as empty text.",
                self.encoding
            );
        }
        debug!(
            target: "rowfilter_core::filter",
            "Compiled filter: key-prefix {} byte(s), key-pattern {:?}, value-pattern {:?}, encoding {}.",
            self.key_prefix.len(),
            self.key_pattern(),
            self.value_pattern(),
            self.encoding
        );
    }

    /// Decides whether `event` is forwarded (`true`) or dropped (`false`).
    ///
    /// Only put and delete events are filtered. Rules are checked cheapest
    /// first: key prefix, then key pattern, then (puts only) value pattern.
    pub fn event_match(&self, event: &RowEvent<'_>) -> bool {
        if !event.op_type.is_mutation() {
            return true;
        }

        if !self.key_prefix.is_empty() && !event.key.starts_with(&self.key_prefix) {
            trace!(target: "rowfilter_core::filter", "Dropping {:?} event: key-prefix mismatch.", event.op_type);
            return false;
        }

        if let Some(pattern) = &self.key_pattern {
            if !pattern.is_match(&convert_to_utf8(event.key, self.encoding)) {
                trace!(target: "rowfilter_core::filter", "Dropping {:?} event: key-pattern mismatch.", event.op_type);
                return false;
            }
        }

        if event.op_type == OpType::Put {
            if let Some(pattern) = &self.value_pattern {
                if !pattern.is_match(&convert_to_utf8(event.value, self.encoding)) {
                    trace!(target: "rowfilter_core::filter", "Dropping Put event: value-pattern mismatch.");
                    return false;
                }
            }
        }

        true
    }

    /// Whether no rule is configured.
    pub fn is_permissive(&self) -> bool {
        self.key_prefix.is_empty() && self.key_pattern.is_none() && self.value_pattern.is_none()
    }

    /// The key prefix rule in raw bytes; empty when absent.
    pub fn key_prefix(&self) -> &[u8] {
        &self.key_prefix
    }

    /// The key pattern as compiled, with Perl classes in ASCII form.
    pub fn key_pattern(&self) -> Option<&str> {
        self.key_pattern.as_ref().map(Regex::as_str)
    }

    /// The value pattern as compiled, with Perl classes in ASCII form.
    pub fn value_pattern(&self) -> Option<&str> {
        self.value_pattern.as_ref().map(Regex::as_str)
    }

    /// The encoding keys and values are decoded from before pattern matching.
    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }
}

impl EventFilter for Filter {
    fn event_match(&self, event: &RowEvent<'_>) -> bool {
        Filter::event_match(self, event)
    }
}
