//! errors.rs - Error types for the rowfilter-core library.
//!
//! Every fallible operation in the crate reports a `FilterError`. Errors raised
//! while checking a `FilterConfig` are wrapped in a variant naming the config
//! field they came from, so an operator can tell which rule to fix.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// All error types produced by `rowfilter-core`.
///
/// `#[non_exhaustive]` so that new rule kinds can add variants without a
/// breaking change for downstream matchers.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FilterError {
    #[error("malformed escape at offset {offset}: {reason}")]
    MalformedEscape { offset: usize, reason: String },

    #[error("unsupported key format '{0}' (expected one of: raw, escaped, hex)")]
    UnsupportedKeyFormat(String),

    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("invalid key-prefix: {0}")]
    InvalidKeyPrefix(#[source] Box<FilterError>),

    #[error("invalid key-pattern: {0}")]
    InvalidKeyPattern(#[source] regex::Error),

    #[error("invalid value-pattern: {0}")]
    InvalidValuePattern(#[source] regex::Error),

    #[error("invalid source-encoding: {0}")]
    InvalidSourceEncoding(#[source] Box<FilterError>),
}

impl FilterError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        FilterError::MalformedEscape {
            offset,
            reason: reason.into(),
        }
    }

    /// Name of the config field this error is attributed to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FilterError::InvalidKeyPrefix(_) => Some("key-prefix"),
            FilterError::InvalidKeyPattern(_) => Some("key-pattern"),
            FilterError::InvalidValuePattern(_) => Some("value-pattern"),
            FilterError::InvalidSourceEncoding(_) => Some("source-encoding"),
            _ => None,
        }
    }
}
