//! Configuration for `rowfilter-core`.
//!
//! `FilterConfig` is the operator-facing rule set exactly as it appears in the
//! pipeline's configuration file (`key-prefix`, `key-pattern`,
//! `value-pattern`, `source-encoding`). Reading that file is left to the
//! caller; this module only checks the rules and turns them into a `Filter`.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::FilterError;
use crate::filter::Filter;

/// The unvalidated rule set of a row filter.
///
/// Every field is optional; an empty string means the rule is absent, and an
/// absent rule never rejects an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Binary key prefix in escaped format, e.g. `\x00\x01`.
    pub key_prefix: String,
    /// Regular expression tested against the decoded key.
    pub key_pattern: String,
    /// Regular expression tested against the decoded value of put events.
    pub value_pattern: String,
    /// Encoding label used to decode keys and values before pattern
    /// matching. Empty means `latin1`.
    pub source_encoding: String,
}

impl FilterConfig {
    /// Whether no rule is configured, i.e. the filter forwards everything.
    pub fn is_empty(&self) -> bool {
        self.key_prefix.is_empty() && self.key_pattern.is_empty() && self.value_pattern.is_empty()
    }

    /// Checks every non-empty rule and reports the first one that does not
    /// parse, attributed to its field (`invalid key-prefix: ...`).
    ///
    /// The compiled rules are discarded; call [`FilterConfig::compile`] to
    /// keep them.
    pub fn validate(&self) -> Result<(), FilterError> {
        Filter::try_build(self).map(drop)?;
        debug!("Filter configuration is valid.");
        Ok(())
    }

    /// Validates and compiles the rule set in one pass.
    pub fn compile(&self) -> Result<Filter, FilterError> {
        Filter::compile(self)
    }
}
