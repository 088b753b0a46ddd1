// rowfilter-core/src/lib.rs
//! # Rowfilter Core Library
//!
//! `rowfilter-core` decides, for each row change event replicated from a
//! key/value store, whether a change-data-capture pipeline should forward it
//! downstream or drop it. Decisions are driven by three operator rules:
//!
//! * `key-prefix`: a binary prefix in escaped form (`\x00\x01`) that keys must start with.
//! * `key-pattern`: a regular expression tested against the decoded key.
//! * `value-pattern`: a regular expression tested against the decoded value of puts.
//!
//! Keys and values are arbitrary bytes. Before pattern matching they are
//! decoded with a configurable legacy encoding (`latin1` by default) that maps
//! every byte to a character, so binary data never makes a decision fail.
//!
//! ## Modules
//!
//! * `config`: `FilterConfig`, the rule set as written by the operator, and its validation.
//! * `filter`: `Filter`, the compiled immutable matcher, and the per-event decision.
//! * `key_codec`: Parsing of escaped, raw and hex textual keys into bytes.
//! * `encoding`: Decoding of raw bytes into text for pattern matching.
//! * `event`: `RowEvent` and `OpType`, the borrowed view of a change event.
//! * `engine`: The `EventFilter` trait the pipeline programs against.
//! * `shared`: `SharedFilter`, a reloadable handle to the active filter.
//! * `errors`: `FilterError`.
//!
//! ## Usage Example
//!
//! ```rust
//! use rowfilter_core::{FilterConfig, RowEvent};
//!
//! let config = FilterConfig {
//!     key_prefix: r"\x00".to_string(),
//!     value_pattern: "^foo".to_string(),
//!     ..Default::default()
//! };
//!
//! // Reject bad configuration up front, then compile once.
//! let filter = config.compile().expect("valid configuration");
//!
//! assert!(filter.event_match(&RowEvent::put(&[0x00, 0x01], b"foobar")));
//! assert!(!filter.event_match(&RowEvent::put(&[0x00, 0x01], b"barfoo")));
//! // Value rules do not apply to deletes.
//! assert!(filter.event_match(&RowEvent::delete(&[0x00, 0x01])));
//! ```
//!
//! ## Error Handling
//!
//! Configuration mistakes are reported by `FilterConfig::validate` and
//! `FilterConfig::compile` as a `FilterError` naming the offending field.
//! Matching itself never fails.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod encoding;
pub mod engine;
pub mod errors;
pub mod event;
pub mod filter;
pub mod key_codec;
pub mod shared;

/// Re-exports the rule set and its compiled form.
pub use config::FilterConfig;
pub use filter::Filter;

/// Re-exports the custom error type for clear error reporting.
pub use errors::FilterError;

pub use engine::EventFilter;
pub use event::{OpType, RowEvent};
pub use shared::SharedFilter;

pub use encoding::{convert_to_utf8, convert_to_utf8_label, SourceEncoding};
pub use key_codec::{parse_key, parse_key_with, KeyFormat};
