// File: rowfilter-core/src/event.rs
//! The row change events a filter decides on.
//!
//! Events are decoded from the change feed by the pipeline; this crate only
//! borrows their operation type, key and value.

use serde::{Deserialize, Serialize};

/// Kind of row mutation carried by a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    Put,
    Delete,
    /// Any non-mutation row entry (e.g. administrative or unknown kinds).
    Other,
}

impl OpType {
    /// Maps a change-feed row op code (`1` = put, `2` = delete) to an `OpType`.
    pub fn from_wire(code: i32) -> Self {
        match code {
            1 => OpType::Put,
            2 => OpType::Delete,
            _ => OpType::Other,
        }
    }

    /// Whether events of this kind are subject to filtering.
    pub fn is_mutation(&self) -> bool {
        matches!(self, OpType::Put | OpType::Delete)
    }
}

/// A borrowed view of one row change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEvent<'a> {
    pub op_type: OpType,
    pub key: &'a [u8],
    /// Only meaningful for `OpType::Put`.
    pub value: &'a [u8],
}

impl<'a> RowEvent<'a> {
    pub fn new(op_type: OpType, key: &'a [u8], value: &'a [u8]) -> Self {
        Self { op_type, key, value }
    }

    pub fn put(key: &'a [u8], value: &'a [u8]) -> Self {
        Self::new(OpType::Put, key, value)
    }

    pub fn delete(key: &'a [u8]) -> Self {
        Self::new(OpType::Delete, key, &[])
    }
}
