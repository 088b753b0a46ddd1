//! shared.rs - A reloadable handle to the active filter.
//!
//! The pipeline keeps one `SharedFilter` for the lifetime of a session.
//! Workers call `load()` (or use it directly as an `EventFilter`) and get the
//! `Arc<Filter>` that is current at that moment. Reconfiguration compiles a
//! new `Filter` and swaps the `Arc`; workers still holding the previous one
//! finish with it undisturbed.
//!
//! License: MIT OR APACHE 2.0

use std::sync::{Arc, PoisonError, RwLock};

use log::{info, warn};

use crate::config::FilterConfig;
use crate::engine::EventFilter;
use crate::errors::FilterError;
use crate::event::RowEvent;
use crate::filter::Filter;

/// Shared ownership of the current `Filter`, replaced wholesale on reload.
#[derive(Debug, Default)]
pub struct SharedFilter {
    current: RwLock<Arc<Filter>>,
}

impl SharedFilter {
    pub fn new(filter: Filter) -> Self {
        Self {
            current: RwLock::new(Arc::new(filter)),
        }
    }

    /// Validates and compiles `config` into a new shared filter.
    pub fn from_config(config: &FilterConfig) -> Result<Self, FilterError> {
        config.compile().map(Self::new)
    }

    /// Returns the filter that is active right now.
    pub fn load(&self) -> Arc<Filter> {
        // The lock only guards an `Arc` swap, so a poisoned lock still holds a
        // complete filter.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `filter` and returns the one it replaced.
    pub fn replace(&self, filter: Filter) -> Arc<Filter> {
        let next = Arc::new(filter);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Compiles `config` and, if it is valid, makes it the active filter.
    ///
    /// On error the previously active filter stays in place.
    pub fn reload(&self, config: &FilterConfig) -> Result<(), FilterError> {
        let filter = match config.compile() {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Rejected filter reconfiguration, keeping current filter: {}", e);
                return Err(e);
            }
        };
        self.replace(filter);
        info!("Filter reconfigured.");
        Ok(())
    }
}

impl From<Filter> for SharedFilter {
    fn from(filter: Filter) -> Self {
        Self::new(filter)
    }
}

impl EventFilter for SharedFilter {
    fn event_match(&self, event: &RowEvent<'_>) -> bool {
        self.load().event_match(event)
    }
}
