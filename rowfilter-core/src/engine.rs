// rowfilter-core/src/engine.rs
//! Defines the `EventFilter` trait the pipeline programs against.
//!
//! A CDC pipeline evaluates events from many producers at once, so every
//! implementation must be `Send + Sync` and decide without mutating itself.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use crate::event::RowEvent;

/// A forward/drop decision over row change events.
pub trait EventFilter: Send + Sync {
    /// Returns `true` if `event` should be forwarded downstream.
    fn event_match(&self, event: &RowEvent<'_>) -> bool;

    /// Keeps the events of a batch that should be forwarded, in order.
    fn forwarded<'e>(&self, events: &[RowEvent<'e>]) -> Vec<RowEvent<'e>> {
        events
            .iter()
            .filter(|event| self.event_match(event))
            .copied()
            .collect()
    }
}

impl<T: EventFilter + ?Sized> EventFilter for Arc<T> {
    fn event_match(&self, event: &RowEvent<'_>) -> bool {
        (**self).event_match(event)
    }
}

impl<T: EventFilter + ?Sized> EventFilter for Box<T> {
    fn event_match(&self, event: &RowEvent<'_>) -> bool {
        (**self).event_match(event)
    }
}
