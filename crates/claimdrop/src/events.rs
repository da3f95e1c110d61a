//! Event sinks: where engines publish [`Event`]s.

use std::sync::Mutex;

use claimdrop_core::Event;

/// Receives events from the engines.
///
/// `emit` is infallible; a sink that can fail must handle it internally.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Logs every event through `tracing`. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        tracing::info!(event = event.name(), ?event, "event emitted");
    }
}

/// Keeps events in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Remove and return everything emitted so far.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemoryEventLog {
    fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdrop_core::Address;

    #[test]
    fn test_memory_log_order_and_drain() {
        let log = MemoryEventLog::new();
        assert!(log.is_empty());

        log.emit(Event::TokenBatchCompleted {
            token: Address::ZERO,
            total: 1,
        });
        log.emit(Event::BatchRefunded {
            to: Address::ZERO,
            amount: 2,
        });

        let events = log.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "TokenBatchCompleted");
        assert_eq!(events[1].name(), "BatchRefunded");
        assert!(log.is_empty());
    }
}
