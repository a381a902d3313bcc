//! In-memory log tail.
//!
//! [`LogBuffer`] is a cloneable handle to a bounded ring buffer of recent log
//! entries; [`BufferLayer`] is the `tracing` layer that fills it. Callers own
//! the buffer and hand clones to whoever needs to read it, so there is no
//! global logger state.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: impl Into<String>, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: level.into(),
            target: target.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:>5} {}: {}", self.timestamp, self.level, self.target, self.message)
    }
}

/// Bounded ring buffer of log entries. Holds at most `capacity` entries;
/// pushing onto a full buffer drops the oldest.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// A buffer pre-filled with `entries`, keeping only the newest that fit.
    pub fn with_entries(capacity: usize, entries: impl IntoIterator<Item = LogEntry>) -> Self {
        let buffer = Self::new(capacity);
        for entry in entries {
            buffer.push(entry);
        }
        buffer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Entries oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        // a panic mid-push cannot leave the deque inconsistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `tracing` layer that copies every event it sees into a [`LogBuffer`].
pub struct BufferLayer {
    buffer: LogBuffer,
}

impl BufferLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        self.buffer.push(LogEntry::new(
            meta.level().to_string(),
            meta.target(),
            visitor.finish(),
        ));
    }
}

/// Collects the `message` field plus any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn push_past_capacity_drops_oldest() {
        let buffer = LogBuffer::new(3);
        for i in 0..5 {
            buffer.push(LogEntry::new("INFO", "test", format!("m{i}")));
        }

        let messages: Vec<String> = buffer.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["m2", "m3", "m4"]);
        assert_eq!(buffer.len(), buffer.capacity());
    }

    #[test]
    fn clones_share_storage() {
        let buffer = LogBuffer::new(10);
        let reader = buffer.clone();
        buffer.push(LogEntry::new("WARN", "test", "shared"));
        assert_eq!(reader.len(), 1);

        reader.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn with_entries_keeps_newest() {
        let old: Vec<LogEntry> = (0..4).map(|i| LogEntry::new("INFO", "t", format!("{i}"))).collect();
        let buffer = LogBuffer::with_entries(2, old);
        let messages: Vec<String> = buffer.snapshot().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["2", "3"]);
    }

    #[test]
    fn layer_records_events_with_fields() {
        let buffer = LogBuffer::new(10);
        let subscriber = tracing_subscriber::registry().with(BufferLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(count = 3, "synced memos");
            tracing::warn!("plain warning");
        });

        let entries = buffer.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, "INFO");
        assert_eq!(entries[0].message, "synced memos count=3");
        assert_eq!(entries[1].level, "WARN");
        assert_eq!(entries[1].message, "plain warning");
    }
}
