//! In-memory capture of operational events.
//!
//! The engine only emits `tracing` events and never needs a subscriber. Hosts
//! that want to show recent load activity (for example a `status` command)
//! attach an [`EventLog`] layer and read entries back through an
//! [`EventReader`]. Unlike a formatter, the layer keeps each structured field
//! separately so callers can inspect `path` or `error` directly.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Target prefix of every event emitted by this crate.
pub const ENGINE_TARGET: &str = "sciplens_core";

/// A single captured event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// Seconds since the log was created.
    pub elapsed_secs: f64,
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields other than `message`, in recording order.
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Value of a structured field, formatted as it was recorded.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for CapturedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5} {}", self.level.as_str(), self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct EventBuffer {
    entries: VecDeque<CapturedEvent>,
    capacity: usize,
    start_time: Instant,
}

impl EventBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            start_time: Instant::now(),
        }
    }

    fn push(&mut self, level: Level, target: String, visitor: FieldVisitor) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(CapturedEvent {
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
            level,
            target,
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// A `tracing` layer that keeps the most recent events in a ring buffer.
#[derive(Debug, Clone)]
pub struct EventLog {
    buffer: Arc<Mutex<EventBuffer>>,
    target_prefix: Option<String>,
}

impl EventLog {
    /// Capture every event, keeping at most `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(EventBuffer::new(capacity))),
            target_prefix: None,
        }
    }

    /// Capture only the engine's own events.
    pub fn engine_only(capacity: usize) -> Self {
        Self {
            target_prefix: Some(ENGINE_TARGET.to_string()),
            ..Self::new(capacity)
        }
    }

    /// Get a reader handle for the captured events.
    pub fn reader(&self) -> EventReader {
        EventReader {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if let Some(prefix) = &self.target_prefix
            && !metadata.target().starts_with(prefix.as_str())
        {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*metadata.level(), metadata.target().to_string(), visitor);
    }
}

/// A read handle for the event buffer.
#[derive(Debug, Clone)]
pub struct EventReader {
    buffer: Arc<Mutex<EventBuffer>>,
}

impl EventReader {
    /// Snapshot of all captured events, oldest first.
    pub fn entries(&self) -> Vec<CapturedEvent> {
        let buf = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buf.entries.iter().cloned().collect()
    }

    /// Captured events at `level` or more severe.
    pub fn at_least(&self, level: Level) -> Vec<CapturedEvent> {
        self.entries()
            .into_iter()
            .filter(|e| e.level <= level)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }
}
