//! Trial event log and sinks.
//!
//! The engine appends typed [`Event`]s to an [`EventLog`]. Each appended
//! [`LogEntry`] is stamped with the wall-clock time and handed to a
//! [`LogSink`]; the engine itself never writes anything out. The stock sink
//! serializes entries as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::trial::{Choice, Phase, Side, Stimulus};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A domain event of the trial engine.
///
/// Serialized with a lowercase `"type"` tag so consumers can dispatch on
/// the event kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The engine was constructed and both grids reset.
    Init,

    /// An update tick placed (or failed to place) one stimulus per grid.
    Tick {
        /// Left grid stimulus, `null` when the grid is depleted.
        left: Option<Stimulus>,
        /// Right grid stimulus, `null` when the grid is depleted.
        right: Option<Stimulus>,
    },

    /// A grid had no free cell left during an update tick.
    Depleted {
        /// The depleted grid.
        side: Side,
    },

    /// The external advance trigger fired.
    Click {
        /// Phase entered by this trigger.
        phase: Phase,
    },

    /// The subject picked a grid.
    Select {
        /// Chosen option.
        value: Choice,
    },
}

impl Event {
    /// Returns the serialized `type` tag of this event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Tick { .. } => "tick",
            Self::Depleted { .. } => "depleted",
            Self::Click { .. } => "click",
            Self::Select { .. } => "select",
        }
    }
}

/// An [`Event`] stamped with the time it was logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// When the event was logged (RFC 3339, UTC).
    pub timestamp: DateTime<Utc>,
    /// The event itself (flattened into the same JSON object).
    #[serde(flatten)]
    pub event: Event,
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Transport for log entries.
pub trait LogSink: Send {
    /// Receives one freshly appended entry.
    fn emit(&self, entry: &LogEntry);
}

/// Sink that drops every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _entry: &LogEntry) {}
}

/// Wraps a [`LogEntry`] with a monotonically increasing sequence number.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    /// Zero-based, monotonically increasing sequence counter.
    sequence: u64,
    /// The wrapped entry (flattened into the same JSON object).
    #[serde(flatten)]
    entry: &'a LogEntry,
}

/// Thread-safe, buffered JSONL writer.
///
/// Each call to [`emit`](LogSink::emit) increments the sequence counter,
/// serializes the entry as a single JSON line, and flushes the underlying
/// writer. Serialization or I/O failures are dropped: a broken log
/// transport must never stop a trial.
pub struct JsonlSink {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug.
impl std::fmt::Debug for JsonlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlSink")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl JsonlSink {
    /// Creates a sink that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates a sink that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that truncates and writes to the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub async fn create(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::File::create(path).await?.into_std().await;
        Ok(Self::new(Box::new(file)))
    }

    /// Returns the number of entries emitted so far.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl LogSink for JsonlSink {
    fn emit(&self, entry: &LogEntry) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope { sequence, entry };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Append-only, ordered record of trial events.
///
/// Entries are never mutated or removed except by [`clear`](Self::clear).
pub struct EventLog {
    entries: Vec<LogEntry>,
    sink: Box<dyn LogSink>,
}

impl EventLog {
    /// Creates an empty log forwarding every entry to `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn LogSink>) -> Self {
        Self {
            entries: Vec::new(),
            sink,
        }
    }

    /// Appends an event stamped with the current time and forwards it to
    /// the sink.
    pub fn log(&mut self, event: Event) {
        // Keep timestamps non-decreasing even if the wall clock steps back.
        let now = Utc::now();
        let timestamp = self
            .entries
            .last()
            .map_or(now, |last| last.timestamp.max(now));

        let entry = LogEntry { timestamp, event };
        self.sink.emit(&entry);
        self.entries.push(entry);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns all entries in log order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries of the given `type` tag.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.entries.iter().filter(move |e| e.event.kind() == kind)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
