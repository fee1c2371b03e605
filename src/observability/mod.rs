//! Observability module
//!
//! Logging, metrics, and the trial event log.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventLog, JsonlSink, LogEntry, LogSink, NullSink};
pub use logging::{LogDestination, LogFormat, LogSettings, init_logging};
pub use metrics::init_metrics;
