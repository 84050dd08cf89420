//! # Dispatcher
//!
//! Row fan-out module.
//!
//! Responsibilities:
//! - Consume `TelemetryRow`
//! - Fan-out to multiple sinks
//! - Isolate slow sinks from the main path
//! - Serialize appends per sink (row order = send order)

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{RowSink, TelemetryRow};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{CsvSink, LogSink, RowFormatter};
