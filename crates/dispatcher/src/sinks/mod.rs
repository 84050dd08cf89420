//! Built-in sinks

mod csv;
mod log;

pub use csv::{CsvSink, RowFormatter};
pub use log::LogSink;
