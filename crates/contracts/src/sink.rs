//! RowSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, TelemetryRow};

/// Row output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(RowSink: Send)]
pub trait LocalRowSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append one unified row
    ///
    /// # Errors
    /// Returns write error (should include context). Failures are not
    /// retried by the sink; the caller decides whether to abort the session.
    async fn write(&mut self, row: &TelemetryRow) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink; must be idempotent
    async fn close(&mut self) -> Result<(), ContractError>;
}
