//! LogSink - echoes rows to the tracing log

use contracts::{ContractError, RowSink, TelemetryRow};
use tracing::{debug, info};

/// Sink that logs a one-line summary of each row
///
/// Used as the verbose console echo during live sessions and as a
/// zero-setup sink in tests.
pub struct LogSink {
    name: String,
    row_count: u64,
}

impl LogSink {
    /// Create a new LogSink
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            row_count: 0,
        }
    }
}

impl RowSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, row: &TelemetryRow) -> Result<(), ContractError> {
        self.row_count += 1;

        if row.is_message() {
            info!(
                sink = %self.name,
                rtime_sys = row.rtime_sys,
                message = %row.message,
                "message row"
            );
        } else {
            info!(
                sink = %self.name,
                device = %row.device,
                device_id = row.device_id,
                rtime_ovr = row.rtime_ovr,
                pos_x = row.position[0],
                pos_y = row.position[1],
                pos_z = row.position[2],
                "device row"
            );
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, rows = self.row_count, "log sink closed");
        Ok(())
    }
}
