//! Dispatcher - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{RowSchema, SinkConfig, SinkType, TelemetryRow};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{CsvSink, LogSink, RowFormatter};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,

    /// Session-wide row schema
    pub schema: RowSchema,

    /// Decimal precision for numeric fields
    pub precision: usize,

    /// Output field separator
    pub separator: String,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<TelemetryRow>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<TelemetryRow>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config)?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(config: &DispatcherConfig) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(config, sink_config)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, sink_config),
    fields(sink = %sink_config.name, sink_type = ?sink_config.sink_type)
)]
fn create_sink_handle(
    config: &DispatcherConfig,
    sink_config: &SinkConfig,
) -> Result<SinkHandle, DispatcherError> {
    match sink_config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&sink_config.name);
            Ok(SinkHandle::spawn(sink, sink_config.queue_capacity))
        }
        SinkType::Csv => {
            let formatter = RowFormatter::new(
                config.schema.clone(),
                config.precision,
                config.separator.clone(),
            );
            let sink = CsvSink::from_params(&sink_config.name, &sink_config.params, formatter)
                .map_err(|e| DispatcherError::sink_creation(&sink_config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, sink_config.queue_capacity))
        }
    }
}

/// The main Dispatcher that fans out rows to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<TelemetryRow>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<TelemetryRow>) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes rows from input and fans out to all sinks.
    /// Returns when input channel is closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut row_count: u64 = 0;

        while let Some(row) = self.input_rx.recv().await {
            row_count += 1;
            self.dispatch_row(&row);

            if row_count.is_multiple_of(1000) {
                debug!(rows = row_count, "Dispatcher progress");
            }
        }

        info!(rows = row_count, "Dispatcher input closed, shutting down");

        Self::shutdown_handles(self.handles).await;

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_row(&self, row: &TelemetryRow) {
        for handle in &self.handles {
            handle.try_send(row.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from configuration
#[instrument(name = "dispatcher_create", skip(config, input_rx))]
pub fn create_dispatcher(
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<TelemetryRow>,
) -> Result<Dispatcher, DispatcherError> {
    DispatcherBuilder::new(config, input_rx).build()
}
