//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{LocalClock, PacketSource, RawPacket};
use tracing::{debug, info, instrument};

use crate::adapter::DeviceAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::generic_adapter::GenericDeviceAdapter;

/// Ingestion Pipeline
///
/// Manages one adapter per subscribed address pattern and funnels every
/// packet into a single bounded channel. All adapters stamp receive times
/// from the same shared clock.
pub struct IngestionPipeline {
    /// Registered adapters, keyed by address pattern
    adapters: HashMap<String, Box<dyn DeviceAdapter>>,

    /// Shared clock for local receive timestamps
    clock: LocalClock,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Packet sender (shared by all adapters)
    tx: Sender<RawPacket>,

    /// Packet receiver
    rx: Option<Receiver<RawPacket>>,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create a new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - Channel capacity
    /// * `clock` - Shared local clock
    pub fn new(channel_capacity: usize, clock: LocalClock) -> Self {
        Self::with_config(
            BackpressureConfig {
                channel_capacity,
                ..Default::default()
            },
            clock,
        )
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig, clock: LocalClock) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);

        Self {
            adapters: HashMap::new(),
            clock,
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
            default_config: config,
        }
    }

    /// Register a packet source
    ///
    /// The source's address pattern is the registration key; registering a
    /// second source for the same address replaces the first.
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source, config),
        fields(address = %source.address())
    )]
    pub fn register_source(
        &mut self,
        source: Box<dyn PacketSource>,
        config: Option<BackpressureConfig>,
    ) {
        let address = source.address().to_string();
        let adapter = GenericDeviceAdapter::new(
            source,
            self.clock,
            config.unwrap_or_else(|| self.default_config.clone()),
        );
        debug!(address = %address, "registered packet source");
        self.adapters.insert(address, Box::new(adapter));
    }

    /// Start all registered sources
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all device adapters");
        for (address, adapter) in &self.adapters {
            if !adapter.is_listening() {
                debug!(address = %address, "starting adapter");
                adapter.start(self.tx.clone(), self.metrics.clone());
            }
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all device adapters");
        for (address, adapter) in &self.adapters {
            if adapter.is_listening() {
                debug!(address = %address, "stopping adapter");
                adapter.stop();
            }
        }
    }

    /// Get the packet stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<RawPacket>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check whether any adapter is still delivering
    pub fn is_any_listening(&self) -> bool {
        self.adapters.values().any(|a| a.is_listening())
    }

    /// Check if the source for an address is listening
    pub fn is_source_listening(&self, address: &str) -> bool {
        self.adapters
            .get(address)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
