//! Device adapter trait

use std::sync::Arc;

use async_channel::Sender;
use contracts::RawPacket;

use crate::config::IngestionMetrics;

/// Device adapter trait
///
/// One adapter per subscribed address pattern. Responsible for:
/// 1. Registering the source callback
/// 2. Stamping the local receive time
/// 3. Wrapping events into `RawPacket`
/// 4. Sending to the channel (handling backpressure)
pub trait DeviceAdapter: Send + Sync {
    /// Address pattern this adapter serves
    fn address(&self) -> &str;

    /// Start packet delivery
    ///
    /// # Arguments
    /// * `tx` - Packet send channel
    /// * `metrics` - Shared ingestion metrics
    fn start(&self, tx: Sender<RawPacket>, metrics: Arc<IngestionMetrics>);

    /// Stop packet delivery
    fn stop(&self);

    /// Check if the adapter is listening
    fn is_listening(&self) -> bool;
}
