//! Generic device adapter
//!
//! Adapts any `PacketSource` to the `DeviceAdapter` interface, so the
//! pipeline handles the real transport, mocks and replays uniformly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{LocalClock, PacketCallback, PacketSource, RawPacket};
use tracing::{debug, trace};

use crate::adapter::DeviceAdapter;
use crate::common::send_packet;
use crate::config::{BackpressureConfig, IngestionMetrics};

/// Generic device adapter
///
/// Stamps the shared local clock at callback time so packets from every
/// source live on one timeline.
pub struct GenericDeviceAdapter {
    source: Box<dyn PacketSource>,
    clock: LocalClock,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl GenericDeviceAdapter {
    /// Create a new generic adapter
    pub fn new(source: Box<dyn PacketSource>, clock: LocalClock, config: BackpressureConfig) -> Self {
        Self {
            source,
            clock,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl DeviceAdapter for GenericDeviceAdapter {
    fn address(&self) -> &str {
        self.source.address()
    }

    fn start(&self, tx: Sender<RawPacket>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let address = self.source.address().clone();
        let clock = self.clock;
        let drop_policy = self.config.drop_policy;
        let listening = self.listening.clone();

        debug!(address = %address, "starting generic adapter");

        let callback: PacketCallback = Arc::new(move |event| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            let packet = RawPacket::from_event(event, clock.now());
            metrics.record_received();
            trace!(address = %address, "generic adapter received packet");
            send_packet(&tx, packet, &metrics, &address, drop_policy);
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(address = %self.source.address(), "stopping generic adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
