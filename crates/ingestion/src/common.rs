//! Adapter common utility functions

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{DropPolicy, RawPacket};
use metrics::counter;
use tracing::trace;

use crate::config::IngestionMetrics;

/// Send packet, handling backpressure policy
#[inline]
pub fn send_packet(
    tx: &Sender<RawPacket>,
    packet: RawPacket,
    metrics: &Arc<IngestionMetrics>,
    address: &str,
    drop_policy: DropPolicy,
) {
    match tx.try_send(packet) {
        Ok(_) => {
            metrics.update_queue_len(tx.len());
            trace!(address = %address, "packet sent");
        }
        Err(TrySendError::Full(_)) => {
            metrics.record_dropped();
            counter!("ingestion_packets_dropped_total", "address" => address.to_string())
                .increment(1);
            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(address = %address, "packet dropped (newest)");
                }
                DropPolicy::DropOldest => {
                    // async-channel has no pop, so the incoming packet is
                    // dropped either way
                    trace!(address = %address, "packet dropped (oldest fallback)");
                }
            }
        }
        Err(TrySendError::Closed(_)) => {
            tracing::warn!(address = %address, "channel closed");
        }
    }
}
