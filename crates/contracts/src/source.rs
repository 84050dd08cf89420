//! PacketSource trait - transport substrate abstraction
//!
//! The OSC/UDP server that actually binds a socket is an external
//! collaborator. This trait is the seam it plugs into: one source per
//! subscribed address pattern, delivering matched packets through a callback.
//! Mock and replay sources implement the same trait so the pipeline runs
//! without the real substrate.

use std::sync::Arc;

use crate::{DeviceAddress, OscEvent};

/// Packet delivery callback type
///
/// Invoked by a source for every matched packet. Uses `Arc` to allow callback
/// sharing across multiple sources.
pub type PacketCallback = Arc<dyn Fn(OscEvent) + Send + Sync>;

/// Backpressure policy when the ingestion channel is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPolicy {
    /// Drop the incoming packet
    #[default]
    DropNewest,
    /// Drop the oldest queued packet
    DropOldest,
}

/// Packet source trait
///
/// Abstracts the common behavior of the real transport and the mock/replay
/// sources. The local receive timestamp is deliberately NOT produced here:
/// ingestion stamps it at callback time so every source shares one clock.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn PacketSource> = make_source();
/// source.listen(Arc::new(|event| {
///     println!("packet from {}", event.address);
/// }));
/// // ... run session ...
/// source.stop();
/// ```
pub trait PacketSource: Send + Sync {
    /// OSC address pattern this source delivers
    fn address(&self) -> &DeviceAddress;

    /// Register the delivery callback
    ///
    /// If already listening, repeated calls should be idempotent (won't
    /// register multiple callbacks).
    fn listen(&self, callback: PacketCallback);

    /// Stop delivering packets
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
