//! # Ingestion Pipeline
//!
//! Packet ingestion module.
//!
//! Responsibilities:
//! - Register packet sources (real transport, mock, replay)
//! - Stamp local receive timestamps from one shared clock
//! - Backpressure management and drop policy
//! - Send to downstream via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::LocalClock;
//! use ingestion::{IngestionPipeline, MockDeviceSource};
//!
//! let clock = LocalClock::new();
//! let mut pipeline = IngestionPipeline::new(100, clock);
//! pipeline.register_source(Box::new(MockDeviceSource::with_defaults("/HMD")), None);
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(packet) = rx.recv().await {
//!     // Process packet
//! }
//! ```

mod adapter;
mod common;
mod config;
mod error;
mod generic_adapter;
mod mock;
mod pipeline;
mod replay;

// Re-exports
pub use adapter::DeviceAdapter;
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::RawPacket;
pub use error::{IngestionError, Result};
pub use generic_adapter::GenericDeviceAdapter;
pub use mock::{MockDeviceSource, MockSourceConfig};
pub use pipeline::IngestionPipeline;
pub use replay::ReplaySource;
