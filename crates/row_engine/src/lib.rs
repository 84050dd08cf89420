//! # Row Engine
//!
//! The ingestion-and-normalization core: turns heterogeneous device payloads
//! and experimenter log messages into unified, timestamp-synchronized rows.
//!
//! Responsibilities:
//! - Rotation format detection (quaternion vs. Euler), first-seen-wins per address
//! - Positional payload mapping onto the fixed row schema
//! - Relative timestamp computation against the session start
//! - Log-message rows on the same timeline
//!
//! ## Usage Example
//!
//! ```ignore
//! use row_engine::RecorderEngine;
//! use contracts::{LocalClock, RowSchema};
//!
//! let engine = RecorderEngine::new(RowSchema::default(), LocalClock::new());
//!
//! // Packets as they arrive from ingestion
//! let row = engine.process_packet(packet);
//!
//! // Condition markers from the session controller
//! let marker = engine.log_message("condition_A_start");
//! ```

mod clock;
mod detector;
mod engine;
mod normalize;

// Re-exports
pub use clock::{SessionClock, SyncedTimes, TimestampSynchronizer};
pub use detector::FormatDetector;
pub use engine::RecorderEngine;
pub use normalize::normalize;

// Re-export contracts types
pub use contracts::{RawPacket, RotationFormat, RowSchema, TelemetryRow};
