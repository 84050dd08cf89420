//! LocalClock - monotonic wall-clock shared by ingestion and the row engine
//!
//! Packet receive times and log-message times must come from the same
//! monotonic source, otherwise the relative local timestamps drift apart.

use std::time::Instant;

/// Monotonic local clock anchored at session creation.
///
/// `now()` returns seconds since the anchor as f64, the unit used throughout
/// the row schema. Clones share the same anchor value, so readings from any
/// clone are mutually comparable.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    origin: Instant,
}

impl LocalClock {
    /// Create a clock anchored at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since the anchor.
    #[inline]
    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new()
    }
}
