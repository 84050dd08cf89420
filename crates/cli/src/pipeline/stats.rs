//! Session statistics collection and reporting.

use std::time::Duration;

use observability::SessionMetricsAggregator;

/// Statistics collected during a recording session
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Total packets received from ingestion
    pub packets_received: u64,

    /// Total rows handed to the dispatcher
    pub rows_emitted: u64,

    /// Message rows among the emitted rows
    pub message_rows: u64,

    /// Packets dropped by ingestion backpressure
    pub packets_dropped: u64,

    /// Payloads whose length matched no known layout
    pub malformed_payloads: u64,

    /// Number of registered packet sources
    pub active_sources: usize,

    /// Number of active sinks
    pub active_sinks: usize,

    /// Wall-clock session duration
    pub duration: Duration,

    /// Per-device row aggregates
    pub session_metrics: SessionMetricsAggregator,
}

impl SessionStats {
    /// Rows per second over the whole session
    pub fn rows_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows_emitted as f64 / secs
        } else {
            0.0
        }
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        println!();
        println!("=== Session Summary ===");
        println!("Duration:           {:.2}s", self.duration.as_secs_f64());
        println!("Packets received:   {}", self.packets_received);
        println!("Packets dropped:    {}", self.packets_dropped);
        println!("Rows emitted:       {}", self.rows_emitted);
        println!("Rows/sec:           {:.1}", self.rows_per_sec());
        println!("Malformed payloads: {}", self.malformed_payloads);
        println!("Sources:            {}", self.active_sources);
        println!("Sinks:              {}", self.active_sinks);
        println!();
        print!("{}", self.session_metrics.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_sec() {
        let stats = SessionStats {
            rows_emitted: 900,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((stats.rows_per_sec() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rows_per_sec_zero_duration() {
        let stats = SessionStats::default();
        assert_eq!(stats.rows_per_sec(), 0.0);
    }
}
