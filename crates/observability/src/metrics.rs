//! Session metrics collection
//!
//! Prometheus recording helpers plus an in-memory aggregator for the
//! end-of-session summary.

use std::collections::HashMap;

use contracts::TelemetryRow;
use metrics::{counter, gauge, histogram};

/// Record a packet received from a source
pub fn record_packet_received(address: &str) {
    counter!(
        "recorder_packets_received_total",
        "address" => address.to_string()
    )
    .increment(1);
}

/// Record a rotation format classification
pub fn record_format_detected(address: &str, format: &str) {
    counter!(
        "recorder_format_detected_total",
        "address" => address.to_string(),
        "format" => format.to_string()
    )
    .increment(1);
}

/// Record a payload whose layout matched no documented shape
pub fn record_malformed_payload(address: &str) {
    counter!(
        "recorder_malformed_payloads_total",
        "address" => address.to_string()
    )
    .increment(1);
}

/// Record a row handed to a sink
pub fn record_row_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "recorder_rows_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record ingestion queue depth
pub fn record_queue_depth(depth: usize) {
    gauge!("recorder_ingestion_queue_depth").set(depth as f64);
}

/// Record end-to-end row latency (local receive to sink hand-off)
pub fn record_row_latency_ms(latency_ms: f64) {
    histogram!("recorder_row_latency_ms").record(latency_ms);
}

/// Session metrics aggregator
///
/// Aggregates rows in memory for the end-of-run summary the CLI prints.
#[derive(Debug, Clone, Default)]
pub struct SessionMetricsAggregator {
    /// Total rows seen
    pub total_rows: u64,

    /// Message rows seen
    pub message_rows: u64,

    /// Rows per device name
    pub device_counts: HashMap<String, u64>,

    /// Relative protocol timestamp of the latest device row
    pub last_rtime_ovr: Option<f64>,

    /// Inter-row protocol gap statistics (ms)
    pub gap_stats: RunningStats,
}

impl SessionMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics with one row
    pub fn update(&mut self, row: &TelemetryRow) {
        self.total_rows += 1;

        if row.is_message() {
            self.message_rows += 1;
            return;
        }

        *self.device_counts.entry(row.device.clone()).or_insert(0) += 1;

        if row.rtime_ovr.is_finite() {
            if let Some(last) = self.last_rtime_ovr {
                let gap = row.rtime_ovr - last;
                if gap >= 0.0 {
                    self.gap_stats.push(gap * 1000.0);
                }
            }
            self.last_rtime_ovr = Some(row.rtime_ovr);
        }
    }

    /// Produce a summary report
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_rows: self.total_rows,
            message_rows: self.message_rows,
            device_counts: self.device_counts.clone(),
            recorded_secs: self.last_rtime_ovr.unwrap_or(0.0),
            gap_ms: StatsSummary::from(&self.gap_stats),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Session summary
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub total_rows: u64,
    pub message_rows: u64,
    pub device_counts: HashMap<String, u64>,
    pub recorded_secs: f64,
    pub gap_ms: StatsSummary,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Total rows: {}", self.total_rows)?;
        writeln!(f, "Message rows: {}", self.message_rows)?;
        writeln!(f, "Recorded span: {:.3} s", self.recorded_secs)?;
        writeln!(f, "Inter-row gap (ms): {}", self.gap_ms)?;

        if !self.device_counts.is_empty() {
            writeln!(f, "Rows per device:")?;
            let mut devices: Vec<_> = self.device_counts.iter().collect();
            devices.sort_by_key(|(name, _)| name.as_str());
            for (device, count) in devices {
                writeln!(f, "  {}: {}", device, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
