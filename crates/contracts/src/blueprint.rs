//! RecorderBlueprint - Config Loader output
//!
//! Describes a complete recording session: subscribed addresses, timestamp
//! precision, transport binding, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RowSchema;

/// Address patterns the Brekel OpenVR recorder is known to emit.
pub const KNOWN_ADDRESSES: [&str; 7] = [
    "/HMD",
    "/TrackingReference",
    "/DisplayRedirect",
    "/Controller",
    "/GenericTracker",
    "/Hand_L",
    "/Hand_R",
];

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Transport binding for the external OSC substrate
    #[serde(default)]
    pub network: NetworkConfig,

    /// Output routing configuration
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

impl Default for RecorderBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            session: SessionConfig::default(),
            network: NetworkConfig::default(),
            sinks: default_sinks(),
        }
    }
}

impl RecorderBlueprint {
    /// Derive the session-wide row schema from the subscribed addresses.
    pub fn row_schema(&self) -> RowSchema {
        RowSchema::from_patterns(&self.session.addresses)
    }
}

/// Session settings: subscriptions, duration, output formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// OSC address patterns to subscribe to
    #[serde(default = "default_addresses")]
    pub addresses: Vec<String>,

    /// Recording duration in seconds (0 = until externally stopped)
    #[serde(default)]
    pub duration_secs: u64,

    /// Decimal precision of numeric output fields
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Output field separator
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            addresses: default_addresses(),
            duration_secs: 0,
            precision: default_precision(),
            separator: default_separator(),
        }
    }
}

fn default_addresses() -> Vec<String> {
    vec![
        "/HMD".to_string(),
        "/Controller".to_string(),
        "/Hand_L".to_string(),
        "/Hand_R".to_string(),
    ]
}

fn default_precision() -> usize {
    10
}

fn default_separator() -> String {
    ",".to_string()
}

/// Transport binding, carried for the external OSC substrate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// IP address to listen on
    #[serde(default = "default_bind_ip")]
    pub bind_ip: String,

    /// UDP port to listen on for OSC data
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_ip: default_bind_ip(),
            bind_port: default_bind_port(),
        }
    }
}

fn default_bind_ip() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    7775
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// CSV file output
    Csv,
    /// Console echo via tracing
    Log,
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        name: "csv".to_string(),
        sink_type: SinkType::Csv,
        queue_capacity: default_queue_capacity(),
        params: HashMap::from([("path".to_string(), "openvr_data.csv".to_string())]),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_recorder_tool() {
        let bp = RecorderBlueprint::default();
        assert_eq!(bp.session.addresses.len(), 4);
        assert_eq!(bp.session.precision, 10);
        assert_eq!(bp.session.duration_secs, 0);
        assert_eq!(bp.network.bind_ip, "127.0.0.1");
        assert_eq!(bp.network.bind_port, 7775);
        assert_eq!(bp.sinks.len(), 1);
        assert_eq!(bp.sinks[0].sink_type, SinkType::Csv);
        assert_eq!(
            bp.sinks[0].params.get("path").map(String::as_str),
            Some("openvr_data.csv")
        );
    }

    #[test]
    fn test_default_schema_is_full_width() {
        let bp = RecorderBlueprint::default();
        let schema = bp.row_schema();
        assert!(schema.has_buttons);
        assert_eq!(schema.hand_joints, 24);
    }

    #[test]
    fn test_known_addresses_cover_defaults() {
        let bp = RecorderBlueprint::default();
        for addr in &bp.session.addresses {
            assert!(KNOWN_ADDRESSES.contains(&addr.as_str()));
        }
    }
}
