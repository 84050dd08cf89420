//! Replay packet source
//!
//! Re-emits a previously captured session from a JSON-lines file. Each line
//! is one event: `{"address": "/HMD", "args": [...], "time_protocol": 12.5}`.
//! Inter-packet pacing follows the recorded protocol timestamps.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{DeviceAddress, Field, OscEvent, PacketCallback, PacketSource};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{IngestionError, Result};

#[derive(Debug, Deserialize)]
struct ReplayRecord {
    address: String,
    args: Vec<Field>,
    time_protocol: f64,
}

/// Replay source for one address pattern
///
/// Loads the whole file up front so decode errors surface at construction,
/// not mid-session. Only records matching the source address are kept.
#[derive(Debug)]
pub struct ReplaySource {
    address: DeviceAddress,
    events: Arc<Vec<OscEvent>>,
    /// Playback speed multiplier, 0 disables pacing entirely
    speed: f64,
    listening: Arc<AtomicBool>,
}

impl ReplaySource {
    /// Load a replay file, keeping records for `address` only.
    pub fn from_file(address: impl Into<DeviceAddress>, path: &Path) -> Result<Self> {
        let address = address.into();
        let file = File::open(path).map_err(|e| IngestionError::ReplayIo {
            path: display_path(path),
            message: e.to_string(),
        })?;

        let mut events = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| IngestionError::ReplayIo {
                path: display_path(path),
                message: e.to_string(),
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let record: ReplayRecord =
                serde_json::from_str(&line).map_err(|e| IngestionError::ReplayDecode {
                    path: display_path(path),
                    line: idx + 1,
                    message: e.to_string(),
                })?;
            if record.address != address.as_str() {
                continue;
            }
            events.push(OscEvent {
                address: address.clone(),
                args: record.args,
                time_protocol: record.time_protocol,
            });
        }

        if events.is_empty() {
            warn!(address = %address, path = %display_path(path), "replay file has no matching records");
        }

        Ok(Self {
            address,
            events: Arc::new(events),
            speed: 1.0,
            listening: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Override the playback speed (1.0 = recorded pace, 0.0 = as fast as possible)
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl PacketSource for ReplaySource {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn listen(&self, callback: PacketCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let address = self.address.clone();
        let events = self.events.clone();
        let speed = self.speed;
        let listening = self.listening.clone();

        debug!(address = %address, events = events.len(), "replay source started");

        std::thread::spawn(move || {
            let mut previous: Option<f64> = None;
            for event in events.iter() {
                if !listening.load(Ordering::Relaxed) {
                    break;
                }
                if speed > 0.0 {
                    if let Some(prev) = previous {
                        let gap = (event.time_protocol - prev).max(0.0) / speed;
                        std::thread::sleep(Duration::from_secs_f64(gap));
                    }
                }
                previous = Some(event.time_protocol);
                callback(event.clone());
            }
            listening.store(false, Ordering::SeqCst);
            debug!(address = %address, "replay source exhausted");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
