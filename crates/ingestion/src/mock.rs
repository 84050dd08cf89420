//! Mock packet source
//!
//! Emits synthetic payloads shaped like the real device streams, so the
//! whole pipeline runs without a transport binding or a capture rig.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{
    DeviceAddress, DeviceClass, Field, OscEvent, PacketCallback, PacketSource,
    CONTROLLER_STATE_FIELDS, HAND_JOINTS,
};
use tracing::debug;

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Emission rate
    pub frequency_hz: f64,

    /// Emit Euler rotations instead of quaternions
    pub euler: bool,

    /// Protocol clock value of the first packet
    pub protocol_epoch: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 90.0,
            euler: false,
            protocol_epoch: 1000.0,
        }
    }
}

/// Mock packet source for one address pattern
///
/// A background thread emits payloads at the configured frequency until
/// `stop` is called. The protocol timestamp advances with real elapsed
/// time from a configurable epoch.
pub struct MockDeviceSource {
    address: DeviceAddress,
    config: MockSourceConfig,
    listening: Arc<AtomicBool>,
}

impl MockDeviceSource {
    pub fn new(address: impl Into<DeviceAddress>, config: MockSourceConfig) -> Self {
        Self {
            address: address.into(),
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mock source with default configuration
    pub fn with_defaults(address: impl Into<DeviceAddress>) -> Self {
        Self::new(address, MockSourceConfig::default())
    }

    /// Build one synthetic payload for the address class.
    fn payload(address: &DeviceAddress, config: &MockSourceConfig, tick: u64, t: f64) -> Vec<Field> {
        let phase = tick as f64 * 0.01;
        let position = [phase.sin() * 0.5, 1.6 + phase.cos() * 0.05, phase.sin() * 0.3];
        let rotation: Vec<f64> = if config.euler {
            vec![phase.sin() * 10.0, phase.cos() * 180.0, 0.0]
        } else {
            // Unit quaternion rotating about Y
            let half = phase / 2.0;
            vec![0.0, half.sin(), 0.0, half.cos()]
        };

        let class = DeviceClass::of(address);
        let mut payload: Vec<Field> = Vec::new();
        if class.has_device_id() {
            payload.push(Field::Int(0));
        }
        payload.push(Field::Float(t));
        payload.extend(position.map(Field::Float));
        payload.extend(rotation.iter().copied().map(Field::Float));

        match class {
            DeviceClass::Controller => {
                for slot in 0..CONTROLLER_STATE_FIELDS {
                    let pressed = slot as u64 % 7 == tick % 7;
                    payload.push(Field::Float(if pressed { 1.0 } else { 0.0 }));
                }
            }
            DeviceClass::Hand => {
                for joint in 0..HAND_JOINTS {
                    let offset = joint as f64 * 0.01;
                    payload.extend(
                        [position[0] + offset, position[1] - offset, position[2]]
                            .map(Field::Float),
                    );
                    payload.extend(rotation.iter().copied().map(Field::Float));
                }
            }
            DeviceClass::Tracked | DeviceClass::Unknown => {}
        }

        payload
    }
}

impl PacketSource for MockDeviceSource {
    fn address(&self) -> &DeviceAddress {
        &self.address
    }

    fn listen(&self, callback: PacketCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let address = self.address.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();
        let interval = Duration::from_secs_f64(1.0 / self.config.frequency_hz);

        debug!(address = %address, frequency_hz = config.frequency_hz, "mock source started");

        std::thread::spawn(move || {
            let started = Instant::now();
            let mut tick = 0u64;
            while listening.load(Ordering::Relaxed) {
                let t = config.protocol_epoch + started.elapsed().as_secs_f64();
                let event = OscEvent {
                    address: address.clone(),
                    args: MockDeviceSource::payload(&address, &config, tick, t),
                    time_protocol: t,
                };
                callback(event);
                tick += 1;
                std::thread::sleep(interval);
            }
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shapes_match_device_classes() {
        let config = MockSourceConfig::default();
        let hmd = MockDeviceSource::payload(&"/HMD".into(), &config, 0, 1000.0);
        assert_eq!(hmd.len(), 9);

        let controller = MockDeviceSource::payload(&"/Controller".into(), &config, 0, 1000.0);
        assert_eq!(controller.len(), 33);

        let hand = MockDeviceSource::payload(&"/Hand_L".into(), &config, 0, 1000.0);
        assert_eq!(hand.len(), 176);
    }

    #[test]
    fn test_euler_payload_shapes() {
        let config = MockSourceConfig {
            euler: true,
            ..Default::default()
        };
        assert_eq!(
            MockDeviceSource::payload(&"/HMD".into(), &config, 0, 1000.0).len(),
            8
        );
        assert_eq!(
            MockDeviceSource::payload(&"/Controller".into(), &config, 0, 1000.0).len(),
            32
        );
        assert_eq!(
            MockDeviceSource::payload(&"/Hand_R".into(), &config, 0, 1000.0).len(),
            151
        );
    }

    #[test]
    fn test_quaternion_is_unit_norm() {
        let config = MockSourceConfig::default();
        let payload = MockDeviceSource::payload(&"/HMD".into(), &config, 17, 1000.0);
        let norm_sq: f64 = payload[5..9]
            .iter()
            .map(|f| f.as_f64().unwrap().powi(2))
            .sum();
        assert!((norm_sq.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_delivers_packets() {
        use std::sync::atomic::AtomicU64;

        let source = MockDeviceSource::new(
            "/HMD",
            MockSourceConfig {
                frequency_hz: 500.0,
                ..Default::default()
            },
        );
        let count = Arc::new(AtomicU64::new(0));
        let seen = count.clone();
        source.listen(Arc::new(move |event| {
            assert_eq!(event.address.as_str(), "/HMD");
            seen.fetch_add(1, Ordering::Relaxed);
        }));

        std::thread::sleep(Duration::from_millis(50));
        source.stop();
        assert!(count.load(Ordering::Relaxed) > 0);
    }
}
