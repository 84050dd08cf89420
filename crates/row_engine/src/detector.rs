//! Rotation format detection, address-keyed and first-seen-wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use contracts::{DeviceAddress, DeviceClass, Field, RotationFormat};
use tracing::{debug, warn};

/// Tolerated deviation of a quaternion's norm from 1.0 on the first sample.
const QUAT_NORM_TOLERANCE: f64 = 0.05;

/// Detects whether a device streams quaternion or Euler rotations.
///
/// The first payload seen for an address is authoritative: once an address
/// is classified Quaternion or Euler it stays that way for the whole
/// session, even if a later payload for the same address has a different
/// field count. That trades a small risk of misclassification from a noisy
/// first sample for per-session column-semantics consistency. Later
/// mismatches are counted as malformed payloads, not re-detected.
///
/// The cache insert happens under one lock, so concurrent first packets for
/// the same address resolve to a single winner.
#[derive(Debug, Default)]
pub struct FormatDetector {
    cache: Mutex<HashMap<DeviceAddress, RotationFormat>>,
    malformed: AtomicU64,
}

impl FormatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the rotation format of a payload.
    ///
    /// Addresses with no rotation segment (unknown device classes) yield
    /// [`RotationFormat::Unknown`] without caching, as do payloads whose
    /// rotation segment length is neither 3 nor 4.
    pub fn classify(&self, address: &DeviceAddress, payload: &[Field]) -> RotationFormat {
        let class = DeviceClass::of(address);
        if class == DeviceClass::Unknown {
            return RotationFormat::Unknown;
        }

        let mut cache = self.cache.lock().expect("format cache poisoned");
        if let Some(&format) = cache.get(address.as_str()) {
            // Cached classification wins; only flag length drift.
            if class.rotation_components(payload.len()) != format.components() {
                self.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    address = %address,
                    payload_len = payload.len(),
                    ?format,
                    "payload length no longer matches detected rotation format"
                );
            }
            return format;
        }

        match Self::inspect(address, class, payload) {
            Some(format) => {
                debug!(address = %address, ?format, "rotation format detected");
                cache.insert(address.clone(), format);
                format
            }
            None => {
                self.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    address = %address,
                    payload_len = payload.len(),
                    "rotation segment length is neither 3 nor 4"
                );
                RotationFormat::Unknown
            }
        }
    }

    /// Inspect a first payload's rotation segment.
    fn inspect(
        address: &DeviceAddress,
        class: DeviceClass,
        payload: &[Field],
    ) -> Option<RotationFormat> {
        let components = class.rotation_components(payload.len())?;
        if components == 3 {
            return Some(RotationFormat::Euler);
        }

        // The layout already pins 4 components to a quaternion; the norm
        // check only flags a suspicious first sample.
        let offset = class.rotation_index();
        let norm_sq: f64 = payload[offset..offset + 4]
            .iter()
            .map(|f| f.as_f64().unwrap_or(0.0).powi(2))
            .sum();
        let norm = norm_sq.sqrt();
        if (norm - 1.0).abs() > QUAT_NORM_TOLERANCE {
            warn!(
                address = %address,
                norm,
                "first quaternion sample is not unit norm"
            );
        }

        Some(RotationFormat::Quaternion)
    }

    /// Cached classification for an address, if any.
    pub fn cached(&self, address: &str) -> Option<RotationFormat> {
        self.cache
            .lock()
            .expect("format cache poisoned")
            .get(address)
            .copied()
    }

    /// Payloads whose length matched no documented layout.
    pub fn malformed_count(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Forget all classifications (new session).
    pub fn clear(&self) {
        self.cache.lock().expect("format cache poisoned").clear();
        self.malformed.store(0, Ordering::Relaxed);
    }
}
