//! TelemetryRow - Row Engine output
//!
//! The unified row every device payload and log message is flattened into,
//! plus the session-wide column schema.

use serde::{Deserialize, Serialize};

use crate::packet::{DeviceClass, HAND_JOINTS};

/// Number of button columns in the unified row.
pub const BUTTON_SLOTS: usize = 14;

/// Fields per hand-model joint in the unified row (pos x3 + quat x4).
pub const JOINT_FIELDS: usize = 7;

/// Reserved device column value for experimenter log messages.
pub const LOG_MESSAGE_DEVICE: &str = "LogMessage";

/// Missing-value sentinel. NaN rather than zero so an unreported field stays
/// distinguishable from a genuine zero reading.
pub const MISSING: f64 = f64::NAN;

/// Device id recorded when the payload carries none (hands, messages).
pub const NO_DEVICE_ID: i64 = -1;

/// Columns present for every schema, in output order.
const BASE_COLUMNS: [&str; 14] = [
    "device", "message", "deviceid", "time_ovr", "time_sys", "rtime_ovr", "rtime_sys", "posX",
    "posY", "posZ", "rotX", "rotY", "rotZ", "rotW",
];

/// Hand-model joint names in payload order (thumb has one segment less).
const JOINT_NAMES: [(&str, usize); 5] = [
    ("thumb", 4),
    ("index", 5),
    ("middle", 5),
    ("ring", 5),
    ("pinky", 5),
];

/// Rotation encoding of a device's payload.
///
/// Detected once per address on the first payload carrying a rotation
/// segment; invariant for the rest of the session once Quaternion or Euler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationFormat {
    /// 4-component unit quaternion
    Quaternion,
    /// 3-component Euler angles; the rotW column stays at the sentinel
    Euler,
    /// No rotation segment, or a segment of unrecognized length
    Unknown,
}

impl RotationFormat {
    /// Rotation components carried in the payload, if any.
    pub fn components(&self) -> Option<usize> {
        match self {
            RotationFormat::Quaternion => Some(4),
            RotationFormat::Euler => Some(3),
            RotationFormat::Unknown => None,
        }
    }
}

/// Session-wide column schema.
///
/// Derived once from the subscribed address patterns and never changed
/// mid-session. Every emitted row has exactly this column count and order,
/// regardless of which device produced it - that single-schema invariant is
/// the whole point of the unified row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchema {
    /// Button columns present (any controller/tracker address subscribed)
    pub has_buttons: bool,

    /// Hand-model joint count (0 when no hand address is subscribed)
    pub hand_joints: usize,
}

impl RowSchema {
    /// Build the schema from the subscribed OSC address patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut has_buttons = false;
        let mut has_hands = false;
        for pattern in patterns {
            match DeviceClass::of(pattern.as_ref()) {
                DeviceClass::Controller => has_buttons = true,
                DeviceClass::Hand => has_hands = true,
                _ => {}
            }
        }
        Self {
            has_buttons,
            hand_joints: if has_hands { HAND_JOINTS } else { 0 },
        }
    }

    /// Total column count for this schema.
    pub fn column_count(&self) -> usize {
        let mut count = BASE_COLUMNS.len();
        if self.has_buttons {
            count += BUTTON_SLOTS;
        }
        count += self.hand_joints * JOINT_FIELDS;
        count
    }

    /// Header column names in output order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BASE_COLUMNS.iter().map(|s| s.to_string()).collect();

        if self.has_buttons {
            for i in 1..=BUTTON_SLOTS {
                names.push(format!("button{i}"));
            }
        }

        if self.hand_joints > 0 {
            for (finger, segments) in JOINT_NAMES {
                for seg in 0..segments {
                    for suffix in ["posX", "posY", "posZ", "rotX", "rotY", "rotZ", "rotW"] {
                        names.push(format!("{finger}{seg}_{suffix}"));
                    }
                }
            }
        }

        names
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            has_buttons: true,
            hand_joints: HAND_JOINTS,
        }
    }
}

/// The unified output record.
///
/// One of these per device packet and per log message. Fields the source
/// payload did not supply stay at [`MISSING`] / [`NO_DEVICE_ID`]; the writer
/// pads or truncates against the session [`RowSchema`], so the column
/// invariant holds even for rows built under a different assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRow {
    /// Device name (address without the leading `/`), or [`LOG_MESSAGE_DEVICE`]
    pub device: String,

    /// Log message text; empty for device rows
    pub message: String,

    /// Device id from the payload, [`NO_DEVICE_ID`] when absent
    pub device_id: i64,

    /// Absolute protocol timestamp (seconds)
    pub time_ovr: f64,

    /// Absolute local timestamp (seconds)
    pub time_sys: f64,

    /// Protocol time relative to session start
    pub rtime_ovr: f64,

    /// Local time relative to session start
    pub rtime_sys: f64,

    /// Position (x, y, z)
    pub position: [f64; 3],

    /// Rotation (x, y, z, w); w stays at the sentinel for Euler devices
    pub rotation: [f64; 4],

    /// Button states; trailing slots stay at the sentinel when the device
    /// exposes fewer buttons
    pub buttons: [f64; BUTTON_SLOTS],

    /// Hand-model joint fields (pos x3 + rot x4 per joint), empty for
    /// non-hand devices
    pub hand: Vec<f64>,
}

impl TelemetryRow {
    /// Row with every field at its missing sentinel.
    pub fn sentinel() -> Self {
        Self {
            device: String::new(),
            message: String::new(),
            device_id: NO_DEVICE_ID,
            time_ovr: MISSING,
            time_sys: MISSING,
            rtime_ovr: MISSING,
            rtime_sys: MISSING,
            position: [MISSING; 3],
            rotation: [MISSING; 4],
            buttons: [MISSING; BUTTON_SLOTS],
            hand: Vec::new(),
        }
    }

    /// Whether this is an experimenter log-message row.
    pub fn is_message(&self) -> bool {
        self.device == LOG_MESSAGE_DEVICE
    }
}
