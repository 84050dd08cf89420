//! RawPacket - Ingestion output
//!
//! Raw OSC packet structures and the per-device-class payload layouts.

use serde::{Deserialize, Serialize};

use crate::DeviceAddress;

/// Number of button/axis state fields a controller-class payload carries.
/// Only the first [`crate::BUTTON_SLOTS`] of these survive into the unified row.
pub const CONTROLLER_STATE_FIELDS: usize = 24;

/// Number of hand-model joints per hand (thumb 0-3, four fingers 0-4).
pub const HAND_JOINTS: usize = 24;

/// One OSC payload field.
///
/// The Brekel stream is almost entirely floats, but device ids arrive as
/// integers and future addresses may carry strings, so the ordered payload
/// is kept loosely typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    /// Integer field (device ids)
    Int(i64),

    /// Float field (timestamps, transforms, button states)
    Float(f64),

    /// String field (unused by known devices, kept for forward compat)
    Str(String),
}

impl Field {
    /// Numeric view of the field; integers widen to f64.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Field::Int(v) => Some(*v as f64),
            Field::Float(v) => Some(*v),
            Field::Str(_) => None,
        }
    }

    /// Integer view of the field. Floats do not truncate.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Field::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Float(v)
    }
}

impl From<i64> for Field {
    fn from(v: i64) -> Self {
        Field::Int(v)
    }
}

/// One callback invocation from the transport substrate.
///
/// The substrate supplies the address, the ordered payload and the protocol
/// (OpenVR) timestamp. The local wall-clock timestamp is NOT part of this
/// struct: it is captured by the ingestion adapter at callback time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscEvent {
    /// Originating OSC address
    pub address: DeviceAddress,

    /// Ordered payload fields as delivered on the wire
    pub args: Vec<Field>,

    /// Protocol clock timestamp (seconds, f64)
    pub time_protocol: f64,
}

/// One received unit, consumed immediately and never stored beyond one row.
#[derive(Debug, Clone)]
pub struct RawPacket {
    /// Originating OSC address
    pub address: DeviceAddress,

    /// Ordered payload fields
    pub payload: Vec<Field>,

    /// Protocol clock timestamp (seconds)
    pub time_protocol: f64,

    /// Local wall clock captured at callback time (seconds)
    pub time_local: f64,
}

impl RawPacket {
    /// Stamp an [`OscEvent`] with the local receive time.
    pub fn from_event(event: OscEvent, time_local: f64) -> Self {
        Self {
            address: event.address,
            payload: event.args,
            time_protocol: event.time_protocol,
            time_local,
        }
    }
}

/// Device class, derived from the OSC address.
///
/// The class determines the positional payload layout:
///
/// | class      | layout                                            | Euler / Quat len |
/// |------------|---------------------------------------------------|------------------|
/// | Tracked    | `id, t, pos x3, rot`                              | 8 / 9            |
/// | Controller | `id, t, pos x3, rot, 24 button/axis`              | 32 / 33          |
/// | Hand       | `t, pos x3, rot, 24 joints x (pos x3 + rot)`      | 151 / 176        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Plain tracked transform: HMD, tracking reference, display redirect
    Tracked,
    /// Transform plus button/axis state: controllers and generic trackers
    Controller,
    /// Hand-model root plus finger joints; carries no device id
    Hand,
    /// Address not recognized; payload cannot be mapped positionally
    Unknown,
}

impl DeviceClass {
    /// Classify an OSC address.
    pub fn of(address: &str) -> Self {
        match address {
            "/HMD" | "/TrackingReference" | "/DisplayRedirect" => DeviceClass::Tracked,
            "/Controller" | "/GenericTracker" => DeviceClass::Controller,
            "/Hand_L" | "/Hand_R" => DeviceClass::Hand,
            _ => DeviceClass::Unknown,
        }
    }

    /// Whether payloads of this class carry a device id field.
    pub fn has_device_id(&self) -> bool {
        matches!(self, DeviceClass::Tracked | DeviceClass::Controller)
    }

    /// Index of the first position component in the payload.
    pub fn position_index(&self) -> usize {
        match self {
            // id, t precede the transform
            DeviceClass::Tracked | DeviceClass::Controller => 2,
            // hands carry only t before the transform
            DeviceClass::Hand => 1,
            DeviceClass::Unknown => 0,
        }
    }

    /// Index of the first rotation component in the payload.
    pub fn rotation_index(&self) -> usize {
        self.position_index() + 3
    }

    /// Infer the per-rotation component count (3 = Euler, 4 = Quaternion)
    /// from the total payload length. Returns `None` when the length matches
    /// neither documented layout.
    pub fn rotation_components(&self, payload_len: usize) -> Option<usize> {
        let inferred = match self {
            DeviceClass::Tracked => payload_len.checked_sub(5)?,
            DeviceClass::Controller => payload_len.checked_sub(5 + CONTROLLER_STATE_FIELDS)?,
            DeviceClass::Hand => {
                // len = 1 + 3 + r + HAND_JOINTS * (3 + r)
                let excess = payload_len.checked_sub(4 + HAND_JOINTS * 3)?;
                if excess % (HAND_JOINTS + 1) != 0 {
                    return None;
                }
                excess / (HAND_JOINTS + 1)
            }
            DeviceClass::Unknown => return None,
        };
        matches!(inferred, 3 | 4).then_some(inferred)
    }
}
