//! Payload-to-row projection for every device class.

use contracts::{
    DeviceClass, Field, RawPacket, RotationFormat, TelemetryRow, HAND_JOINTS, JOINT_FIELDS, MISSING,
};

/// Project a raw payload onto the unified row shape.
///
/// Timestamps are left at their sentinel values; the engine stamps them
/// after clock synchronization. Fields the payload does not carry (or
/// carries with a non-numeric value) stay at the NaN sentinel, and excess
/// trailing values are dropped, so a short or long payload still yields a
/// full-width row.
pub fn normalize(packet: &RawPacket, class: DeviceClass, format: RotationFormat) -> TelemetryRow {
    let mut row = TelemetryRow::sentinel();
    row.device = packet.address.device_name().to_string();

    if class == DeviceClass::Unknown {
        return row;
    }

    let payload = &packet.payload;
    if class.has_device_id() {
        if let Some(id) = payload.first().and_then(Field::as_i64) {
            row.device_id = id;
        }
    }

    let pos = class.position_index();
    for (axis, slot) in row.position.iter_mut().enumerate() {
        *slot = num_at(payload, pos + axis);
    }

    let Some(components) = format.components() else {
        return row;
    };
    let rot = class.rotation_index();
    for axis in 0..components {
        row.rotation[axis] = num_at(payload, rot + axis);
    }

    match class {
        DeviceClass::Controller => {
            // Trailing state block; only the button slots are kept.
            let state = rot + components;
            for (slot, value) in row.buttons.iter_mut().enumerate() {
                *value = num_at(payload, state + slot);
            }
        }
        DeviceClass::Hand => {
            row.hand = vec![MISSING; HAND_JOINTS * JOINT_FIELDS];
            let stride = 3 + components;
            let base = rot + components;
            for joint in 0..HAND_JOINTS {
                let src = base + joint * stride;
                let dst = joint * JOINT_FIELDS;
                for axis in 0..3 {
                    row.hand[dst + axis] = num_at(payload, src + axis);
                }
                for axis in 0..components {
                    row.hand[dst + 3 + axis] = num_at(payload, src + 3 + axis);
                }
            }
        }
        DeviceClass::Tracked | DeviceClass::Unknown => {}
    }

    row
}

fn num_at(payload: &[Field], index: usize) -> f64 {
    payload.get(index).and_then(Field::as_f64).unwrap_or(MISSING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DeviceAddress;

    fn packet(address: &str, payload: Vec<Field>) -> RawPacket {
        RawPacket {
            address: DeviceAddress::from(address),
            payload,
            time_protocol: 100.0,
            time_local: 1.0,
        }
    }

    fn floats(values: &[f64]) -> Vec<Field> {
        values.iter().copied().map(Field::Float).collect()
    }

    #[test]
    fn test_tracked_quaternion() {
        let mut payload = vec![Field::Int(0), Field::Float(100.0)];
        payload.extend(floats(&[0.1, 1.6, -0.2, 0.0, 0.0, 0.0, 1.0]));
        let row = normalize(
            &packet("/HMD", payload),
            DeviceClass::Tracked,
            RotationFormat::Quaternion,
        );

        assert_eq!(row.device, "HMD");
        assert_eq!(row.device_id, 0);
        assert_eq!(row.position, [0.1, 1.6, -0.2]);
        assert_eq!(row.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert!(row.buttons.iter().all(|b| b.is_nan()));
        assert!(row.hand.is_empty());
    }

    #[test]
    fn test_tracked_euler_leaves_rot_w_missing() {
        let mut payload = vec![Field::Int(2), Field::Float(100.0)];
        payload.extend(floats(&[0.0, 0.0, 0.0, 10.0, 20.0, 30.0]));
        let row = normalize(
            &packet("/TrackingReference", payload),
            DeviceClass::Tracked,
            RotationFormat::Euler,
        );

        assert_eq!(row.rotation[0], 10.0);
        assert_eq!(row.rotation[2], 30.0);
        assert!(row.rotation[3].is_nan());
    }

    #[test]
    fn test_controller_buttons_from_state_block() {
        let mut payload = vec![Field::Int(1), Field::Float(100.0)];
        payload.extend(floats(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        payload.extend((0..24).map(|i| Field::Float(i as f64)));
        let row = normalize(
            &packet("/Controller", payload),
            DeviceClass::Controller,
            RotationFormat::Quaternion,
        );

        assert_eq!(row.buttons[0], 0.0);
        assert_eq!(row.buttons[13], 13.0);
        // State fields beyond the button slots are not carried
        assert!(row.hand.is_empty());
    }

    #[test]
    fn test_short_controller_payload_pads_with_missing() {
        let mut payload = vec![Field::Int(1), Field::Float(100.0)];
        payload.extend(floats(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]));
        // Only ten of the 24 state fields present
        payload.extend((0..10).map(|i| Field::Float(i as f64)));
        let row = normalize(
            &packet("/Controller", payload),
            DeviceClass::Controller,
            RotationFormat::Quaternion,
        );

        assert_eq!(row.buttons[9], 9.0);
        assert!(row.buttons[10].is_nan());
        assert!(row.buttons[13].is_nan());
    }

    #[test]
    fn test_hand_joints_quaternion() {
        let mut payload = vec![Field::Float(100.0)];
        payload.extend(floats(&[0.5, 1.0, 0.5, 0.0, 0.0, 0.0, 1.0]));
        for joint in 0..HAND_JOINTS {
            let j = joint as f64;
            payload.extend(floats(&[j, j + 0.1, j + 0.2, 0.0, 0.0, 0.0, 1.0]));
        }
        let row = normalize(
            &packet("/Hand_L", payload),
            DeviceClass::Hand,
            RotationFormat::Quaternion,
        );

        assert_eq!(row.device, "Hand_L");
        assert_eq!(row.device_id, -1);
        assert_eq!(row.hand.len(), HAND_JOINTS * JOINT_FIELDS);
        assert_eq!(row.hand[0], 0.0);
        assert_eq!(row.hand[6], 1.0);
        let last = (HAND_JOINTS - 1) * JOINT_FIELDS;
        assert_eq!(row.hand[last], 23.0);
        assert_eq!(row.hand[last + 6], 1.0);
    }

    #[test]
    fn test_hand_joints_euler_skip_rot_w() {
        let mut payload = vec![Field::Float(100.0)];
        payload.extend(floats(&[0.5, 1.0, 0.5, 10.0, 20.0, 30.0]));
        for _ in 0..HAND_JOINTS {
            payload.extend(floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        }
        let row = normalize(
            &packet("/Hand_R", payload),
            DeviceClass::Hand,
            RotationFormat::Euler,
        );

        assert!(row.rotation[3].is_nan());
        assert_eq!(row.hand[3], 4.0);
        assert_eq!(row.hand[5], 6.0);
        assert!(row.hand[6].is_nan());
    }

    #[test]
    fn test_unknown_format_keeps_rotation_missing() {
        let mut payload = vec![Field::Int(0), Field::Float(100.0)];
        payload.extend(floats(&[0.1, 1.6, -0.2, 0.5, 0.5]));
        let row = normalize(
            &packet("/HMD", payload),
            DeviceClass::Tracked,
            RotationFormat::Unknown,
        );

        assert_eq!(row.position, [0.1, 1.6, -0.2]);
        assert!(row.rotation.iter().all(|r| r.is_nan()));
    }
}
