//! # Integration Tests
//!
//! End-to-end coverage of the recorder data flow:
//! - packet to CSV pipeline (engine -> dispatcher -> file)
//! - rotation format stickiness and schema invariance across device mixes
//! - message row interleaving on the session timeline

#[cfg(test)]
mod helpers {
    use contracts::{DeviceAddress, Field, RawPacket};

    pub fn tracked_packet(
        address: &str,
        device_id: i64,
        time_protocol: f64,
        time_local: f64,
        rotation: &[f64],
    ) -> RawPacket {
        let mut payload: Vec<Field> = vec![Field::Int(device_id), Field::Float(time_protocol)];
        payload.extend([0.1, 1.6, -0.2].map(Field::Float));
        payload.extend(rotation.iter().copied().map(Field::Float));
        RawPacket {
            address: DeviceAddress::from(address),
            payload,
            time_protocol,
            time_local,
        }
    }

    pub fn controller_packet(
        time_protocol: f64,
        time_local: f64,
        rotation: &[f64],
        state_fields: usize,
    ) -> RawPacket {
        let mut packet = tracked_packet("/Controller", 3, time_protocol, time_local, rotation);
        packet
            .payload
            .extend((0..state_fields).map(|i| Field::Float(i as f64)));
        packet
    }

    pub fn hand_packet(time_protocol: f64, time_local: f64, rotation: &[f64]) -> RawPacket {
        let components = rotation.len();
        let mut payload: Vec<Field> = vec![Field::Float(time_protocol)];
        payload.extend([0.3, 1.2, -0.4].map(Field::Float));
        payload.extend(rotation.iter().copied().map(Field::Float));
        for joint in 0..contracts::HAND_JOINTS {
            payload.extend([joint as f64, 0.0, 0.0].map(Field::Float));
            payload.extend((0..components).map(|_| Field::Float(0.5)));
        }
        RawPacket {
            address: DeviceAddress::from("/Hand_L"),
            payload,
            time_protocol,
            time_local,
        }
    }
}

#[cfg(test)]
mod schema_tests {
    use contracts::RowSchema;

    #[test]
    fn test_column_count_follows_subscription_mix() {
        let tracked_only = RowSchema::from_patterns(["/HMD"]);
        assert_eq!(tracked_only.column_count(), 14);

        let with_buttons = RowSchema::from_patterns(["/HMD", "/Controller"]);
        assert_eq!(with_buttons.column_count(), 28);

        let full = RowSchema::from_patterns(["/HMD", "/Controller", "/Hand_L"]);
        assert_eq!(full.column_count(), 28 + 24 * 7);
        assert_eq!(full.column_names().len(), full.column_count());
    }
}

#[cfg(test)]
mod row_engine_tests {
    use super::helpers::*;
    use contracts::{LocalClock, RowSchema};
    use dispatcher::RowFormatter;
    use row_engine::RecorderEngine;

    fn full_engine() -> RecorderEngine {
        let schema = RowSchema::from_patterns(["/HMD", "/Controller", "/Hand_L"]);
        RecorderEngine::new(schema, LocalClock::new())
    }

    /// First /HMD packet with rotation [0,0,0,1] detects Quaternion and
    /// renders rotW as 1.0000000000 at the default precision.
    #[test]
    fn test_quaternion_hmd_renders_unit_rotw() {
        let engine = full_engine();
        let row = engine.process_packet(tracked_packet("/HMD", 0, 100.0, 1.0, &[0.0, 0.0, 0.0, 1.0]));

        let formatter = RowFormatter::new(*engine.schema(), 10, ",");
        let line = formatter.format_row(&row);
        let fields: Vec<&str> = line.split(',').collect();

        assert_eq!(fields[0], "HMD");
        // rotW is the last of the four rotation columns
        assert_eq!(fields[13], "1.0000000000");
        // first row of the session is the relative-time origin
        assert_eq!(fields[5], "0.0000000000");
        assert_eq!(fields[6], "0.0000000000");
    }

    /// A 3-component /Hand_L rotation detects Euler; rotW and every
    /// per-joint rotW slot stay at the missing sentinel.
    #[test]
    fn test_euler_hand_leaves_rotw_missing() {
        let engine = full_engine();
        let row = engine.process_packet(hand_packet(50.0, 1.0, &[10.0, 0.0, 90.0]));

        assert!(row.rotation[3].is_nan());
        assert_eq!(row.device, "Hand_L");
        assert_eq!(row.device_id, -1);

        // Hand vec holds 24 joints x 7 slots; the rotW slot of each joint
        // is index 6 within its stride.
        assert_eq!(row.hand.len(), 24 * 7);
        for joint in 0..24 {
            assert_eq!(row.hand[joint * 7], joint as f64);
            assert!(row.hand[joint * 7 + 6].is_nan());
        }
    }

    /// A controller payload short of button slots pads the remaining
    /// button columns with the missing sentinel and raises no error.
    #[test]
    fn test_short_controller_payload_pads_buttons() {
        let engine = full_engine();
        // Establish the quaternion layout with a complete payload first
        engine.process_packet(controller_packet(10.0, 1.0, &[0.0, 0.0, 0.0, 1.0], 24));

        let row = engine.process_packet(controller_packet(10.1, 1.1, &[0.0, 0.0, 0.0, 1.0], 10));
        for slot in 0..10 {
            assert_eq!(row.buttons[slot], slot as f64);
        }
        for slot in 10..14 {
            assert!(row.buttons[slot].is_nan());
        }
    }

    /// The detected format is sticky per address even when a later payload
    /// length implies the other representation.
    #[test]
    fn test_format_first_observation_wins() {
        let engine = full_engine();
        let first = engine.process_packet(tracked_packet("/HMD", 0, 1.0, 0.1, &[0.0, 0.0, 0.0, 1.0]));
        assert_eq!(first.rotation[3], 1.0);

        let second = engine.process_packet(tracked_packet("/HMD", 0, 1.1, 0.2, &[10.0, 20.0, 30.0]));
        // Still read as quaternion: three components present, rotW absent
        assert_eq!(second.rotation[0], 10.0);
        assert!(second.rotation[3].is_nan());
        assert_eq!(engine.malformed_payloads(), 1);
    }

    /// Rows from every device class and from messages format to the same
    /// column count.
    #[test]
    fn test_all_rows_share_one_column_count() {
        let engine = full_engine();
        let formatter = RowFormatter::new(*engine.schema(), 10, ",");
        let expected = engine.schema().column_count();

        let rows = vec![
            engine.process_packet(tracked_packet("/HMD", 0, 1.0, 0.1, &[0.0, 0.0, 0.0, 1.0])),
            engine.process_packet(controller_packet(1.1, 0.2, &[0.0, 0.0, 0.0, 1.0], 24)),
            engine.process_packet(hand_packet(1.2, 0.3, &[0.0, 0.0, 0.0, 1.0])),
            engine.log_message("condition_A_start"),
        ];
        for row in rows {
            let line = formatter.format_row(&row);
            assert_eq!(line.split(',').count(), expected);
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use contracts::{LocalClock, RowSchema, SinkConfig, SinkType};
    use dispatcher::{create_dispatcher, DispatcherConfig};
    use row_engine::RecorderEngine;
    use tokio::sync::mpsc;

    use super::helpers::*;

    fn csv_sink_config(path: &std::path::Path) -> SinkConfig {
        let mut params = HashMap::new();
        params.insert("path".to_string(), path.display().to_string());
        SinkConfig {
            name: "test_csv".to_string(),
            sink_type: SinkType::Csv,
            queue_capacity: 50,
            params,
        }
    }

    /// End-to-end: packets and a message through the engine and dispatcher
    /// land in the CSV file in send order, one header plus one line each.
    #[tokio::test]
    async fn test_e2e_csv_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.csv");

        let schema = RowSchema::from_patterns(["/HMD", "/Controller"]);
        let engine = Arc::new(RecorderEngine::new(schema, LocalClock::new()));

        let (row_tx, row_rx) = mpsc::channel(100);
        let dispatcher = create_dispatcher(
            DispatcherConfig {
                sinks: vec![csv_sink_config(&path)],
                schema,
                precision: 10,
                separator: ",".to_string(),
            },
            row_rx,
        )
        .unwrap();
        let handle = dispatcher.spawn();

        let rows = vec![
            engine.process_packet(tracked_packet("/HMD", 0, 100.0, 1.0, &[0.0, 0.0, 0.0, 1.0])),
            engine.log_message("condition_A_start"),
            engine.process_packet(tracked_packet("/HMD", 0, 100.1, 1.1, &[0.0, 0.0, 0.0, 1.0])),
            engine.process_packet(controller_packet(100.2, 1.2, &[0.0, 0.0, 0.0, 1.0], 24)),
        ];
        for row in rows {
            row_tx.send(row).await.unwrap();
        }
        drop(row_tx);
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("dispatcher timed out")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("device,message,deviceid,"));

        // Message row sits between the two HMD rows it was logged between
        assert!(lines[1].starts_with("HMD,,"));
        assert!(lines[2].starts_with("LogMessage,\"condition_A_start\",-1,"));
        assert!(lines[3].starts_with("HMD,,"));
        assert!(lines[4].starts_with("Controller,,3,"));

        // Column invariance holds for every line, message row included
        let expected = lines[0].split(',').count();
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), expected);
        }

        // Message row keeps protocol columns at the sentinel
        let message_fields: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(message_fields[3], "NaN");
        assert_eq!(message_fields[5], "NaN");
    }

    /// Fan-out: the same rows reach a CSV sink and a log sink.
    #[tokio::test]
    async fn test_dispatcher_multiple_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fanout.csv");

        let schema = RowSchema::from_patterns(["/HMD"]);
        let engine = RecorderEngine::new(schema, LocalClock::new());

        let (row_tx, row_rx) = mpsc::channel(10);
        let dispatcher = create_dispatcher(
            DispatcherConfig {
                sinks: vec![
                    csv_sink_config(&path),
                    SinkConfig {
                        name: "echo".to_string(),
                        sink_type: SinkType::Log,
                        queue_capacity: 10,
                        params: HashMap::new(),
                    },
                ],
                schema,
                precision: 10,
                separator: ",".to_string(),
            },
            row_rx,
        )
        .unwrap();
        assert_eq!(dispatcher.metrics().len(), 2);
        let handle = dispatcher.spawn();

        for i in 0..5 {
            let t = 100.0 + i as f64 * 0.1;
            let row = engine.process_packet(tracked_packet("/HMD", 0, t, t - 99.0, &[0.0, 0.0, 0.0, 1.0]));
            row_tx.send(row).await.unwrap();
        }
        drop(row_tx);
        tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("dispatcher timed out")
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 6);
    }

    /// Mock sources through the ingestion pipeline produce classifiable
    /// packets for every registered address.
    #[tokio::test]
    async fn test_mock_ingestion_feeds_engine() {
        use ingestion::{IngestionPipeline, MockDeviceSource, MockSourceConfig};

        let clock = LocalClock::new();
        let mut pipeline = IngestionPipeline::new(100, clock);
        let config = MockSourceConfig {
            frequency_hz: 200.0,
            ..Default::default()
        };
        pipeline.register_source(
            Box::new(MockDeviceSource::new("/HMD", config.clone())),
            None,
        );
        pipeline.register_source(Box::new(MockDeviceSource::new("/Hand_L", config)), None);

        let schema = RowSchema::from_patterns(["/HMD", "/Hand_L"]);
        let engine = RecorderEngine::new(schema, clock);

        pipeline.start_all();
        let rx = pipeline.take_receiver().unwrap();

        let mut hmd_rows = 0u32;
        let mut hand_rows = 0u32;
        let deadline = std::time::Duration::from_secs(3);
        while hmd_rows == 0 || hand_rows == 0 {
            let packet = tokio::time::timeout(deadline, rx.recv())
                .await
                .expect("no packet within deadline")
                .expect("ingestion channel closed");
            let row = engine.process_packet(packet);
            match row.device.as_str() {
                "HMD" => hmd_rows += 1,
                "Hand_L" => hand_rows += 1,
                other => panic!("unexpected device {other}"),
            }
        }
        pipeline.stop_all();

        assert_eq!(engine.malformed_payloads(), 0);
    }
}
