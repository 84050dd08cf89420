//! Turns raw packets and free-form messages into finished telemetry rows.

use contracts::{DeviceClass, LocalClock, RawPacket, RowSchema, TelemetryRow, LOG_MESSAGE_DEVICE};
use tracing::instrument;

use crate::clock::{SessionClock, SyncedTimes, TimestampSynchronizer};
use crate::detector::FormatDetector;
use crate::normalize::normalize;

/// Stateful core of the recorder.
///
/// Owns the session clock and the per-address rotation format cache, so
/// every packet from any source flows through one engine instance. All
/// methods take `&self`; the engine is shared behind an `Arc` between the
/// ingestion loop and the message reader.
#[derive(Debug)]
pub struct RecorderEngine {
    schema: RowSchema,
    local_clock: LocalClock,
    detector: FormatDetector,
    clock: TimestampSynchronizer,
}

impl RecorderEngine {
    pub fn new(schema: RowSchema, local_clock: LocalClock) -> Self {
        Self {
            schema,
            local_clock,
            detector: FormatDetector::new(),
            clock: TimestampSynchronizer::new(),
        }
    }

    /// Drop all per-session state so the next packet starts a new session.
    pub fn start_session(&self) {
        self.detector.clear();
        self.clock.reset();
    }

    /// Produce a row for a device packet.
    ///
    /// Never fails: malformed payloads degrade to NaN sentinels in the
    /// affected columns and are counted, so one bad packet cannot stall
    /// the recording.
    #[instrument(level = "trace", skip_all, fields(address = %packet.address))]
    pub fn process_packet(&self, packet: RawPacket) -> TelemetryRow {
        let class = DeviceClass::of(&packet.address);
        let format = self.detector.classify(&packet.address, &packet.payload);
        let times = self.clock.sync(packet.time_protocol, packet.time_local);

        let mut row = normalize(&packet, class, format);
        stamp(&mut row, times);
        row
    }

    /// Produce a marker row for a free-form message.
    ///
    /// Message rows carry only local timestamps; the device-protocol
    /// columns keep their NaN sentinels. The session clock is not started
    /// by a message, so messages logged before the first packet have a
    /// missing relative time as well.
    pub fn log_message(&self, text: &str) -> TelemetryRow {
        let times = self.clock.sync_local(self.local_clock.now());

        let mut row = TelemetryRow::sentinel();
        row.device = LOG_MESSAGE_DEVICE.to_string();
        row.message = text.to_string();
        stamp(&mut row, times);
        row
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    pub fn session_clock(&self) -> Option<SessionClock> {
        self.clock.session_clock()
    }

    pub fn malformed_payloads(&self) -> u64 {
        self.detector.malformed_count()
    }
}

fn stamp(row: &mut TelemetryRow, times: SyncedTimes) {
    row.time_ovr = times.time_ovr;
    row.time_sys = times.time_sys;
    row.rtime_ovr = times.rtime_ovr;
    row.rtime_sys = times.rtime_sys;
}
