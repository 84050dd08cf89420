//! Timestamp synchronization against the session-start reference.

use std::sync::Mutex;

use contracts::MISSING;

/// Session-start reference timestamps, captured from the first packet.
///
/// Initialized exactly once per session, read-only thereafter. Never reset
/// except by starting a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionClock {
    /// Protocol clock value of the first packet
    pub t0_protocol: f64,

    /// Local clock value of the first packet
    pub t0_local: f64,
}

/// Absolute and relative timestamps for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncedTimes {
    pub time_ovr: f64,
    pub time_sys: f64,
    pub rtime_ovr: f64,
    pub rtime_sys: f64,
}

/// Converts absolute packet timestamps into relative-to-start timestamps.
///
/// Packet delivery and message logging may race on the very first
/// observation, so the one-time [`SessionClock`] initialization happens
/// under a mutex: exactly one writer wins, every other caller observes the
/// already-initialized value.
///
/// No reordering is performed - out-of-order delivery from the transport is
/// reflected as-is in the relative timestamps. No rounding either; fixed
/// decimal precision is the row writer's job.
#[derive(Debug, Default)]
pub struct TimestampSynchronizer {
    t0: Mutex<Option<SessionClock>>,
}

impl TimestampSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronize a device packet's timestamps.
    ///
    /// The first invocation of a session stores the reference clocks and
    /// returns relative times of exactly 0.0.
    pub fn sync(&self, time_protocol: f64, time_local: f64) -> SyncedTimes {
        let mut guard = self.t0.lock().expect("session clock poisoned");
        let t0 = guard.get_or_insert(SessionClock {
            t0_protocol: time_protocol,
            t0_local: time_local,
        });

        SyncedTimes {
            time_ovr: time_protocol,
            time_sys: time_local,
            rtime_ovr: time_protocol - t0.t0_protocol,
            rtime_sys: time_local - t0.t0_local,
        }
    }

    /// Synchronize a local-clock-only event (log messages).
    ///
    /// The caller has no protocol clock, so the protocol columns stay at the
    /// missing sentinel. Before the first packet of the session the relative
    /// local time is also unknown and reported as missing; this does NOT
    /// initialize the session clock.
    pub fn sync_local(&self, time_local: f64) -> SyncedTimes {
        let guard = self.t0.lock().expect("session clock poisoned");
        let rtime_sys = match *guard {
            Some(t0) => time_local - t0.t0_local,
            None => MISSING,
        };

        SyncedTimes {
            time_ovr: MISSING,
            time_sys: time_local,
            rtime_ovr: MISSING,
            rtime_sys,
        }
    }

    /// Reference clocks, if the first packet has been seen.
    pub fn session_clock(&self) -> Option<SessionClock> {
        *self.t0.lock().expect("session clock poisoned")
    }

    /// Forget the reference clocks (new session).
    pub fn reset(&self) {
        *self.t0.lock().expect("session clock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sync_is_zero_relative() {
        let sync = TimestampSynchronizer::new();
        let t = sync.sync(100.5, 3.25);
        assert_eq!(t.rtime_ovr, 0.0);
        assert_eq!(t.rtime_sys, 0.0);
        assert_eq!(t.time_ovr, 100.5);
        assert_eq!(t.time_sys, 3.25);
    }

    #[test]
    fn test_subsequent_sync_is_relative() {
        let sync = TimestampSynchronizer::new();
        sync.sync(100.0, 3.0);
        let t = sync.sync(101.5, 4.75);
        assert!((t.rtime_ovr - 1.5).abs() < 1e-12);
        assert!((t.rtime_sys - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_local_only_before_first_packet() {
        let sync = TimestampSynchronizer::new();
        let t = sync.sync_local(2.0);
        assert!(t.time_ovr.is_nan());
        assert!(t.rtime_ovr.is_nan());
        assert!(t.rtime_sys.is_nan());
        assert_eq!(t.time_sys, 2.0);
        // Must not have initialized the session clock
        assert!(sync.session_clock().is_none());
    }

    #[test]
    fn test_local_only_after_first_packet() {
        let sync = TimestampSynchronizer::new();
        sync.sync(100.0, 3.0);
        let t = sync.sync_local(5.5);
        assert!(t.time_ovr.is_nan());
        assert!(t.rtime_ovr.is_nan());
        assert!((t.rtime_sys - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_forgets_reference() {
        let sync = TimestampSynchronizer::new();
        sync.sync(100.0, 3.0);
        sync.reset();
        assert!(sync.session_clock().is_none());
        let t = sync.sync(200.0, 50.0);
        assert_eq!(t.rtime_ovr, 0.0);
    }

    #[test]
    fn test_first_write_race_single_winner() {
        use std::sync::Arc;

        let sync = Arc::new(TimestampSynchronizer::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let sync = Arc::clone(&sync);
            handles.push(std::thread::spawn(move || {
                sync.sync(100.0 + i as f64, 1.0 + i as f64)
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Whichever thread won, all later syncs see a single consistent t0
        let t0 = sync.session_clock().unwrap();
        let t = sync.sync(t0.t0_protocol, t0.t0_local);
        assert_eq!(t.rtime_ovr, 0.0);
        assert_eq!(t.rtime_sys, 0.0);
    }
}
