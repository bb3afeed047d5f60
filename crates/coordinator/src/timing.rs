//! Disconnect timing: how long the transport has been down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::host::Clock;

/// Outage length (3 hours) at or above which the app is fully reloaded
/// instead of resynchronised.
pub const RELOAD_THRESHOLD_SECS: u64 = 3 * 3600;

/// Whether an outage of `seconds` calls for a full reload.
pub fn exceeds_reload_threshold(seconds: u64) -> bool {
    seconds >= RELOAD_THRESHOLD_SECS
}

/// Records the moment the transport dropped and measures elapsed time.
pub struct DisconnectClock {
    clock: Arc<dyn Clock>,
    disconnected_at: Mutex<Option<DateTime<Utc>>>,
}

impl DisconnectClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            disconnected_at: Mutex::new(None),
        }
    }

    /// Stores the current time as the disconnect moment. Last call wins.
    pub fn record(&self) {
        *self.slot() = Some(self.clock.now());
    }

    /// Forgets the recorded disconnect.
    pub fn reset(&self) {
        *self.slot() = None;
    }

    pub fn disconnected_at(&self) -> Option<DateTime<Utc>> {
        *self.slot()
    }

    /// Whole seconds since the recorded disconnect, or 0 when none is
    /// recorded. Clamped at 0 if the clock went backwards.
    pub fn seconds_since(&self) -> u64 {
        let Some(at) = self.disconnected_at() else {
            return 0;
        };
        let elapsed = (self.clock.now() - at).num_seconds();
        u64::try_from(elapsed).unwrap_or(0)
    }

    fn slot(&self) -> MutexGuard<'_, Option<DateTime<Utc>>> {
        self.disconnected_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DisconnectClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisconnectClock")
            .field("disconnected_at", &self.disconnected_at())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualClock;

    fn timer() -> (Arc<ManualClock>, DisconnectClock) {
        let clock = Arc::new(ManualClock::default());
        let timer = DisconnectClock::new(clock.clone());
        (clock, timer)
    }

    #[test]
    fn zero_when_never_disconnected() {
        let (clock, timer) = timer();
        clock.advance_secs(500);
        assert_eq!(timer.seconds_since(), 0);
        assert!(timer.disconnected_at().is_none());
    }

    #[test]
    fn measures_elapsed_seconds() {
        let (clock, timer) = timer();
        timer.record();
        for d in [0, 1, 59, 3600, 86_400] {
            clock.set_offset_secs(d);
            assert_eq!(timer.seconds_since(), d as u64);
        }
    }

    #[test]
    fn truncates_partial_seconds() {
        let (clock, timer) = timer();
        timer.record();
        clock.advance_millis(2_999);
        assert_eq!(timer.seconds_since(), 2);
    }

    #[test]
    fn clock_skew_never_goes_negative() {
        let (clock, timer) = timer();
        timer.record();
        clock.advance_secs(-120);
        assert_eq!(timer.seconds_since(), 0);
    }

    #[test]
    fn last_disconnect_wins() {
        let (clock, timer) = timer();
        timer.record();
        clock.advance_secs(30);
        timer.record();
        clock.advance_secs(5);
        assert_eq!(timer.seconds_since(), 5);
    }

    #[test]
    fn reload_threshold_boundary() {
        let (clock, timer) = timer();
        timer.record();
        clock.advance_secs(RELOAD_THRESHOLD_SECS as i64 - 1);
        assert!(!exceeds_reload_threshold(timer.seconds_since()));
        clock.advance_secs(1);
        assert!(exceeds_reload_threshold(timer.seconds_since()));
    }

    #[test]
    fn reset_clears() {
        let (clock, timer) = timer();
        timer.record();
        clock.advance_secs(10);
        timer.reset();
        assert_eq!(timer.seconds_since(), 0);
        assert!(timer.disconnected_at().is_none());
    }
}
