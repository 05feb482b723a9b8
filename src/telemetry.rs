//! Pipeline counters.
//!
//! Monotonic, wrapping `u32` counters bumped by the loops with `Relaxed`
//! ordering. Readers take a [`TelemetrySnapshot`]; fields of one snapshot
//! are not guaranteed to come from the same cycle.

use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Default)]
pub struct Telemetry {
    reports_sent: AtomicU32,
    send_failures: AtomicU32,
    acquisition_cycles: AtomicU32,
    clamp_warnings: AtomicU32,
    read_errors: AtomicU32,
    button_events: AtomicU32,
}

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    pub reports_sent: u32,
    pub send_failures: u32,
    pub acquisition_cycles: u32,
    pub clamp_warnings: u32,
    pub read_errors: u32,
    pub button_events: u32,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            reports_sent: AtomicU32::new(0),
            send_failures: AtomicU32::new(0),
            acquisition_cycles: AtomicU32::new(0),
            clamp_warnings: AtomicU32::new(0),
            read_errors: AtomicU32::new(0),
            button_events: AtomicU32::new(0),
        }
    }

    /// Successfully delivered reports.
    pub fn reports_sent(&self) -> u32 {
        self.reports_sent.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            reports_sent: self.reports_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            acquisition_cycles: self.acquisition_cycles.load(Ordering::Relaxed),
            clamp_warnings: self.clamp_warnings.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            button_events: self.button_events.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_report_sent(&self) {
        self.reports_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self) {
        self.acquisition_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_clamp(&self) {
        self.clamp_warnings.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_button_event(&self) {
        self.button_events.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let t = Telemetry::new();
        t.record_report_sent();
        t.record_report_sent();
        t.record_send_failure();
        t.record_cycle();
        t.record_clamp();
        t.record_read_error();
        t.record_button_event();

        assert_eq!(t.reports_sent(), 2);
        assert_eq!(
            t.snapshot(),
            TelemetrySnapshot {
                reports_sent: 2,
                send_failures: 1,
                acquisition_cycles: 1,
                clamp_warnings: 1,
                read_errors: 1,
                button_events: 1,
            }
        );
    }
}
