//! Report loop body.
//!
//! Each [`ReportLoop::tick`] snapshots the registry into a
//! [`JoystickReport`] and hands it to a [`ReportSink`]. A failed send is
//! logged and dropped; the next cycle sends fresh values anyway.

use crate::error::Error;
use crate::gate::{ConnectionGate, LinkStatus};
use crate::hid::JoystickReport;
use crate::registry::Registry;
use crate::telemetry::Telemetry;

/// Destination for finished reports (the USB HID IN endpoint on target).
#[allow(async_fn_in_trait)]
pub trait ReportSink {
    async fn send_report(&mut self, report: &JoystickReport) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// Gate closed.
    Paused,
    /// Gate open but the endpoint cannot take a report.
    NotReady,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportOutcome {
    Sent,
    Skipped(SkipReason),
    Failed,
}

pub struct ReportLoop<'a> {
    registry: &'a Registry,
    telemetry: &'a Telemetry,
}

impl<'a> ReportLoop<'a> {
    pub fn new(registry: &'a Registry, telemetry: &'a Telemetry) -> Self {
        Self {
            registry,
            telemetry,
        }
    }

    /// Build and send one report if the gate and endpoint allow it.
    pub async fn tick<L: LinkStatus, S: ReportSink>(
        &self,
        gate: &ConnectionGate<L>,
        sink: &mut S,
    ) -> ReportOutcome {
        if !gate.poll().is_active() {
            return ReportOutcome::Skipped(SkipReason::Paused);
        }
        if !gate.link().is_channel_ready() {
            return ReportOutcome::Skipped(SkipReason::NotReady);
        }

        let report = JoystickReport::from_registry(self.registry);
        match sink.send_report(&report).await {
            Ok(()) => {
                self.telemetry.record_report_sent();
                ReportOutcome::Sent
            }
            Err(e) => {
                warn!("Report: send failed: {:?}", e);
                self.telemetry.record_send_failure();
                ReportOutcome::Failed
            }
        }
    }
}
