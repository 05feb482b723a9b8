//! Acquisition loop body.
//!
//! One [`Acquisition::tick`] is one cycle: every registered axis is read,
//! calibrated, inverted and filtered, then every button is sampled. The
//! results land in the registry's atomics; nothing on this path blocks.
//!
//! The filters live here rather than in the registry so this loop stays
//! the only code that ever touches filter state.

use heapless::Vec;

use crate::channel::ChannelReader;
use crate::config::MAX_AXES;
use crate::filter::ResponsiveFilter;
use crate::gate::{ConnectionGate, LinkStatus};
use crate::registry::Registry;
use crate::telemetry::Telemetry;

/// What one cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleStats {
    pub axes_read: u8,
    pub clamped: u8,
    pub read_errors: u8,
    pub button_edges: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Gate closed; no channel was touched.
    Paused,
    Ran(CycleStats),
}

pub struct Acquisition<'a> {
    registry: &'a Registry,
    filters: Vec<ResponsiveFilter, MAX_AXES>,
    telemetry: &'a Telemetry,
}

impl<'a> Acquisition<'a> {
    /// One filter per registered axis, built from its descriptor.
    pub fn new(registry: &'a Registry, telemetry: &'a Telemetry) -> Self {
        let filters = registry
            .axes()
            .iter()
            .map(|axis| ResponsiveFilter::new(axis.descriptor().filter))
            .collect();

        Self {
            registry,
            filters,
            telemetry,
        }
    }

    /// Filter state for the axis at `index`.
    pub fn filter(&self, index: usize) -> Option<&ResponsiveFilter> {
        self.filters.get(index)
    }

    /// Runtime tuning of one axis filter.
    pub fn filter_mut(&mut self, index: usize) -> Option<&mut ResponsiveFilter> {
        self.filters.get_mut(index)
    }

    /// Run one cycle if the gate is open.
    pub fn tick<L: LinkStatus>(
        &mut self,
        gate: &ConnectionGate<L>,
        reader: &mut impl ChannelReader,
    ) -> CycleOutcome {
        if !gate.poll().is_active() {
            return CycleOutcome::Paused;
        }
        CycleOutcome::Ran(self.run_cycle(reader))
    }

    /// Run one cycle unconditionally.
    pub fn run_cycle(&mut self, reader: &mut impl ChannelReader) -> CycleStats {
        let mut stats = CycleStats::default();

        for (index, (axis, filter)) in self
            .registry
            .axes()
            .iter()
            .zip(self.filters.iter_mut())
            .enumerate()
        {
            let descriptor = axis.descriptor();
            let raw = match reader.read_channel(descriptor.channel) {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Acquisition: axis {} read failed: {:?}", index, e);
                    self.telemetry.record_read_error();
                    stats.read_errors += 1;
                    continue;
                }
            };
            axis.store_raw(raw);
            stats.axes_read += 1;

            let calibrated = descriptor.calibrate(raw);
            if calibrated.clamped {
                warn!(
                    "Acquisition: axis {} raw {} outside {}..{}",
                    index, raw, descriptor.calibration_min, descriptor.calibration_max
                );
                self.telemetry.record_clamp();
                stats.clamped += 1;
            }

            filter.update(calibrated.value);
            axis.store_filtered(filter.current_value(), filter.is_sleeping());
        }

        for (index, button) in self.registry.buttons().iter().enumerate() {
            let line = button.descriptor().line;
            let level = match reader.read_line(line) {
                Ok(level) => level,
                Err(e) => {
                    error!("Acquisition: button {} read failed: {:?}", index, e);
                    self.telemetry.record_read_error();
                    stats.read_errors += 1;
                    continue;
                }
            };

            let pressed = level != button.descriptor().inverted;
            if button.store(pressed) {
                debug!("Acquisition: button {} pressed={}", index, pressed);
                self.telemetry.record_button_event();
                stats.button_edges += 1;
            }
        }

        self.telemetry.record_cycle();
        stats
    }
}
