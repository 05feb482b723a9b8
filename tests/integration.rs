//! Integration tests for the creature-joystick input pipeline.
//!
//! Drives the acquisition and report loops end to end against scripted
//! hardware: a channel reader fed from arrays, a connection state toggled
//! by hand, and a report sink that records what it was given.

use creature_joystick::acquisition::{Acquisition, CycleOutcome};
use creature_joystick::channel::ChannelReader;
use creature_joystick::error::Error;
use creature_joystick::filter::FilterConfig;
use creature_joystick::gate::{ConnectionGate, ConnectionState};
use creature_joystick::hid::{AxisField, JoystickReport};
use creature_joystick::registry::{AxisDescriptor, BoardLayout, ButtonDescriptor, Registry};
use creature_joystick::report::{ReportLoop, ReportOutcome, ReportSink, SkipReason};
use creature_joystick::telemetry::Telemetry;
use embassy_futures::block_on;

// ═══════════════════════════════════════════════════════════════════════════
// Scripted hardware
// ═══════════════════════════════════════════════════════════════════════════

struct ScriptedInputs {
    channels: [u16; 8],
    lines: u16,
    reads: usize,
}

impl ScriptedInputs {
    fn new() -> Self {
        Self {
            channels: [0; 8],
            lines: 0,
            reads: 0,
        }
    }
}

impl ChannelReader for ScriptedInputs {
    fn read_channel(&mut self, channel: u8) -> Result<u16, Error> {
        self.reads += 1;
        self.channels
            .get(channel as usize)
            .copied()
            .ok_or(Error::UnknownChannel(channel))
    }

    fn read_line(&mut self, line: u8) -> Result<bool, Error> {
        self.reads += 1;
        Ok(self.lines & (1 << line) != 0)
    }
}

#[derive(Default)]
struct RecordingSink {
    reports: Vec<JoystickReport>,
}

impl ReportSink for RecordingSink {
    async fn send_report(&mut self, report: &JoystickReport) -> Result<(), Error> {
        self.reports.push(*report);
        Ok(())
    }
}

fn passthrough() -> FilterConfig {
    FilterConfig::DEFAULT
        .with_sleep(false)
        .with_snap_multiplier(1.0)
}

// ═══════════════════════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn step_input_wakes_filter_and_settles() {
    let mut registry = Registry::new();
    registry
        .register_axis(
            AxisDescriptor::new(0)
                .calibrated(0, 1023)
                .with_filter(FilterConfig::DEFAULT.with_snap_multiplier(0.3)),
        )
        .unwrap();
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);
    let mut inputs = ScriptedInputs::new();

    // Resting at the low rail: edge snap keeps the filter asleep at 0.
    for _ in 0..3 {
        acquisition.run_cycle(&mut inputs);
        assert_eq!(registry.axes()[0].smoothed(), 0);
        assert!(registry.axes()[0].is_sleeping());
    }

    inputs.channels[0] = 900;
    for _ in 0..5 {
        acquisition.run_cycle(&mut inputs);
    }

    let axis = &registry.axes()[0];
    assert_eq!(axis.raw(), 900);
    assert!(axis.smoothed().abs_diff(900) <= 5);
    assert!(!axis.is_sleeping());
    assert_eq!(telemetry.snapshot().acquisition_cycles, 8);
}

#[test]
fn board_layout_reports_every_field() {
    let mut registry = Registry::new();
    registry.populate(&BoardLayout).unwrap();
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);

    // Everything at mid-scale, all (active-low) buttons released.
    let mut inputs = ScriptedInputs::new();
    inputs.channels = [2048; 8];
    inputs.lines = 0xFFFF;
    for _ in 0..4 {
        acquisition.run_cycle(&mut inputs);
    }

    let report = JoystickReport::from_registry(&registry);
    for field in AxisField::ALL {
        assert!(report.axis(field).abs() <= 1, "{:?} = {}", field, report.axis(field));
    }
    assert_eq!(report.buttons.bits(), 0);

    // Press button 3.
    inputs.lines &= !(1 << 3);
    acquisition.run_cycle(&mut inputs);
    let report = JoystickReport::from_registry(&registry);
    assert_eq!(report.buttons.bits(), 1 << 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// Registry order
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn registration_order_decides_report_fields() {
    let mut registry = Registry::new();
    for channel in [7, 0, 3] {
        registry
            .register_axis(AxisDescriptor::new(channel).with_filter(passthrough()))
            .unwrap();
    }
    for line in [5, 1] {
        registry.register_button(ButtonDescriptor::new(line)).unwrap();
    }
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);

    let mut inputs = ScriptedInputs::new();
    inputs.channels[7] = 4095;
    inputs.channels[0] = 0;
    inputs.channels[3] = 2048;
    inputs.lines = 1 << 1;
    acquisition.run_cycle(&mut inputs);

    let report = JoystickReport::from_registry(&registry);
    assert_eq!(report.axis(AxisField::X), 127);
    assert_eq!(report.axis(AxisField::Y), -127);
    assert_eq!(report.axis(AxisField::Z), -1);
    assert_eq!(report.axis(AxisField::Rx), 0);
    // Line 1 is the second registered button.
    assert_eq!(report.buttons.bits(), 0b10);
}

// ═══════════════════════════════════════════════════════════════════════════
// Calibration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn inverted_axis_mirrors_plain_axis() {
    let (min, max) = (100, 4000);
    let mut registry = Registry::new();
    registry
        .register_axis(AxisDescriptor::new(0).calibrated(min, max).inverted())
        .unwrap();
    registry
        .register_axis(AxisDescriptor::new(1).calibrated(min, max))
        .unwrap();
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);

    let mut inputs = ScriptedInputs::new();
    for v in [100, 500, 2000, 2010, 3999, 4000, 1234, 1234, 1234] {
        inputs.channels[0] = v;
        inputs.channels[1] = max - v + min;
        acquisition.run_cycle(&mut inputs);

        let (inverted, plain) = (&registry.axes()[0], &registry.axes()[1]);
        assert_eq!(inverted.smoothed(), plain.smoothed(), "raw {}", v);
        assert_eq!(inverted.filtered(), plain.filtered());
        assert_eq!(inverted.is_sleeping(), plain.is_sleeping());
    }
    assert_eq!(telemetry.snapshot().clamp_warnings, 0);
}

#[test]
fn each_clamped_read_warns_once() {
    let mut registry = Registry::new();
    registry
        .register_axis(AxisDescriptor::new(0).calibrated(1000, 3000))
        .unwrap();
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);

    let mut inputs = ScriptedInputs::new();
    let mut clamped = 0;
    for v in [500, 2000, 3500, 3500, 2000] {
        inputs.channels[0] = v;
        clamped += acquisition.run_cycle(&mut inputs).clamped as u32;
    }

    assert_eq!(clamped, 3);
    assert_eq!(telemetry.snapshot().clamp_warnings, 3);
    assert!(registry.axes()[0].smoothed() <= 3000);
}

// ═══════════════════════════════════════════════════════════════════════════
// Connection gate
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn paused_loops_resume_without_backlog() {
    let mut registry = Registry::new();
    registry
        .register_axis(AxisDescriptor::new(0).with_filter(passthrough()))
        .unwrap();
    let telemetry = Telemetry::new();
    let mut acquisition = Acquisition::new(&registry, &telemetry);
    let report_loop = ReportLoop::new(&registry, &telemetry);

    let state = ConnectionState::new();
    let gate = ConnectionGate::new(&state, true);
    let mut inputs = ScriptedInputs::new();
    let mut sink = RecordingSink::default();

    state.on_mount();
    assert!(matches!(acquisition.tick(&gate, &mut inputs), CycleOutcome::Ran(_)));
    assert_eq!(block_on(report_loop.tick(&gate, &mut sink)), ReportOutcome::Sent);

    // Host suspends; ten cycles elapse.
    state.on_suspend();
    let reads_before = inputs.reads;
    for _ in 0..10 {
        inputs.channels[0] += 100;
        assert_eq!(acquisition.tick(&gate, &mut inputs), CycleOutcome::Paused);
        assert_eq!(
            block_on(report_loop.tick(&gate, &mut sink)),
            ReportOutcome::Skipped(SkipReason::Paused)
        );
    }
    assert_eq!(inputs.reads, reads_before);
    assert_eq!(sink.reports.len(), 1);

    // Host returns: one tick is one cycle, nothing replayed.
    state.on_resume();
    state.on_mount();
    assert!(matches!(acquisition.tick(&gate, &mut inputs), CycleOutcome::Ran(_)));
    assert_eq!(block_on(report_loop.tick(&gate, &mut sink)), ReportOutcome::Sent);

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.acquisition_cycles, 2);
    assert_eq!(snapshot.reports_sent, 2);
    assert_eq!(sink.reports.len(), 2);
    assert_eq!(registry.axes()[0].raw(), 1000);

    // The resumed report carries the current position, not a stale one.
    assert_eq!(sink.reports[0].axis(AxisField::X), -127);
    let expected = AxisDescriptor::new(0).scale(1000) as i16 - 128;
    assert_eq!(expected, -66);
    assert_eq!(sink.reports[1].axis(AxisField::X) as i16, expected);
}
