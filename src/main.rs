//! creature-joystick firmware entry point (nRF52840).
//!
//! Brings up the board, registers the axis/button layout and spawns the
//! USB, acquisition, report and status tasks.

#![no_std]
#![no_main]

mod board;
mod fault;
mod tasks;
mod usb;

use creature_joystick::config::{self, OverflowPolicy};
use creature_joystick::gate::{ConnectionGate, ConnectionState};
use creature_joystick::registry::{BoardLayout, Registry};
use creature_joystick::telemetry::Telemetry;
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::Watch;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use board::Board;

/// One receiver per paused loop (acquisition + report).
pub const HOST_READY_RECEIVERS: usize = 2;

/// USB connection flags, written by the USB bus handler.
pub static CONNECTION: ConnectionState = ConnectionState::new();

pub static GATE: ConnectionGate<&ConnectionState> =
    ConnectionGate::new(&CONNECTION, config::SUSPEND_LOOPS_WHEN_NO_USB);

/// Wakes paused loops when the host comes back.
pub static HOST_READY: Watch<CriticalSectionRawMutex, bool, HOST_READY_RECEIVERS> = Watch::new();

pub static TELEMETRY: Telemetry = Telemetry::new();

static REGISTRY: StaticCell<Registry> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("creature-joystick v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_nrf::init(Default::default());
    let mut board = Board::init(p);
    board.adc.calibrate().await;

    let registry = REGISTRY.init(Registry::new());
    if let Err(e) = registry.populate(&BoardLayout) {
        match config::OVERFLOW_POLICY {
            OverflowPolicy::Halt => fault::halt(e),
            OverflowPolicy::Reject => warn!("Registry: continuing with partial layout ({})", e),
        }
    }
    let registry: &'static Registry = registry;

    let usb = usb::hid_device::init(board.usbd);

    let (Some(acquisition_ready), Some(report_ready)) =
        (HOST_READY.receiver(), HOST_READY.receiver())
    else {
        fault::halt("host-ready watch has no free receivers");
    };

    if let Err(e) = spawner.spawn(tasks::usb_task(usb.device)) {
        fault::halt(e);
    }
    if let Err(e) = spawner.spawn(tasks::acquisition_task(
        registry,
        board.adc,
        board.buttons,
        acquisition_ready,
    )) {
        fault::halt(e);
    }
    if let Err(e) = spawner.spawn(tasks::report_task(registry, usb.joystick, report_ready)) {
        fault::halt(e);
    }
    if let Err(e) = spawner.spawn(tasks::status_task(registry)) {
        fault::halt(e);
    }

    info!(
        "All tasks spawned (gating {})",
        if GATE.is_enabled() { "on" } else { "off" }
    );
}
