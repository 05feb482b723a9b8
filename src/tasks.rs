//! Embassy tasks - the USB runner, the two pipeline loops and the status
//! logger.
//!
//! The loops poll the connection gate at each cycle boundary. While it is
//! paused they park on the host-ready watch instead of ticking, and their
//! tickers are reset on wake so no missed cycles are replayed.

use creature_joystick::acquisition::{Acquisition, CycleOutcome};
use creature_joystick::channel::SampledChannels;
use creature_joystick::config;
use creature_joystick::hid::JoystickReport;
use creature_joystick::registry::Registry;
use creature_joystick::report::{ReportLoop, ReportOutcome, SkipReason};
use defmt::info;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::Receiver;
use embassy_time::{Duration, Ticker};
use embassy_usb::UsbDevice;

use crate::board::{Adc, ButtonMux, ADC_CHANNELS};
use crate::usb::hid_device::{self, JoystickWriter, UsbDriver};
use crate::{GATE, HOST_READY_RECEIVERS, TELEMETRY};

pub type HostReady = Receiver<'static, CriticalSectionRawMutex, bool, HOST_READY_RECEIVERS>;

/// Cycle pacing. A zero interval yields to the executor instead of
/// sleeping.
struct Pacer(Option<Ticker>);

impl Pacer {
    fn new(interval_ms: u64) -> Self {
        Self((interval_ms > 0).then(|| Ticker::every(Duration::from_millis(interval_ms))))
    }

    async fn wait(&mut self) {
        match &mut self.0 {
            Some(ticker) => ticker.next().await,
            None => yield_now().await,
        }
    }

    /// Start counting from now; ticks missed while paused are dropped.
    fn reset(&mut self) {
        if let Some(ticker) = &mut self.0 {
            ticker.reset();
        }
    }

    async fn resume_when_ready(&mut self, host_ready: &mut HostReady) {
        host_ready.get_and(|ready| *ready).await;
        self.reset();
    }
}

#[embassy_executor::task]
pub async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
pub async fn acquisition_task(
    registry: &'static Registry,
    mut adc: Adc,
    mut buttons: ButtonMux,
    mut host_ready: HostReady,
) -> ! {
    info!("Acquisition: every {} ms", config::POLLING_INTERVAL_MS);

    let mut acquisition = Acquisition::new(registry, &TELEMETRY);
    let mut pacer = Pacer::new(config::POLLING_INTERVAL_MS);
    let mut samples = [0i16; ADC_CHANNELS];

    loop {
        if !GATE.poll().is_active() {
            pacer.resume_when_ready(&mut host_ready).await;
            continue;
        }

        adc.sample(&mut samples).await;
        let mut reader = SampledChannels::new(&samples, &mut buttons);
        if acquisition.tick(&GATE, &mut reader) == CycleOutcome::Paused {
            pacer.resume_when_ready(&mut host_ready).await;
            continue;
        }

        pacer.wait().await;
    }
}

#[embassy_executor::task]
pub async fn report_task(
    registry: &'static Registry,
    mut joystick: JoystickWriter,
    mut host_ready: HostReady,
) -> ! {
    info!("Report: every {} ms", config::REPORT_INTERVAL_MS);

    let report_loop = ReportLoop::new(registry, &TELEMETRY);
    let mut pacer = Pacer::new(config::REPORT_INTERVAL_MS);

    loop {
        if report_loop.tick(&GATE, &mut joystick).await == ReportOutcome::Skipped(SkipReason::Paused) {
            pacer.resume_when_ready(&mut host_ready).await;
            continue;
        }
        pacer.wait().await;
    }
}

/// Periodic dump of live values, one line per axis.
#[embassy_executor::task]
pub async fn status_task(registry: &'static Registry) -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(config::STATUS_LOG_INTERVAL_MS));

    loop {
        ticker.next().await;

        registry.for_each_axis(|i, axis| {
            info!(
                "axis {}: raw={} smoothed={} filtered={} sleeping={}",
                i,
                axis.raw(),
                axis.smoothed(),
                axis.filtered(),
                axis.is_sleeping()
            );
        });
        let buttons = JoystickReport::from_registry(registry).buttons;
        info!("buttons={=u8:b} {}", buttons.bits(), TELEMETRY.snapshot());
    }
}
