//! USB HID joystick device.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes one HID IN endpoint for joystick reports.

use creature_joystick::config;
use creature_joystick::error::Error;
use creature_joystick::gate::LinkStatus;
use creature_joystick::hid::{JoystickReport, JOYSTICK_REPORT_DESCRIPTOR, JOYSTICK_REPORT_SIZE};
use creature_joystick::report::ReportSink;
use defmt::info;
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

use crate::{CONNECTION, HOST_READY};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

/// HID endpoint packet size; one report fits in one packet.
const HID_PACKET_SIZE: usize = 16;

static JOYSTICK_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_BUS_HANDLER: StaticCell<UsbBusHandler> = StaticCell::new();

/// Translates `embassy-usb` bus events into connection callbacks.
///
/// embassy-usb does not re-announce the configuration after a resume, so
/// the handler remembers it and re-mounts on resume.
struct UsbBusHandler {
    configured: bool,
}

impl UsbBusHandler {
    fn publish(&self) {
        let ready = CONNECTION.is_link_ready() && CONNECTION.is_channel_ready();
        HOST_READY.sender().send(ready);
    }
}

impl embassy_usb::Handler for UsbBusHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.configured = false;
            CONNECTION.on_unmount();
            self.publish();
        }
    }

    fn configured(&mut self, configured: bool) {
        self.configured = configured;
        if configured {
            CONNECTION.on_mount();
        } else {
            CONNECTION.on_unmount();
        }
        self.publish();
    }

    fn suspended(&mut self, suspended: bool) {
        if suspended {
            CONNECTION.on_suspend();
        } else {
            CONNECTION.on_resume();
            if self.configured {
                CONNECTION.on_mount();
            }
        }
        self.publish();
    }
}

/// HID IN endpoint as a [`ReportSink`].
pub struct JoystickWriter {
    writer: HidWriter<'static, UsbDriver, HID_PACKET_SIZE>,
}

impl ReportSink for JoystickWriter {
    async fn send_report(&mut self, report: &JoystickReport) -> Result<(), Error> {
        let mut buf = [0u8; JOYSTICK_REPORT_SIZE];
        let n = report.serialize(&mut buf);
        self.writer.write(&buf[..n]).await.map_err(|_| Error::Send)
    }
}

/// Build result containing the USB device runner and the joystick writer.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub joystick: JoystickWriter,
}

/// Initialise the USB stack and create the HID joystick device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let handler = USB_BUS_HANDLER.init(UsbBusHandler { configured: false });
    builder.handler(handler);

    let state = JOYSTICK_STATE.init(State::new());
    let hid_config = HidConfig {
        report_descriptor: JOYSTICK_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: HID_PACKET_SIZE as u16,
    };
    let writer = HidWriter::new(&mut builder, state, hid_config);

    let device = builder.build();

    info!(
        "USB HID joystick initialised ({=u16:#x}:{=u16:#x})",
        config::USB_VID,
        config::USB_PID
    );

    UsbHidDevice {
        device,
        joystick: JoystickWriter { writer },
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}
