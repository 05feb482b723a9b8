//! Board bring-up - SAADC, button multiplexer and USB peripheral.
//!
//! Pin map (nRF52840):
//! ```text
//!   AIN0..AIN7   P0.02 P0.03 P0.04 P0.05 P0.28 P0.29 P0.30 P0.31
//!   MUX S0..S3   P1.01 P1.02 P1.03 P1.04
//!   MUX SIG      P1.05 (pull-up, buttons short to ground)
//! ```

use creature_joystick::channel::mux::MuxedLines;
use defmt::info;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::saadc::{self, ChannelConfig, Resolution, Saadc};
use embassy_nrf::{bind_interrupts, peripherals, Peripherals};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
});

/// Analog inputs scanned per acquisition cycle.
pub const ADC_CHANNELS: usize = 8;

pub type Adc = Saadc<'static, ADC_CHANNELS>;
pub type ButtonMux = MuxedLines<Output<'static>, Input<'static>>;

pub struct Board {
    pub adc: Adc,
    pub buttons: ButtonMux,
    pub usbd: peripherals::USBD,
}

impl Board {
    pub fn init(p: Peripherals) -> Self {
        let mut adc_config = saadc::Config::default();
        adc_config.resolution = Resolution::_12BIT;

        let channels = [
            ChannelConfig::single_ended(p.P0_02),
            ChannelConfig::single_ended(p.P0_03),
            ChannelConfig::single_ended(p.P0_04),
            ChannelConfig::single_ended(p.P0_05),
            ChannelConfig::single_ended(p.P0_28),
            ChannelConfig::single_ended(p.P0_29),
            ChannelConfig::single_ended(p.P0_30),
            ChannelConfig::single_ended(p.P0_31),
        ];
        let adc = Saadc::new(p.SAADC, Irqs, adc_config, channels);

        let select = [
            Output::new(p.P1_01, Level::Low, OutputDrive::Standard),
            Output::new(p.P1_02, Level::Low, OutputDrive::Standard),
            Output::new(p.P1_03, Level::Low, OutputDrive::Standard),
            Output::new(p.P1_04, Level::Low, OutputDrive::Standard),
        ];
        let buttons = MuxedLines::new(select, Input::new(p.P1_05, Pull::Up));

        info!("Board: SAADC {} channels, 16-line button mux", ADC_CHANNELS);

        Self {
            adc,
            buttons,
            usbd: p.USBD,
        }
    }
}
