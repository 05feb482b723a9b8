//! Application-wide constants and compile-time configuration.
//!
//! All channel assignments, timing parameters, filter tuning and protocol
//! constants live here so they can be tuned in one place.

use crate::registry::{pot, three_axis_stick, AxisDescriptor, ButtonDescriptor};

// Loops

/// Acquisition loop period (ms). 0 = run as fast as the executor allows.
pub const POLLING_INTERVAL_MS: u64 = 2;

/// Report loop period (ms). Matches the HID endpoint poll interval.
pub const REPORT_INTERVAL_MS: u64 = 2;

/// Pause both loops while the host is not listening.
pub const SUSPEND_LOOPS_WHEN_NO_USB: bool = true;

/// What to do when the board layout registers more channels than fit.
pub const OVERFLOW_POLICY: OverflowPolicy = OverflowPolicy::Halt;

/// Registry capacity violation handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Stop the device in a fault loop.
    Halt,
    /// Hand the error back to the caller and keep what was registered.
    Reject,
}

// Registry

/// Number of positional axis fields in the HID report.
pub const MAX_AXES: usize = 8;

/// Buttons packed into the report's one-byte mask.
pub const MAX_BUTTONS: usize = 8;

// Analog filter defaults

/// 12-bit SAADC.
pub const FILTER_RESOLUTION: u16 = 4096;

/// From the ResponsiveAnalogRead docs: raise it (towards 1) for less easing
/// and more responsiveness, at the cost of more noise when sleep is off.
pub const FILTER_SNAP_MULTIPLIER: f32 = 0.2;

pub const FILTER_ACTIVITY_THRESHOLD: f32 = 25.0;
pub const FILTER_SLEEP_ENABLE: bool = true;
pub const FILTER_EDGE_SNAP_ENABLE: bool = true;

// Button multiplexer

/// Select lines on the 16:1 button mux.
pub const BUTTON_MUX_SELECT_LINES: usize = 4;

/// Addressable mux input lines.
pub const BUTTON_LINES: u8 = 1 << BUTTON_MUX_SELECT_LINES;

/// Busy-wait iterations after switching the mux before sampling the input.
pub const BUTTON_MUX_SETTLE_CYCLES: u32 = 32;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "Creature Workshop";
pub const USB_PRODUCT: &str = "Joystick";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 2;

// Diagnostics

/// How often the status task logs raw/filtered values (ms).
pub const STATUS_LOG_INTERVAL_MS: u64 = 1000;

// Board layout
//
// Two halves, each a 3-axis stick plus a pot. The order below is the order
// of the report fields: X, Y, Z, Rx, Ry, Rz, Dial, Wheel.
//
//   AIN0..2  left stick      (Y inverted)
//   AIN3     left pot        (inverted)
//   AIN4..6  right stick     (Z inverted)
//   AIN7     right pot       (inverted)
//   MUX 0..7 face buttons    (active-low)

const LEFT_STICK: [AxisDescriptor; 3] = three_axis_stick(0, 1, 2);
const RIGHT_STICK: [AxisDescriptor; 3] = three_axis_stick(4, 5, 6);

/// Axis registration order.
pub const AXIS_LAYOUT: [AxisDescriptor; 8] = [
    LEFT_STICK[0],
    LEFT_STICK[1].inverted(),
    LEFT_STICK[2],
    pot(3).inverted(),
    RIGHT_STICK[0],
    RIGHT_STICK[1],
    RIGHT_STICK[2].inverted(),
    pot(7).inverted(),
];

/// Button registration order (bit 0 first).
pub const BUTTON_LAYOUT: [ButtonDescriptor; 8] = [
    ButtonDescriptor::new(0).inverted(),
    ButtonDescriptor::new(1).inverted(),
    ButtonDescriptor::new(2).inverted(),
    ButtonDescriptor::new(3).inverted(),
    ButtonDescriptor::new(4).inverted(),
    ButtonDescriptor::new(5).inverted(),
    ButtonDescriptor::new(6).inverted(),
    ButtonDescriptor::new(7).inverted(),
];
