//! HID report types.

pub mod joystick;


pub use joystick::{
    AxisField, ButtonMask, JoystickReport, JOYSTICK_REPORT_DESCRIPTOR, JOYSTICK_REPORT_SIZE,
};
