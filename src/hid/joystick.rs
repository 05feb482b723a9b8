//! USB HID joystick report.
//!
//! Layout (9 bytes, no report ID):
//! ```text
//! Byte 0..8: X, Y, Z, Rx, Ry, Rz, Dial, Wheel (signed, -127..127)
//! Byte 8:    Button bitfield (bit n = button n)
//! ```
//!
//! Axis field *n* carries the *n*-th registered axis; fields without a
//! registered axis stay centred at 0.

use crate::config::{MAX_AXES, MAX_BUTTONS};
use crate::registry::Registry;

/// Joystick report size in bytes.
pub const JOYSTICK_REPORT_SIZE: usize = MAX_AXES + 1;

/// Positional axis fields, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AxisField {
    X = 0,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Dial,
    Wheel,
}

impl AxisField {
    pub const ALL: [AxisField; MAX_AXES] = [
        AxisField::X,
        AxisField::Y,
        AxisField::Z,
        AxisField::Rx,
        AxisField::Ry,
        AxisField::Rz,
        AxisField::Dial,
        AxisField::Wheel,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// HID Generic Desktop usage ID.
    pub fn usage(self) -> u8 {
        match self {
            AxisField::X => 0x30,
            AxisField::Y => 0x31,
            AxisField::Z => 0x32,
            AxisField::Rx => 0x33,
            AxisField::Ry => 0x34,
            AxisField::Rz => 0x35,
            AxisField::Dial => 0x37,
            AxisField::Wheel => 0x38,
        }
    }
}

/// Ordered button bit-set; bit *n* is the *n*-th registered button.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMask(u8);

impl ButtonMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Indexes past the mask width are ignored.
    pub fn set(&mut self, index: usize, pressed: bool) {
        if index >= MAX_BUTTONS {
            return;
        }
        if pressed {
            self.0 |= 1 << index;
        } else {
            self.0 &= !(1 << index);
        }
    }

    pub fn is_set(&self, index: usize) -> bool {
        index < MAX_BUTTONS && self.0 & (1 << index) != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Map a 0-255 filtered value onto the signed report range.
pub fn axis_value(filtered: u8) -> i8 {
    (filtered as i16 - 128).max(-127) as i8
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickReport {
    pub axes: [i8; MAX_AXES],
    pub buttons: ButtonMask,
}

impl JoystickReport {
    /// Centred sticks, no buttons.
    pub const fn neutral() -> Self {
        Self {
            axes: [0; MAX_AXES],
            buttons: ButtonMask::empty(),
        }
    }

    /// Snapshot the registry's live values.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut report = Self::neutral();
        registry.for_each_axis(|i, axis| {
            if let Some(field) = report.axes.get_mut(i) {
                *field = axis_value(axis.filtered());
            }
        });
        registry.for_each_button(|i, button| report.buttons.set(i, button.is_pressed()));
        report
    }

    pub fn axis(&self, field: AxisField) -> i8 {
        self.axes[field.index()]
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written, 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < JOYSTICK_REPORT_SIZE {
            return 0;
        }
        for (byte, axis) in buf.iter_mut().zip(self.axes.iter()) {
            *byte = *axis as u8;
        }
        buf[MAX_AXES] = self.buttons.bits();
        JOYSTICK_REPORT_SIZE
    }
}

/// USB HID Report Descriptor matching [`JoystickReport::serialize`].
pub const JOYSTICK_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    //   - 8 absolute axes -
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x09, 0x35, //   Usage (Rz)
    0x09, 0x37, //   Usage (Dial)
    0x09, 0x38, //   Usage (Wheel)
    0x15, 0x81, //   Logical Minimum (-127)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - 8 buttons -
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x08, //   Usage Maximum (Button 8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection (Application)
];
