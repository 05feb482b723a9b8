//! USB Device subsystem - presents a HID joystick to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb` with a single HID interface. Bus events (configured,
//! suspended, resumed) feed the connection gate that pauses the
//! acquisition and report loops while nobody is listening.

pub mod hid_device;
