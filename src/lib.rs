//! Joystick input pipeline for creature-joystick.
//!
//! Raw ADC samples and button lines go through per-axis filtering into a
//! fixed registry; a report loop turns the registry into USB HID joystick
//! reports whenever the host is listening.
//!
//! ```text
//!  ChannelReader ─► Acquisition ─► Registry (atomics) ─► ReportLoop ─► ReportSink
//!                         ▲                                   ▲
//!                         └────────── ConnectionGate ─────────┘
//! ```
//!
//! Everything here is hardware-independent and runs on the host:
//! `cargo test --lib`. The firmware binary (`src/main.rs`, feature
//! `embedded`) wires it to the nRF52840 SAADC, GPIO and USB.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod acquisition;
pub mod channel;
pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod hid;
pub mod registry;
pub mod report;
pub mod telemetry;

pub use acquisition::{Acquisition, CycleOutcome, CycleStats};
pub use error::Error;
pub use filter::{FilterConfig, ResponsiveFilter};
pub use gate::{ConnectionGate, ConnectionState, GateState, LinkStatus};
pub use hid::{ButtonMask, JoystickReport};
pub use registry::Registry;
pub use report::{ReportLoop, ReportOutcome, ReportSink};
pub use telemetry::{Telemetry, TelemetrySnapshot};
