//! Axis and button registry.
//!
//! Descriptors are registered once at startup into fixed-capacity
//! `heapless` vectors; registration order is the report field order and
//! never changes afterwards.
//!
//! Each axis/button carries its live values as atomics. The acquisition
//! loop is the only writer; the report loop and status readers load them
//! with `Relaxed` ordering and never block the writer.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use heapless::Vec;

use crate::config::{self, MAX_AXES, MAX_BUTTONS};
use crate::error::{Error, RegistryKind};
use crate::filter::FilterConfig;

/// Static description of one analog axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisDescriptor {
    /// SAADC input (AIN number).
    pub channel: u8,
    pub calibration_min: u16,
    pub calibration_max: u16,
    pub inverted: bool,
    pub filter: FilterConfig,
}

impl AxisDescriptor {
    /// Full-range, non-inverted axis with the default filter.
    pub const fn new(channel: u8) -> Self {
        Self {
            channel,
            calibration_min: 0,
            calibration_max: config::FILTER_RESOLUTION - 1,
            inverted: false,
            filter: FilterConfig::DEFAULT,
        }
    }

    pub const fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    pub const fn calibrated(mut self, min: u16, max: u16) -> Self {
        self.calibration_min = min;
        self.calibration_max = max;
        self
    }

    pub const fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// A descriptor needs a non-empty calibration range inside the
    /// channel resolution.
    pub fn validate(&self) -> Result<(), Error> {
        if self.calibration_min >= self.calibration_max
            || self.calibration_max >= self.filter.resolution
        {
            return Err(Error::InvalidDescriptor);
        }
        Ok(())
    }

    /// Clamp a raw reading into the calibration window, then mirror it
    /// when the axis is inverted.
    pub fn calibrate(&self, raw: u16) -> Calibrated {
        let min = self.calibration_min;
        let max = self.calibration_max;
        let (value, clamped) = if raw < min {
            (min, true)
        } else if raw > max {
            (max, true)
        } else {
            (raw, false)
        };

        // Saturating so an unvalidated min > max cannot wrap.
        let value = if self.inverted {
            max.saturating_sub(value.saturating_sub(min))
        } else {
            value
        };

        Calibrated { value, clamped }
    }

    /// Map filter output (ADC counts) onto the 0-255 output range.
    pub fn scale(&self, counts: u16) -> u8 {
        let min = self.calibration_min as u32;
        let max = self.calibration_max as u32;
        let span = max.saturating_sub(min).max(1);
        let counts = (counts as u32).min(max).saturating_sub(min);
        (counts.min(span) * u8::MAX as u32 / span) as u8
    }
}

/// Result of [`AxisDescriptor::calibrate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calibrated {
    pub value: u16,
    /// The raw reading was outside the calibration window.
    pub clamped: bool,
}

/// X/Y/Z stick on three consecutive registrations.
pub const fn three_axis_stick(x: u8, y: u8, z: u8) -> [AxisDescriptor; 3] {
    [
        AxisDescriptor::new(x),
        AxisDescriptor::new(y),
        AxisDescriptor::new(z),
    ]
}

pub const fn two_axis_stick(x: u8, y: u8) -> [AxisDescriptor; 2] {
    [AxisDescriptor::new(x), AxisDescriptor::new(y)]
}

/// Single-axis potentiometer.
pub const fn pot(channel: u8) -> AxisDescriptor {
    AxisDescriptor::new(channel)
}

/// Static description of one digital button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonDescriptor {
    /// Mux input line.
    pub line: u8,
    /// Active-low wiring.
    pub inverted: bool,
}

impl ButtonDescriptor {
    pub const fn new(line: u8) -> Self {
        Self {
            line,
            inverted: false,
        }
    }

    pub const fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// The line must be addressable on the mux.
    pub fn validate(&self) -> Result<(), Error> {
        if self.line >= config::BUTTON_LINES {
            return Err(Error::InvalidDescriptor);
        }
        Ok(())
    }
}

/// A registered axis and its live values.
#[derive(Debug)]
pub struct Axis {
    descriptor: AxisDescriptor,
    raw: AtomicU16,
    smoothed: AtomicU16,
    filtered: AtomicU8,
    sleeping: AtomicBool,
}

impl Axis {
    fn new(descriptor: AxisDescriptor) -> Self {
        Self {
            descriptor,
            raw: AtomicU16::new(0),
            smoothed: AtomicU16::new(0),
            filtered: AtomicU8::new(0),
            sleeping: AtomicBool::new(false),
        }
    }

    pub fn descriptor(&self) -> &AxisDescriptor {
        &self.descriptor
    }

    /// Last unprocessed reading.
    pub fn raw(&self) -> u16 {
        self.raw.load(Ordering::Relaxed)
    }

    /// Filter output in ADC counts.
    pub fn smoothed(&self) -> u16 {
        self.smoothed.load(Ordering::Relaxed)
    }

    /// Filter output scaled to 0-255.
    pub fn filtered(&self) -> u8 {
        self.filtered.load(Ordering::Relaxed)
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping.load(Ordering::Relaxed)
    }

    pub(crate) fn store_raw(&self, raw: u16) {
        self.raw.store(raw, Ordering::Relaxed);
    }

    /// `filtered` is always recomputed from the smoothed value here, never
    /// written on its own.
    pub(crate) fn store_filtered(&self, smoothed: u16, sleeping: bool) {
        self.smoothed.store(smoothed, Ordering::Relaxed);
        self.filtered
            .store(self.descriptor.scale(smoothed), Ordering::Relaxed);
        self.sleeping.store(sleeping, Ordering::Relaxed);
    }
}

/// A registered button and its live state.
#[derive(Debug)]
pub struct Button {
    descriptor: ButtonDescriptor,
    pressed: AtomicBool,
}

impl Button {
    fn new(descriptor: ButtonDescriptor) -> Self {
        Self {
            descriptor,
            pressed: AtomicBool::new(false),
        }
    }

    pub fn descriptor(&self) -> &ButtonDescriptor {
        &self.descriptor
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Relaxed)
    }

    /// Returns `true` on an edge.
    pub(crate) fn store(&self, pressed: bool) -> bool {
        self.pressed.swap(pressed, Ordering::Relaxed) != pressed
    }
}

/// Supplies the descriptors to register at startup.
pub trait ConfigSource {
    fn axes(&self) -> &[AxisDescriptor];
    fn buttons(&self) -> &[ButtonDescriptor];
}

/// The compiled-in board layout from [`config`].
pub struct BoardLayout;

impl ConfigSource for BoardLayout {
    fn axes(&self) -> &[AxisDescriptor] {
        &config::AXIS_LAYOUT
    }

    fn buttons(&self) -> &[ButtonDescriptor] {
        &config::BUTTON_LAYOUT
    }
}

/// Ordered, fixed-capacity collection of axes and buttons.
#[derive(Debug, Default)]
pub struct Registry {
    axes: Vec<Axis, MAX_AXES>,
    buttons: Vec<Button, MAX_BUTTONS>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            axes: Vec::new(),
            buttons: Vec::new(),
        }
    }

    /// Append an axis. Returns its position (= report field index).
    ///
    /// Invalid descriptors are logged and ignored; a full registry is a
    /// capacity violation the caller must handle.
    pub fn register_axis(&mut self, descriptor: AxisDescriptor) -> Result<usize, Error> {
        if let Err(e) = descriptor.validate() {
            error!(
                "Registry: rejecting axis on channel {} ({}..{})",
                descriptor.channel,
                descriptor.calibration_min,
                descriptor.calibration_max
            );
            return Err(e);
        }

        let index = self.axes.len();
        if self.axes.push(Axis::new(descriptor)).is_err() {
            error!("Registry: axis capacity {} exceeded", MAX_AXES);
            return Err(Error::RegistryFull {
                kind: RegistryKind::Axis,
                capacity: MAX_AXES,
            });
        }

        debug!(
            "Registry: axis {} -> channel {} (inverted={})",
            index, descriptor.channel, descriptor.inverted
        );
        Ok(index)
    }

    /// Append a button. Returns its bit position in the report mask.
    ///
    /// Lines past the mux are rejected like invalid axes.
    pub fn register_button(&mut self, descriptor: ButtonDescriptor) -> Result<usize, Error> {
        if let Err(e) = descriptor.validate() {
            error!("Registry: rejecting button on line {}", descriptor.line);
            return Err(e);
        }

        let index = self.buttons.len();
        if self.buttons.push(Button::new(descriptor)).is_err() {
            error!("Registry: button capacity {} exceeded", MAX_BUTTONS);
            return Err(Error::RegistryFull {
                kind: RegistryKind::Button,
                capacity: MAX_BUTTONS,
            });
        }

        debug!("Registry: button {} -> line {}", index, descriptor.line);
        Ok(index)
    }

    /// Register everything a [`ConfigSource`] provides, in order.
    ///
    /// Invalid descriptors are skipped. Both lists are registered up to
    /// capacity; the first capacity violation is returned afterwards.
    pub fn populate(&mut self, source: &impl ConfigSource) -> Result<(), Error> {
        let mut overflow = None;

        for descriptor in source.axes() {
            match self.register_axis(*descriptor) {
                Ok(_) | Err(Error::InvalidDescriptor) => {}
                Err(e) => {
                    overflow.get_or_insert(e);
                }
            }
        }
        for descriptor in source.buttons() {
            match self.register_button(*descriptor) {
                Ok(_) | Err(Error::InvalidDescriptor) => {}
                Err(e) => {
                    overflow.get_or_insert(e);
                }
            }
        }

        info!(
            "Registry: {} axes, {} buttons",
            self.axes.len(),
            self.buttons.len()
        );
        overflow.map_or(Ok(()), Err)
    }

    /// Axes in registration order.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Buttons in registration order.
    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn for_each_axis(&self, mut f: impl FnMut(usize, &Axis)) {
        for (i, axis) in self.axes.iter().enumerate() {
            f(i, axis);
        }
    }

    pub fn for_each_button(&self, mut f: impl FnMut(usize, &Button)) {
        for (i, button) in self.buttons.iter().enumerate() {
            f(i, button);
        }
    }
}
