//! Unified error type for creature-joystick.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Which registry collection a capacity violation happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryKind {
    Axis,
    Button,
}

/// Top-level error type used across the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Registry
    /// More axes or buttons registered than the fixed capacity allows.
    RegistryFull { kind: RegistryKind, capacity: usize },

    /// A descriptor failed validation (empty calibration range, bounds
    /// outside the channel resolution, ...).
    InvalidDescriptor,

    // Channels
    /// The analog channel is not wired on this board.
    UnknownChannel(u8),

    /// The digital line is not wired on this board.
    UnknownLine(u8),

    /// A pin or bus transaction failed while reading a channel.
    Bus,

    // Transport
    /// The report sink rejected or failed to write a report.
    Send,
}

impl Error {
    /// Capacity violations are the only fatal class of error; everything
    /// else is absorbed by the loops.
    pub fn is_capacity_violation(&self) -> bool {
        matches!(self, Error::RegistryFull { .. })
    }
}
