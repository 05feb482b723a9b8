//! Connection gate - pauses the loops while the host is not listening.
//!
//! USB bus events update a [`ConnectionState`]; both loops poll a
//! [`ConnectionGate`] at each cycle boundary. There is no queue between
//! them, so a paused loop simply resumes at its next cycle with nothing
//! to catch up on.
//!
//! ```text
//!   configured ─► mounted + bus_active ─┐
//!   suspend    ─► !bus_active           ├─► Active  (link && channel)
//!   deconfig   ─► !mounted              ┘   Paused  (otherwise)
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

/// Link readiness as seen by the gate and the report loop.
pub trait LinkStatus {
    /// Device is enumerated and configured by a host.
    fn is_link_ready(&self) -> bool;

    /// The report endpoint can take a report right now.
    fn is_channel_ready(&self) -> bool;
}

impl<T: LinkStatus + ?Sized> LinkStatus for &T {
    fn is_link_ready(&self) -> bool {
        (**self).is_link_ready()
    }

    fn is_channel_ready(&self) -> bool {
        (**self).is_channel_ready()
    }
}

/// USB connection flags, written from the USB stack's bus callbacks.
#[derive(Debug, Default)]
pub struct ConnectionState {
    mounted: AtomicBool,
    bus_active: AtomicBool,
}

impl ConnectionState {
    pub const fn new() -> Self {
        Self {
            mounted: AtomicBool::new(false),
            bus_active: AtomicBool::new(false),
        }
    }

    /// Host configured the device.
    pub fn on_mount(&self) {
        self.mounted.store(true, Ordering::Relaxed);
        self.bus_active.store(true, Ordering::Relaxed);
        debug!("USB: mounted");
    }

    /// Host deconfigured the device or the cable was pulled.
    pub fn on_unmount(&self) {
        self.mounted.store(false, Ordering::Relaxed);
        debug!("USB: unmounted");
    }

    pub fn on_suspend(&self) {
        self.mounted.store(false, Ordering::Relaxed);
        self.bus_active.store(false, Ordering::Relaxed);
        debug!("USB: suspended");
    }

    pub fn on_resume(&self) {
        self.bus_active.store(true, Ordering::Relaxed);
        debug!("USB: resumed");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Relaxed)
    }

    pub fn is_bus_active(&self) -> bool {
        self.bus_active.load(Ordering::Relaxed)
    }
}

impl LinkStatus for ConnectionState {
    fn is_link_ready(&self) -> bool {
        self.is_mounted()
    }

    fn is_channel_ready(&self) -> bool {
        self.is_bus_active()
    }
}

/// Gate state for the current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateState {
    Active,
    Paused,
}

impl GateState {
    pub fn is_active(self) -> bool {
        self == GateState::Active
    }
}

pub struct ConnectionGate<L> {
    link: L,
    enabled: bool,
    active: AtomicBool,
}

impl<L: LinkStatus> ConnectionGate<L> {
    /// `enabled = false` makes the gate permanently [`GateState::Active`].
    pub const fn new(link: L, enabled: bool) -> Self {
        Self {
            link,
            enabled,
            active: AtomicBool::new(!enabled),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Evaluate the gate. Called by each loop at its cycle boundary.
    pub fn poll(&self) -> GateState {
        if !self.enabled {
            return GateState::Active;
        }

        let ready = self.link.is_link_ready() && self.link.is_channel_ready();
        let was = self.active.swap(ready, Ordering::Relaxed);
        if was != ready {
            if ready {
                info!("Gate: host ready, resuming loops");
            } else {
                info!("Gate: host gone, pausing loops");
            }
        }

        if ready {
            GateState::Active
        } else {
            GateState::Paused
        }
    }
}
