//! Fatal fault loop.
//!
//! Unrecoverable startup errors end here instead of in a panic so the
//! cause is logged once over RTT and the core stays parked where a probe
//! can find it.

use cortex_m::{asm, interrupt};
use defmt::error;

/// Log `reason` and stop the device.
pub fn halt(reason: impl defmt::Format) -> ! {
    error!("FAULT: {} - halting", reason);
    interrupt::disable();
    loop {
        asm::wfi();
    }
}
