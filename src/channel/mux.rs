//! 16:1 analog/digital multiplexer for the button matrix.
//!
//! Four select outputs address one of sixteen inputs; a single GPIO reads
//! the selected line. Generic over `embedded-hal` pins so the same code
//! runs against the nRF GPIO driver and host test doubles.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use super::LineReader;
use crate::config::{BUTTON_LINES, BUTTON_MUX_SELECT_LINES, BUTTON_MUX_SETTLE_CYCLES};
use crate::error::Error;

/// Number of addressable lines.
pub const MUX_LINES: u8 = BUTTON_LINES;

pub struct MuxedLines<S, I> {
    select: [S; BUTTON_MUX_SELECT_LINES],
    input: I,
    selected: Option<u8>,
}

impl<S: OutputPin, I: InputPin> MuxedLines<S, I> {
    /// `select[0]` is the least significant address bit.
    pub fn new(select: [S; BUTTON_MUX_SELECT_LINES], input: I) -> Self {
        Self {
            select,
            input,
            selected: None,
        }
    }

    fn select(&mut self, line: u8) -> Result<(), Error> {
        if self.selected == Some(line) {
            return Ok(());
        }

        for (bit, pin) in self.select.iter_mut().enumerate() {
            let state = PinState::from(line & (1 << bit) != 0);
            pin.set_state(state).map_err(|_| Error::Bus)?;
        }
        self.selected = Some(line);

        for _ in 0..BUTTON_MUX_SETTLE_CYCLES {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

impl<S: OutputPin, I: InputPin> LineReader for MuxedLines<S, I> {
    fn read_line(&mut self, line: u8) -> Result<bool, Error> {
        if line >= MUX_LINES {
            return Err(Error::UnknownLine(line));
        }

        if let Err(e) = self.select(line) {
            // Address pins are in an unknown state; force a full re-select.
            self.selected = None;
            return Err(e);
        }
        self.input.is_high().map_err(|_| Error::Bus)
    }
}
