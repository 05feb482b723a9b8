//! Channel readers - one raw sample from an analog input or a digital line.
//!
//! The acquisition loop only sees the [`ChannelReader`] trait. On the
//! board, analog inputs come from one SAADC scan per cycle
//! ([`SampledChannels`]) and buttons from the 16:1 mux ([`mux::MuxedLines`]).

pub mod mux;

use crate::error::Error;

/// Raw access to the physical inputs.
///
/// Each call is one bounded-latency hardware transaction; implementations
/// must not wait on other channels.
pub trait ChannelReader {
    /// Read one analog channel in ADC counts.
    fn read_channel(&mut self, channel: u8) -> Result<u16, Error>;

    /// Read one digital line; `true` = electrically high.
    fn read_line(&mut self, line: u8) -> Result<bool, Error>;
}

/// Source of digital lines only.
pub trait LineReader {
    fn read_line(&mut self, line: u8) -> Result<bool, Error>;
}

/// Serves analog reads from a sample frame captured at the start of the
/// cycle and forwards line reads to a [`LineReader`].
pub struct SampledChannels<'a, L> {
    samples: &'a [i16],
    lines: &'a mut L,
}

impl<'a, L: LineReader> SampledChannels<'a, L> {
    pub fn new(samples: &'a [i16], lines: &'a mut L) -> Self {
        Self { samples, lines }
    }
}

impl<L: LineReader> ChannelReader for SampledChannels<'_, L> {
    fn read_channel(&mut self, channel: u8) -> Result<u16, Error> {
        let sample = *self
            .samples
            .get(channel as usize)
            .ok_or(Error::UnknownChannel(channel))?;

        // Single-ended SAADC reads dip slightly below zero around ground.
        if sample < 0 {
            trace!("channel {} sampled {} below ground", channel, sample);
            return Ok(0);
        }
        Ok(sample as u16)
    }

    fn read_line(&mut self, line: u8) -> Result<bool, Error> {
        self.lines.read_line(line)
    }
}
