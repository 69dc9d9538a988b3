//! DMX512 transmit generator.
//!
//! Emits break, mark-after-break, start code and the 512 channel bytes
//! from the validated buffer, forever. At 250 kbit/s the 513 data bytes
//! dominate the ~23 ms frame cycle; no artificial inter-frame delay is
//! added beyond the hardware completion wait.

use crate::store::ChannelStore;
use crate::universe::{NULL_START_CODE, UNIVERSE_SIZE};

/// Break pulse duration in microseconds (standard minimum is 88).
pub const BREAK_US: u32 = 184;

/// Mark-after-break duration in microseconds (standard minimum is 8).
pub const MARK_AFTER_BREAK_US: u32 = 24;

/// Byte-sink / line-control collaborator driving the physical UART.
///
/// `set_break` and the delays shape the line directly; the implementation
/// must busy-wait in `delay_us`; yielding mid-pulse stretches the break
/// and corrupts the frame boundary for downstream fixtures.
pub trait FrameSink {
    type Error;

    /// Block until all previously written bytes have left the shifter.
    fn wait_tx_done(&mut self) -> Result<(), Self::Error>;

    /// Assert (`true`) or deassert (`false`) the break condition.
    fn set_break(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Busy-wait for the given number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Queue raw bytes for transmission.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Periodic frame generator for output mode.
pub struct TransmitGenerator<'a> {
    store: &'a ChannelStore,
}

impl<'a> TransmitGenerator<'a> {
    pub fn new(store: &'a ChannelStore) -> Self {
        Self { store }
    }

    /// Emit one complete DMX512 frame.
    ///
    /// The channel data is copied out of the store in one bounded memcpy;
    /// the lock is not held during the break/mark timing or the UART
    /// write, so the timing-critical sections never contend on it.
    pub fn send_frame<S: FrameSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.wait_tx_done()?;

        sink.set_break(true)?;
        sink.delay_us(BREAK_US);
        sink.set_break(false)?;
        sink.delay_us(MARK_AFTER_BREAK_US);

        sink.write(&[NULL_START_CODE])?;

        let mut channels = [0u8; UNIVERSE_SIZE as usize];
        self.store.snapshot_universe(&mut channels);
        sink.write(&channels)?;

        Ok(())
    }

    /// Drive the bus until the endpoint dies.
    ///
    /// Sink errors cannot be surfaced anywhere useful from here; the
    /// frame is abandoned and the next cycle retries from the completion
    /// wait.
    pub fn run<S: FrameSink>(&self, sink: &mut S) -> ! {
        loop {
            let _ = self.send_frame(sink);
        }
    }
}
