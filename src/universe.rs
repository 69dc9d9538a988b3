//! Module: universe
//!
//! Purpose: DMX512 universe model. Sizes, start codes and the address
//! window that maps a subrange of the 512-channel universe into a local
//! channel buffer.
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Number of channels in one DMX512 universe.
pub const UNIVERSE_SIZE: u16 = 512;

/// Slots in one full frame: start code + 512 channels.
///
/// Channel buffers are indexed 1..=512; slot 0 holds the start code on
/// receive and is unused in the validated buffer.
pub const FRAME_SLOTS: usize = UNIVERSE_SIZE as usize + 1;

/// Start code signalling standard DMX512 channel data.
///
/// Any other value marks an alternate protocol (e.g. RDM) and the frame
/// is discarded.
pub const NULL_START_CODE: u8 = 0x00;

/// The subrange of the universe an input endpoint listens to.
///
/// `start` is the first universe address extracted (1..=512), `count` the
/// number of channels (1..=512), with `start + count <= 513` so the window
/// never runs past channel 512. Channel `start` maps to local index 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWindow {
    start: u16,
    count: u16,
}

impl AddressWindow {
    /// Create a window, validating the range invariants.
    ///
    /// Returns `None` if `start` or `count` is outside 1..=512 or the
    /// window would extend past the end of the universe.
    pub const fn new(start: u16, count: u16) -> Option<Self> {
        if start == 0 || start > UNIVERSE_SIZE {
            return None;
        }
        if count == 0 || count > UNIVERSE_SIZE {
            return None;
        }
        if start + count > UNIVERSE_SIZE + 1 {
            return None;
        }
        Some(Self { start, count })
    }

    /// The full-universe window used in output mode.
    pub const fn full() -> Self {
        Self { start: 1, count: UNIVERSE_SIZE }
    }

    /// First universe address in the window.
    #[inline]
    pub const fn start(&self) -> u16 {
        self.start
    }

    /// Number of channels in the window.
    #[inline]
    pub const fn count(&self) -> u16 {
        self.count
    }

    /// Check whether a receive cursor position falls inside the window.
    ///
    /// The cursor counts slots since the break: 0 is the start code,
    /// 1..=512 are universe channels.
    #[inline]
    pub const fn contains(&self, cursor: u16) -> bool {
        cursor >= self.start && cursor < self.start + self.count
    }

    /// Map a cursor position inside the window to a local buffer index.
    ///
    /// Only meaningful when `contains(cursor)` is true; the result is then
    /// in 1..=count.
    #[inline]
    pub const fn local_index(&self, cursor: u16) -> usize {
        (cursor - self.start + 1) as usize
    }

    /// Window with a different start address, if still valid.
    pub const fn with_start(&self, start: u16) -> Option<Self> {
        Self::new(start, self.count)
    }

    /// Window with a different channel count, if still valid.
    pub const fn with_count(&self, count: u16) -> Option<Self> {
        Self::new(self.start, count)
    }
}

impl Default for AddressWindow {
    fn default() -> Self {
        Self::full()
    }
}
