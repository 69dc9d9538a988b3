//! Module: store
//!
//! Purpose: Double-buffered DMX channel store. Holds the last validated
//! frame plus the active address window behind a single lock. The receive
//! path promotes completed frames in, the transmit path and the public
//! read/write API copy data out, and no caller ever observes a frame that
//! is partially old and partially new.
//!
//! All critical sections are bounded memory copies; the lock is never held
//! across a hardware wait.

use crate::lock::SpinMutex;
use crate::universe::{AddressWindow, FRAME_SLOTS, UNIVERSE_SIZE};

struct StoreInner {
    /// Active address window; `count` bounds every channel access.
    window: AddressWindow,

    /// Last validated frame. Index 0 is the start-code slot (unused),
    /// indices 1..=window.count() hold channel data.
    validated: [u8; FRAME_SLOTS],
}

/// Synchronized channel buffer shared between the active loop (receive or
/// transmit) and the public API.
///
/// Out-of-range accesses are silent no-ops (reads return 0). Callers that
/// care must check preconditions themselves; this mirrors the defensive
/// contract of the wider API where nothing is ever raised to the caller.
pub struct ChannelStore {
    inner: SpinMutex<StoreInner>,
}

impl ChannelStore {
    /// Create a store for the given window, zero-filled.
    pub const fn new(window: AddressWindow) -> Self {
        Self {
            inner: SpinMutex::new(StoreInner {
                window,
                validated: [0; FRAME_SLOTS],
            }),
        }
    }

    /// Read one channel from the validated buffer.
    ///
    /// Returns 0 for any channel outside 1..=count; the sentinel doubles
    /// as "unaddressed" and "invalid".
    pub fn read(&self, channel: u16) -> u8 {
        let inner = self.inner.lock();
        if channel < 1 || channel > inner.window.count() {
            return 0;
        }
        inner.validated[channel as usize]
    }

    /// Copy `dst.len()` channels starting at local index `start` out of
    /// the validated buffer. Silently does nothing if the range does not
    /// fit inside 1..=count.
    pub fn read_all(&self, dst: &mut [u8], start: u16) {
        let inner = self.inner.lock();
        let count = inner.window.count() as usize;
        let start = start as usize;
        if start < 1 || start > count || start + dst.len() > count + 1 {
            return;
        }
        dst.copy_from_slice(&inner.validated[start..start + dst.len()]);
    }

    /// Write one channel into the validated buffer. Silent no-op outside
    /// 1..=count.
    pub fn write(&self, channel: u16, value: u8) {
        let mut inner = self.inner.lock();
        if channel < 1 || channel > inner.window.count() {
            return;
        }
        inner.validated[channel as usize] = value;
    }

    /// Copy `src.len()` channels into the validated buffer starting at
    /// local index `start`. Silent no-op if the range does not fit.
    pub fn write_all(&self, src: &[u8], start: u16) {
        let mut inner = self.inner.lock();
        let count = inner.window.count() as usize;
        let start = start as usize;
        if start < 1 || start > count || start + src.len() > count + 1 {
            return;
        }
        inner.validated[start..start + src.len()].copy_from_slice(src);
    }

    /// Promote a completed scratch frame into the validated buffer.
    ///
    /// Copies start-code slot plus the active channel range in one bounded
    /// memcpy under the lock, so concurrent readers see either the old
    /// frame or the new one, never a mix.
    pub fn promote(&self, scratch: &[u8; FRAME_SLOTS]) {
        let mut inner = self.inner.lock();
        let len = inner.window.count() as usize + 1;
        inner.validated[..len].copy_from_slice(&scratch[..len]);
    }

    /// Zero the validated buffer (sustained blackout confirmed).
    pub fn blackout(&self) {
        let mut inner = self.inner.lock();
        let len = inner.window.count() as usize + 1;
        inner.validated[..len].fill(0);
    }

    /// Snapshot of the active address window.
    pub fn window(&self) -> AddressWindow {
        self.inner.lock().window
    }

    /// Move the window start address. Silent no-op when the new value is
    /// unchanged or would make the window invalid. Channel data is kept;
    /// the receive loop picks the new window up at the next break.
    pub fn set_start_address(&self, addr: u16) {
        let mut inner = self.inner.lock();
        if addr == inner.window.start() {
            return;
        }
        if let Some(window) = inner.window.with_start(addr) {
            inner.window = window;
        }
    }

    /// Change the window channel count. Silent no-op when unchanged or
    /// invalid. Zero-fills the validated buffer: the stored frame was
    /// assembled for a different window and must not leak through the
    /// resized one.
    pub fn set_channel_count(&self, count: u16) {
        let mut inner = self.inner.lock();
        if count == inner.window.count() {
            return;
        }
        if let Some(window) = inner.window.with_count(count) {
            inner.window = window;
            inner.validated.fill(0);
        }
    }

    /// Bulk copy of all 512 universe channels for the transmit path.
    pub fn snapshot_universe(&self, out: &mut [u8; UNIVERSE_SIZE as usize]) {
        let inner = self.inner.lock();
        out.copy_from_slice(&inner.validated[1..]);
    }
}
