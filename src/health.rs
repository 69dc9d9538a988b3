//! Module: health
//!
//! Purpose: Signal liveness and link statistics.
//!
//! `HealthMonitor` answers "has a DMX frame been seen recently". This is
//! a liveness heuristic, not a validity check: the timestamp is taken when
//! a null start code is recognized, so a frame that is later filtered as
//! all-zero still counts as signal.
//!
//! Safety: RT-safe. All access via atomics, no locks.

use core::sync::atomic::{AtomicI64, AtomicU32, Ordering};

/// Signal considered lost after this many milliseconds without a frame.
pub const HEALTHY_TIMEOUT_MS: i64 = 500;

/// Tracks the tick of the last recognized DMX frame.
pub struct HealthMonitor {
    last_frame_ms: AtomicI64,
}

impl HealthMonitor {
    /// Create a monitor that has never seen a frame.
    pub const fn new() -> Self {
        Self {
            // i64::MIN / 2 keeps `now - last` from overflowing while
            // still failing the freshness check for any realistic tick
            last_frame_ms: AtomicI64::new(i64::MIN / 2),
        }
    }

    /// Record a frame at the given tick.
    #[inline]
    pub fn mark(&self, now_ms: i64) {
        self.last_frame_ms.store(now_ms, Ordering::Release);
    }

    /// True when the last frame is fresher than [`HEALTHY_TIMEOUT_MS`].
    #[inline]
    pub fn is_healthy(&self, now_ms: i64) -> bool {
        now_ms - self.last_frame_ms.load(Ordering::Acquire) < HEALTHY_TIMEOUT_MS
    }

    /// Tick of the last recognized frame.
    #[inline]
    pub fn last_frame_ms(&self) -> i64 {
        self.last_frame_ms.load(Ordering::Acquire)
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Atomic counters describing what the receive loop has seen since boot.
///
/// Never cleared; diagnostics read a snapshot at leisure.
pub struct LinkStats {
    frames_promoted: AtomicU32,
    zero_frames: AtomicU32,
    blackouts: AtomicU32,
    non_dmx_frames: AtomicU32,
    uart_errors: AtomicU32,
}

impl LinkStats {
    pub const fn new() -> Self {
        Self {
            frames_promoted: AtomicU32::new(0),
            zero_frames: AtomicU32::new(0),
            blackouts: AtomicU32::new(0),
            non_dmx_frames: AtomicU32::new(0),
            uart_errors: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn count_promoted(&self) {
        self.frames_promoted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count_zero_frame(&self) {
        self.zero_frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count_blackout(&self) {
        self.blackouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count_non_dmx(&self) {
        self.non_dmx_frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count_uart_error(&self) {
        self.uart_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough snapshot for diagnostics output.
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            frames_promoted: self.frames_promoted.load(Ordering::Relaxed),
            zero_frames: self.zero_frames.load(Ordering::Relaxed),
            blackouts: self.blackouts.load(Ordering::Relaxed),
            non_dmx_frames: self.non_dmx_frames.load(Ordering::Relaxed),
            uart_errors: self.uart_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for LinkStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkStatsSnapshot {
    pub frames_promoted: u32,
    pub zero_frames: u32,
    pub blackouts: u32,
    pub non_dmx_frames: u32,
    pub uart_errors: u32,
}
