//! All-zero frame filter.
//!
//! A UART that loses sync on a DMX line tends to decode isolated all-zero
//! frames; a console commanding a real blackout sends them sustained. A
//! single zero frame must therefore never wipe a healthy output buffer.
//! The filter holds stale data until enough consecutive zero frames have
//! been seen to call it a deliberate blackout.

/// Consecutive all-zero frames required before the validated buffer is
/// zeroed.
pub const ZERO_FRAME_BLACKOUT_THRESHOLD: u8 = 12;

/// What to do with a just-completed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameVerdict {
    /// Frame carries data: promote it into the validated buffer.
    Promote,

    /// All-zero frame below the blackout threshold: keep stale data.
    /// `first` is set on the first zero frame of a run, for diagnostics.
    Hold { first: bool },

    /// Threshold reached: zero the validated buffer.
    Blackout,
}

/// Counts consecutive all-zero frames.
///
/// Private to the receive loop; no synchronization needed.
#[derive(Debug, Default)]
pub struct BlackoutFilter {
    zero_frames: u8,
}

impl BlackoutFilter {
    pub const fn new() -> Self {
        Self { zero_frames: 0 }
    }

    /// Judge a completed frame. Called exactly once per frame, with the
    /// AND-accumulated "every byte was zero" flag.
    pub fn on_frame(&mut self, all_zero: bool) -> FrameVerdict {
        if !all_zero {
            self.zero_frames = 0;
            return FrameVerdict::Promote;
        }

        self.zero_frames = self.zero_frames.saturating_add(1);
        if self.zero_frames >= ZERO_FRAME_BLACKOUT_THRESHOLD {
            self.zero_frames = 0;
            FrameVerdict::Blackout
        } else {
            FrameVerdict::Hold { first: self.zero_frames == 1 }
        }
    }

    /// Current run length of all-zero frames.
    pub fn zero_frames(&self) -> u8 {
        self.zero_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_frame_promotes() {
        let mut filter = BlackoutFilter::new();
        assert_eq!(filter.on_frame(false), FrameVerdict::Promote);
        assert_eq!(filter.zero_frames(), 0);
    }

    #[test]
    fn test_blackout_on_twelfth_zero_frame() {
        let mut filter = BlackoutFilter::new();

        for i in 1..ZERO_FRAME_BLACKOUT_THRESHOLD {
            assert_eq!(filter.on_frame(true), FrameVerdict::Hold { first: i == 1 });
        }
        assert_eq!(filter.on_frame(true), FrameVerdict::Blackout);

        // counter restarts after the blackout fires
        assert_eq!(filter.on_frame(true), FrameVerdict::Hold { first: true });
    }

    #[test]
    fn test_isolated_zero_frame_resets() {
        let mut filter = BlackoutFilter::new();

        assert_eq!(filter.on_frame(true), FrameVerdict::Hold { first: true });
        assert_eq!(filter.on_frame(false), FrameVerdict::Promote);
        assert_eq!(filter.zero_frames(), 0);

        // run starts over, still far from the threshold
        assert_eq!(filter.on_frame(true), FrameVerdict::Hold { first: true });
    }
}
