//! DMX512 receive state machine.
//!
//! Pure logic, no hardware dependencies. Consumes UART events (byte
//! payloads, break conditions, line errors), assembles frames into a
//! private scratch buffer and promotes validated frames into the shared
//! [`ChannelStore`]. Fully testable on host.
//!
//! DMX512 has no frame-length field; the break is the only delimiter. The
//! machine must be able to re-synchronize from any state on the next break
//! and must never let an over-long or malformed frame corrupt the window
//! copy, hence the cursor and window bounds guards on every byte.

use crate::blackout::{BlackoutFilter, FrameVerdict};
use crate::health::{HealthMonitor, LinkStats};
use crate::logging::LogStream;
use crate::store::ChannelStore;
use crate::universe::{AddressWindow, FRAME_SLOTS, NULL_START_CODE};
use crate::{rt_error, rt_info, rt_warn};

/// Progress through a single DMX512 frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxState {
    /// No break observed yet, or recovering from an error.
    Idle,
    /// Break observed, awaiting the first byte to classify the start code.
    Break,
    /// Collecting channel bytes.
    Data,
    /// Cursor saturated at 513 slots; remaining bytes ignored until the
    /// next break.
    Done,
}

/// Classified UART line errors. All of them take the same recovery path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UartErrorKind {
    Frame,
    Parity,
    BufferFull,
    FifoOverflow,
    Other,
}

/// One hardware event delivered by the byte-event source, in arrival
/// order.
#[derive(Clone, Copy, Debug)]
pub enum UartEvent<'a> {
    /// Received bytes.
    Data(&'a [u8]),
    /// Break condition detected on the line.
    Break,
    /// Framing/parity/overflow condition.
    Error(UartErrorKind),
}

/// What the driver layer must do after an event was processed.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxAction {
    /// Nothing; keep delivering events.
    Continue,
    /// Discard buffered hardware bytes and queued events (resync).
    FlushInput,
}

/// DMX512 frame assembler.
///
/// Owned by the receive loop; everything except the [`ChannelStore`]
/// behind it is private state and needs no synchronization.
pub struct FrameAssembler<'a> {
    store: &'a ChannelStore,
    health: &'a HealthMonitor,
    stats: &'a LinkStats,
    log: &'a LogStream,

    state: RxState,

    /// Slots received since the last break; 0 is the start code.
    cursor: u16,

    /// Window snapshot taken at the break, so a concurrent window change
    /// applies from the next frame on.
    window: AddressWindow,

    /// Frame under assembly. Never shared; promoted by copy.
    scratch: [u8; FRAME_SLOTS],

    /// AND-accumulated "every byte seen this frame was zero".
    all_zero: bool,

    filter: BlackoutFilter,
}

impl<'a> FrameAssembler<'a> {
    pub fn new(
        store: &'a ChannelStore,
        health: &'a HealthMonitor,
        stats: &'a LinkStats,
        log: &'a LogStream,
    ) -> Self {
        Self {
            window: store.window(),
            store,
            health,
            stats,
            log,
            state: RxState::Idle,
            cursor: 0,
            scratch: [0; FRAME_SLOTS],
            all_zero: true,
            filter: BlackoutFilter::new(),
        }
    }

    /// Feed one hardware event, in arrival order.
    ///
    /// `now_ms` is the current monotonic tick. The returned [`RxAction`]
    /// must be honored by the driver layer before the next event is
    /// delivered.
    pub fn on_event(&mut self, event: UartEvent<'_>, now_ms: i64) -> RxAction {
        match event {
            UartEvent::Break => self.on_break(now_ms),
            UartEvent::Data(bytes) => self.on_data(bytes, now_ms),
            UartEvent::Error(kind) => self.on_error(kind, now_ms),
        }
    }

    /// Current receive state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Reset to idle, dropping any frame in progress.
    ///
    /// Call after an out-of-band window change if the next frame must not
    /// be interpreted against stale progress.
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.cursor = 0;
        self.all_zero = true;
    }

    fn on_break(&mut self, now_ms: i64) -> RxAction {
        match self.state {
            // Normal frame boundary: judge the frame that just ended,
            // then arm for the next one.
            RxState::Data | RxState::Done => {
                self.finish_frame(now_ms);
                self.arm();
                RxAction::FlushInput
            }
            // First break after startup or error recovery; nothing to
            // flush through the filter.
            RxState::Idle => {
                self.arm();
                RxAction::FlushInput
            }
            // Break while already armed: line glitch, start over.
            RxState::Break => {
                self.state = RxState::Idle;
                RxAction::FlushInput
            }
        }
    }

    fn on_data(&mut self, bytes: &[u8], now_ms: i64) -> RxAction {
        if self.state == RxState::Break {
            let Some(&start_code) = bytes.first() else {
                return RxAction::Continue;
            };
            if start_code == NULL_START_CODE {
                self.state = RxState::Data;
                self.cursor = 0;
                // Liveness is stamped on start-code recognition, before
                // the frame is validated.
                self.health.mark(now_ms);
            } else {
                // RDM or other alternate protocol: not DMX data, ignore
                // everything until the next break.
                self.state = RxState::Idle;
                self.stats.count_non_dmx();
                return RxAction::Continue;
            }
        }

        if self.state == RxState::Data {
            for &byte in bytes {
                if self.cursor as usize >= FRAME_SLOTS {
                    self.state = RxState::Done;
                    break;
                }
                self.all_zero &= byte == 0;
                if self.window.contains(self.cursor) {
                    self.scratch[self.window.local_index(self.cursor)] = byte;
                }
                self.cursor += 1;
                if self.cursor as usize == FRAME_SLOTS {
                    self.state = RxState::Done;
                }
            }
        }

        RxAction::Continue
    }

    fn on_error(&mut self, kind: UartErrorKind, now_ms: i64) -> RxAction {
        // Universal recovery path: no retry, no partial salvage.
        self.state = RxState::Idle;
        self.stats.count_uart_error();
        rt_error!(self.log, now_ms, "uart {:?} error, resyncing", kind);
        RxAction::FlushInput
    }

    /// Run the completed scratch frame through the blackout filter and
    /// update the store accordingly.
    fn finish_frame(&mut self, now_ms: i64) {
        match self.filter.on_frame(self.all_zero) {
            FrameVerdict::Promote => {
                self.store.promote(&self.scratch);
                self.stats.count_promoted();
            }
            FrameVerdict::Hold { first } => {
                self.stats.count_zero_frame();
                if first {
                    rt_warn!(self.log, now_ms, "all-zero frame, holding last data");
                }
            }
            FrameVerdict::Blackout => {
                self.store.blackout();
                self.stats.count_zero_frame();
                self.stats.count_blackout();
                rt_info!(self.log, now_ms, "blackout confirmed, buffer zeroed");
            }
        }
    }

    /// Arm for the next frame.
    fn arm(&mut self) {
        self.state = RxState::Break;
        self.cursor = 0;
        self.all_zero = true;
        self.window = self.store.window();
    }
}
