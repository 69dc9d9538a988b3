//! Module: endpoint
//!
//! Purpose: Public API of the DMX endpoint. One owned, shareable state
//! value replaces the classic static-singleton layout: the store, health
//! monitor, statistics and log ring live here, and the active loop driver
//! (frame assembler or transmit generator) borrows them.
//!
//! All range violations on this surface are silent no-ops or sentinel
//! zero returns; the only visible signal of trouble is `is_healthy()`
//! going false.

use crate::assembler::FrameAssembler;
use crate::config::{Direction, EndpointConfig};
use crate::health::{HealthMonitor, LinkStats, LinkStatsSnapshot};
use crate::logging::LogStream;
use crate::store::ChannelStore;
use crate::transmit::TransmitGenerator;
use crate::universe::AddressWindow;

/// A single DMX512 endpoint, input or output, fixed at creation.
///
/// `Sync`: share it by reference between the loop task and API callers.
pub struct DmxEndpoint {
    store: ChannelStore,
    health: HealthMonitor,
    stats: LinkStats,
    log: LogStream,
    direction: Direction,
}

impl DmxEndpoint {
    /// Initialize an endpoint. Output mode always drives the full
    /// 512-channel universe regardless of the window arguments.
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            store: ChannelStore::new(config.window()),
            health: HealthMonitor::new(),
            stats: LinkStats::new(),
            log: LogStream::new(),
            direction: config.direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Active address window.
    pub fn window(&self) -> AddressWindow {
        self.store.window()
    }

    /// Move the listening window's start address.
    ///
    /// Input mode only; silently ignored in output mode (all channels are
    /// needed to drive the bus) and for invalid or unchanged values. Takes
    /// effect at the next frame boundary.
    pub fn set_start_address(&self, addr: u16) {
        if self.direction == Direction::Output {
            return;
        }
        self.store.set_start_address(addr);
    }

    /// Change the number of channels listened to.
    ///
    /// Input mode only; same silent-rejection rules as
    /// [`set_start_address`](Self::set_start_address). Shrinking or
    /// growing zero-fills the validated buffer.
    pub fn set_channel_count(&self, count: u16) {
        if self.direction == Direction::Output {
            return;
        }
        self.store.set_channel_count(count);
    }

    /// Value of one channel (local index). 0 for out-of-range channels.
    pub fn read(&self, channel: u16) -> u8 {
        self.store.read(channel)
    }

    /// Copy a run of channels into `dst`; silent no-op on range
    /// violations.
    pub fn read_all(&self, dst: &mut [u8], start: u16) {
        self.store.read_all(dst, start);
    }

    /// Set one channel; silent no-op out of range.
    pub fn write(&self, channel: u16, value: u8) {
        self.store.write(channel, value);
    }

    /// Copy a run of channels from `src`; silent no-op on range
    /// violations.
    pub fn write_all(&self, src: &[u8], start: u16) {
        self.store.write_all(src, start);
    }

    /// True while frames keep arriving (input mode liveness heuristic).
    pub fn is_healthy(&self, now_ms: i64) -> bool {
        self.health.is_healthy(now_ms)
    }

    /// Receive-side counters since boot.
    pub fn stats(&self) -> LinkStatsSnapshot {
        self.stats.snapshot()
    }

    /// Log ring for the drain loop.
    pub fn log(&self) -> &LogStream {
        &self.log
    }

    /// The receive loop driver. `None` in output mode.
    pub fn assembler(&self) -> Option<FrameAssembler<'_>> {
        match self.direction {
            Direction::Input => Some(FrameAssembler::new(
                &self.store,
                &self.health,
                &self.stats,
                &self.log,
            )),
            Direction::Output => None,
        }
    }

    /// The transmit loop driver. `None` in input mode.
    pub fn transmitter(&self) -> Option<TransmitGenerator<'_>> {
        match self.direction {
            Direction::Output => Some(TransmitGenerator::new(&self.store)),
            Direction::Input => None,
        }
    }
}
