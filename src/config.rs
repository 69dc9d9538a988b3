//! Endpoint configuration.

use crate::universe::AddressWindow;

/// Which side of the DMX bus this endpoint is.
///
/// Fixed at initialization; flipping requires tearing the endpoint down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Listen to the bus and decode frames into the channel store.
    Input,
    /// Drive the bus from the channel store.
    Output,
}

/// Initialization parameters for a [`DmxEndpoint`](crate::DmxEndpoint).
///
/// In output mode the full 512-channel universe is always driven and the
/// window fields are ignored.
#[derive(Clone, Copy, Debug)]
pub struct EndpointConfig {
    pub direction: Direction,

    /// First universe address to listen to (input mode).
    pub start_address: u16,

    /// Number of channels to listen to (input mode).
    pub channel_count: u16,
}

impl EndpointConfig {
    /// Input endpoint listening to the given window.
    pub const fn input(start_address: u16, channel_count: u16) -> Self {
        Self {
            direction: Direction::Input,
            start_address,
            channel_count,
        }
    }

    /// Output endpoint driving the full universe.
    pub const fn output() -> Self {
        Self {
            direction: Direction::Output,
            start_address: 1,
            channel_count: 512,
        }
    }

    /// Resolve the effective address window.
    ///
    /// Output mode forces the full universe. Invalid input windows fall
    /// back to the full universe as well, matching the API's "reject
    /// silently, keep running" posture.
    pub fn window(&self) -> AddressWindow {
        match self.direction {
            Direction::Output => AddressWindow::full(),
            Direction::Input => AddressWindow::new(self.start_address, self.channel_count)
                .unwrap_or_else(AddressWindow::full),
        }
    }
}

impl Default for EndpointConfig {
    /// Input mode, full universe.
    fn default() -> Self {
        Self::input(1, 512)
    }
}
