//! # esp32-dmx
//!
//! DMX512 endpoint over a UART peripheral: drive fixtures (output mode)
//! or decode frames from a controller (input mode).
//!
//! ## Architecture
//!
//! The core is hardware-free and host-testable:
//! - [`FrameAssembler`] turns UART events into validated frames
//! - [`ChannelStore`] holds the last validated frame behind one lock;
//!   promotion is a single bounded copy, so readers never see a torn frame
//! - an all-zero frame filter keeps UART sync glitches from wiping a
//!   healthy buffer while still honoring a sustained blackout
//! - [`TransmitGenerator`] emits break / mark-after-break / start code /
//!   512 channel bytes against the [`FrameSink`] seam
//!
//! The `hal` module (espidf targets only) binds this to the ESP-IDF UART
//! driver and FreeRTOS tasks.

#![cfg_attr(not(test), no_std)]

pub mod assembler;
pub mod blackout;
pub mod config;
pub mod endpoint;
pub mod health;
pub mod lock;
pub mod logging;
pub mod store;
pub mod transmit;
pub mod universe;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use assembler::{FrameAssembler, RxAction, RxState, UartErrorKind, UartEvent};
pub use blackout::{BlackoutFilter, FrameVerdict, ZERO_FRAME_BLACKOUT_THRESHOLD};
pub use config::{Direction, EndpointConfig};
pub use endpoint::DmxEndpoint;
pub use health::{HealthMonitor, LinkStats, LinkStatsSnapshot, HEALTHY_TIMEOUT_MS};
pub use logging::LogStream;
pub use store::ChannelStore;
pub use transmit::{FrameSink, TransmitGenerator, BREAK_US, MARK_AFTER_BREAK_US};
pub use universe::{AddressWindow, FRAME_SLOTS, NULL_START_CODE, UNIVERSE_SIZE};
