//! Hardware binding for the DMX endpoint.
//!
//! Thin wrappers around the ESP-IDF UART driver. Framing logic stays in
//! the core modules, this layer is just I/O.

pub mod uart;

pub use uart::{DmxUart, DmxUartConfig, EspFrameSink};
