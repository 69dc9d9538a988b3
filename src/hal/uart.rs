//! ESP-IDF UART binding for the DMX bus.
//!
//! Configures the UART for the DMX512 physical layer (250 kbaud, 8 data
//! bits, no parity, 2 stop bits), installs the driver with an event
//! queue, and adapts both directions:
//! - receive: FreeRTOS queue events → [`UartEvent`] for the
//!   [`FrameAssembler`](crate::FrameAssembler)
//! - transmit: [`FrameSink`] over raw writes plus TXD line inversion for
//!   the break pulse

use core::ffi::c_void;

use esp_idf_svc::sys::{
    esp, esp_timer_get_time, ets_delay_us, gpio_reset_pin, gpio_set_direction, gpio_set_level,
    uart_config_t, uart_driver_install, uart_event_t, uart_flush_input, uart_param_config,
    uart_read_bytes, uart_set_line_inverse, uart_set_pin, uart_wait_tx_done, uart_write_bytes,
    xQueueGenericReset, xQueueReceive, EspError, QueueHandle_t, ESP_FAIL,
};
use esp_idf_svc::sys::{
    gpio_mode_t_GPIO_MODE_OUTPUT, uart_event_type_t_UART_BREAK, uart_event_type_t_UART_BUFFER_FULL,
    uart_event_type_t_UART_DATA, uart_event_type_t_UART_FIFO_OVF,
    uart_event_type_t_UART_FRAME_ERR, uart_event_type_t_UART_PARITY_ERR,
    uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE, uart_parity_t_UART_PARITY_DISABLE,
    uart_sclk_t_UART_SCLK_REF_TICK, uart_signal_inv_t_UART_SIGNAL_INV_DISABLE,
    uart_signal_inv_t_UART_SIGNAL_TXD_INV, uart_stop_bits_t_UART_STOP_BITS_2,
    uart_word_length_t_UART_DATA_8_BITS, UART_PIN_NO_CHANGE,
};

use crate::assembler::{FrameAssembler, RxAction, UartErrorKind, UartEvent};
use crate::logging::LogStream;
use crate::transmit::FrameSink;
use crate::universe::FRAME_SLOTS;
use crate::rt_info;

/// DMX512 line rate.
const DMX_BAUD_RATE: i32 = 250_000;

/// Driver ring sizes; one frame is 513 bytes, keep two.
const DRIVER_BUF_SIZE: i32 = 2 * FRAME_SLOTS as i32;

/// Depth of the UART event queue.
const EVENT_QUEUE_LEN: i32 = 20;

/// Pin assignment for one DMX endpoint.
///
/// `dir_pin` drives a half-duplex transceiver's DE/RE input; leave `None`
/// when the board wires the direction in hardware.
pub struct DmxUartConfig {
    pub uart_num: i32,
    pub tx_pin: i32,
    pub rx_pin: i32,
    pub dir_pin: Option<i32>,
}

impl Default for DmxUartConfig {
    fn default() -> Self {
        Self {
            uart_num: 2,
            tx_pin: 14,
            rx_pin: 27,
            dir_pin: None,
        }
    }
}

/// Installed UART driver handle plus its event queue.
pub struct DmxUart {
    port: i32,
    queue: QueueHandle_t,
}

impl DmxUart {
    /// Configure the UART for DMX512 and install the driver.
    ///
    /// `tx_enable` sets the direction pin level: high to drive the bus,
    /// low to listen.
    pub fn install(config: &DmxUartConfig, tx_enable: bool) -> Result<Self, EspError> {
        let uart_config = uart_config_t {
            baud_rate: DMX_BAUD_RATE,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_2,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            // REF_TICK holds the baud rate stable across DFS
            source_clk: uart_sclk_t_UART_SCLK_REF_TICK,
            ..Default::default()
        };

        unsafe {
            esp!(uart_param_config(config.uart_num, &uart_config))?;
            esp!(uart_set_pin(
                config.uart_num,
                config.tx_pin,
                config.rx_pin,
                UART_PIN_NO_CHANGE,
                UART_PIN_NO_CHANGE,
            ))?;
        }

        let mut queue: QueueHandle_t = core::ptr::null_mut();
        unsafe {
            esp!(uart_driver_install(
                config.uart_num,
                DRIVER_BUF_SIZE,
                DRIVER_BUF_SIZE,
                EVENT_QUEUE_LEN,
                &mut queue,
                0,
            ))?;
        }

        if let Some(pin) = config.dir_pin {
            unsafe {
                esp!(gpio_reset_pin(pin))?;
                esp!(gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT))?;
                esp!(gpio_set_level(pin, tx_enable as u32))?;
            }
        }

        Ok(Self {
            port: config.uart_num,
            queue,
        })
    }

    /// Monotonic millisecond tick for health/log timestamps.
    pub fn now_ms() -> i64 {
        unsafe { esp_timer_get_time() / 1000 }
    }

    /// Discard buffered hardware bytes and queued events (resync after a
    /// break or error).
    pub fn flush_and_reset(&self) {
        unsafe {
            uart_flush_input(self.port);
            xQueueGenericReset(self.queue, 0);
        }
    }

    /// Event loop for input mode. Blocks on the driver queue forever.
    pub fn run_receive_loop(&self, mut assembler: FrameAssembler<'_>, log: &LogStream) -> ! {
        let mut buf = [0u8; FRAME_SLOTS];

        rt_info!(log, Self::now_ms(), "dmx rx task started");

        loop {
            let mut event = uart_event_t::default();
            let received = unsafe {
                xQueueReceive(
                    self.queue,
                    &mut event as *mut uart_event_t as *mut c_void,
                    esp_idf_svc::sys::portMAX_DELAY,
                )
            };
            if received == 0 {
                continue;
            }

            let now_ms = Self::now_ms();
            let action = match event.type_ {
                t if t == uart_event_type_t_UART_DATA => {
                    self.drain_data(&mut assembler, &mut buf, event.size, now_ms)
                }
                t if t == uart_event_type_t_UART_BREAK => {
                    assembler.on_event(UartEvent::Break, now_ms)
                }
                t if t == uart_event_type_t_UART_FRAME_ERR => {
                    assembler.on_event(UartEvent::Error(UartErrorKind::Frame), now_ms)
                }
                t if t == uart_event_type_t_UART_PARITY_ERR => {
                    assembler.on_event(UartEvent::Error(UartErrorKind::Parity), now_ms)
                }
                t if t == uart_event_type_t_UART_BUFFER_FULL => {
                    assembler.on_event(UartEvent::Error(UartErrorKind::BufferFull), now_ms)
                }
                t if t == uart_event_type_t_UART_FIFO_OVF => {
                    assembler.on_event(UartEvent::Error(UartErrorKind::FifoOverflow), now_ms)
                }
                _ => assembler.on_event(UartEvent::Error(UartErrorKind::Other), now_ms),
            };

            if action == RxAction::FlushInput {
                self.flush_and_reset();
            }
        }
    }

    /// Read the bytes a `UART_DATA` event announced and feed them to the
    /// assembler, chunked by the local buffer.
    fn drain_data(
        &self,
        assembler: &mut FrameAssembler<'_>,
        buf: &mut [u8; FRAME_SLOTS],
        mut remaining: usize,
        now_ms: i64,
    ) -> RxAction {
        let mut action = RxAction::Continue;

        while remaining > 0 {
            let chunk = remaining.min(buf.len());
            let read = unsafe {
                uart_read_bytes(
                    self.port,
                    buf.as_mut_ptr() as *mut c_void,
                    chunk as u32,
                    esp_idf_svc::sys::portMAX_DELAY,
                )
            };
            if read <= 0 {
                break;
            }
            action = assembler.on_event(UartEvent::Data(&buf[..read as usize]), now_ms);
            remaining -= read as usize;
        }

        action
    }

    /// The transmit side of this UART.
    pub fn frame_sink(&self) -> EspFrameSink {
        EspFrameSink { port: self.port }
    }
}

// SAFETY: The driver API is thread-safe per port; the queue handle is
// only touched by the single receive task.
unsafe impl Send for DmxUart {}
unsafe impl Sync for DmxUart {}

/// [`FrameSink`] over the installed driver: raw writes plus TXD line
/// inversion for the break pulse.
pub struct EspFrameSink {
    port: i32,
}

impl FrameSink for EspFrameSink {
    type Error = EspError;

    fn wait_tx_done(&mut self) -> Result<(), EspError> {
        unsafe { esp!(uart_wait_tx_done(self.port, 1000)) }
    }

    fn set_break(&mut self, active: bool) -> Result<(), EspError> {
        let inverse = if active {
            uart_signal_inv_t_UART_SIGNAL_TXD_INV
        } else {
            uart_signal_inv_t_UART_SIGNAL_INV_DISABLE
        };
        unsafe { esp!(uart_set_line_inverse(self.port, inverse)) }
    }

    fn delay_us(&mut self, us: u32) {
        // busy-wait; yielding here would stretch the break pulse
        unsafe { ets_delay_us(us) }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), EspError> {
        let written = unsafe {
            uart_write_bytes(self.port, bytes.as_ptr() as *const c_void, bytes.len())
        };
        if written < 0 {
            return Err(EspError::from_infallible::<ESP_FAIL>());
        }
        Ok(())
    }
}
