//! esp32-dmx - Main entry point
//!
//! Initializes the endpoint for the direction this image was built for,
//! installs the UART driver, pins the receive or transmit loop to a core
//! and idles draining the log ring to the console.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
#[allow(static_mut_refs)]
mod firmware {
    use core::ffi::{c_char, c_void};

    use esp_idf_svc::sys as esp_idf_sys;

    use esp32_dmx::hal::{DmxUart, DmxUartConfig};
    use esp32_dmx::logging::format_entry;
    use esp32_dmx::{Direction, DmxEndpoint, EndpointConfig};

    /// Which side of the bus this image is. Flip to `Output` to drive
    /// fixtures from the channel store.
    const DIRECTION: Direction = Direction::Input;

    /// Core the rx/tx loop is pinned to.
    const DMX_CORE: i32 = 1;

    // Static allocations, initialized once in main before any task runs
    static mut ENDPOINT: Option<DmxEndpoint> = None;
    static mut UART: Option<DmxUart> = None;

    fn endpoint() -> &'static DmxEndpoint {
        // SAFETY: written once in main before the loop task is spawned
        unsafe { ENDPOINT.as_ref().expect("endpoint not initialized") }
    }

    fn uart() -> &'static DmxUart {
        // SAFETY: written once in main before the loop task is spawned
        unsafe { UART.as_ref().expect("uart not initialized") }
    }

    #[no_mangle]
    fn main() {
        // Initialize ESP-IDF
        esp_idf_sys::link_patches();

        let config = match DIRECTION {
            Direction::Input => EndpointConfig::input(1, 512),
            Direction::Output => EndpointConfig::output(),
        };
        let drive_bus = matches!(DIRECTION, Direction::Output);

        unsafe {
            ENDPOINT = Some(DmxEndpoint::new(config));
            UART = Some(
                DmxUart::install(&DmxUartConfig::default(), drive_bus)
                    .expect("uart install failed"),
            );
        }

        let (task, name): (extern "C" fn(*mut c_void), &[u8]) = match DIRECTION {
            Direction::Input => (rx_task, b"dmx_rx\0"),
            Direction::Output => (tx_task, b"dmx_tx\0"),
        };

        unsafe {
            esp_idf_sys::xTaskCreatePinnedToCore(
                Some(task as unsafe extern "C" fn(*mut c_void)),
                name.as_ptr() as *const c_char,
                4096,
                core::ptr::null_mut(),
                1,
                core::ptr::null_mut(),
                DMX_CORE,
            );
        }

        // Idle loop: drain RT logs to the console
        loop {
            while let Some(entry) = endpoint().log().drain() {
                let mut line = [0u8; 160];
                let len = format_entry(&entry, &mut line);
                unsafe {
                    esp_idf_sys::printf(
                        b"%.*s\0".as_ptr() as *const c_char,
                        len as i32,
                        line.as_ptr(),
                    );
                }
            }
            unsafe {
                esp_idf_sys::vTaskDelay(100);
            }
        }
    }

    /// Receive loop task (input mode).
    extern "C" fn rx_task(_: *mut c_void) {
        let endpoint = endpoint();
        let assembler = endpoint.assembler().expect("input endpoint");
        uart().run_receive_loop(assembler, endpoint.log());
    }

    /// Transmit loop task (output mode).
    extern "C" fn tx_task(_: *mut c_void) {
        let endpoint = endpoint();
        let generator = endpoint.transmitter().expect("output endpoint");
        let mut sink = uart().frame_sink();
        generator.run(&mut sink);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    // Firmware entry point only exists for espidf targets; nothing to do
    // on the host.
}
