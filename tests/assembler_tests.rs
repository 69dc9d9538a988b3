//! Receive state machine integration tests: full frames fed through the
//! endpoint's assembler, exercising promotion, filtering and recovery.

use esp32_dmx::{
    DmxEndpoint, EndpointConfig, FrameAssembler, UartErrorKind, UartEvent,
    ZERO_FRAME_BLACKOUT_THRESHOLD,
};

/// Arm the machine with the first break of the session.
fn arm(asm: &mut FrameAssembler<'_>) {
    let _ = asm.on_event(UartEvent::Break, 0);
}

/// Feed one frame's payload (start code first) and the closing break
/// that triggers the verdict. The closing break re-arms the machine, so
/// frames can be chained without extra breaks in between.
fn frame(asm: &mut FrameAssembler<'_>, payload: &[u8], now_ms: i64) {
    let _ = asm.on_event(UartEvent::Data(payload), now_ms);
    let _ = asm.on_event(UartEvent::Break, now_ms);
}

fn zero_frame(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

#[test]
fn test_single_frame_promotes_and_health_goes_up() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    assert!(!endpoint.is_healthy(1000));

    arm(&mut asm);
    frame(&mut asm, &[0x00, 11, 22, 33], 1000);

    assert_eq!(endpoint.read(1), 11);
    assert_eq!(endpoint.read(2), 22);
    assert_eq!(endpoint.read(3), 33);
    assert!(endpoint.is_healthy(1000));
    assert_eq!(endpoint.stats().frames_promoted, 1);
}

#[test]
fn test_promotion_happens_exactly_once_per_frame() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &[0x00, 1, 2, 3], 0);
    // stray bytes after the closing break must not re-promote
    let _ = asm.on_event(UartEvent::Data(&[9, 9, 9]), 0);

    assert_eq!(endpoint.stats().frames_promoted, 1);
    assert_eq!(endpoint.read(1), 1);
}

#[test]
fn test_non_zero_start_code_leaves_buffer_unchanged() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &[0x00, 5, 6, 7], 0);

    // RDM-style frame: discarded, previous data stays
    frame(&mut asm, &[0x17, 99, 99, 99], 0);

    assert_eq!(endpoint.read(1), 5);
    assert_eq!(endpoint.read(2), 6);
    assert_eq!(endpoint.stats().non_dmx_frames, 1);
    assert_eq!(endpoint.stats().frames_promoted, 1);
}

#[test]
fn test_window_restricts_promotion() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(10, 2));
    let mut asm = endpoint.assembler().unwrap();

    // universe channels 1..=11 carry their own number
    let mut payload = vec![0x00];
    payload.extend(1..=11u8);
    arm(&mut asm);
    frame(&mut asm, &payload, 0);

    // local 1..=2 map to universe channels 10..=11
    assert_eq!(endpoint.read(1), 10);
    assert_eq!(endpoint.read(2), 11);
    assert_eq!(endpoint.read(3), 0);
}

#[test]
fn test_eleven_zero_frames_hold_twelfth_blacks_out() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &[0x00, 200, 201, 202], 0);
    assert_eq!(endpoint.read(1), 200);

    let zeros = zero_frame(64);
    for i in 0..ZERO_FRAME_BLACKOUT_THRESHOLD - 1 {
        frame(&mut asm, &zeros, 0);
        assert_eq!(
            endpoint.read(1),
            200,
            "stale data must persist at zero frame {}",
            i + 1
        );
    }

    // the 12th consecutive all-zero frame wipes the buffer
    frame(&mut asm, &zeros, 0);
    assert_eq!(endpoint.read(1), 0);
    assert_eq!(endpoint.read(2), 0);
    assert_eq!(endpoint.stats().blackouts, 1);
}

#[test]
fn test_isolated_zero_frame_does_not_black_out() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &[0x00, 50, 51], 0);
    frame(&mut asm, &zero_frame(16), 0);
    assert_eq!(endpoint.read(1), 50);

    // a non-zero frame resets the run; another 11 zero frames stay
    // below the threshold
    frame(&mut asm, &[0x00, 60, 61], 0);
    assert_eq!(endpoint.read(1), 60);

    for _ in 0..ZERO_FRAME_BLACKOUT_THRESHOLD - 1 {
        frame(&mut asm, &zero_frame(16), 0);
    }
    assert_eq!(endpoint.read(1), 60);
    assert_eq!(endpoint.stats().blackouts, 0);
}

#[test]
fn test_error_then_resync_on_next_break() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    let _ = asm.on_event(UartEvent::Break, 0);
    let _ = asm.on_event(UartEvent::Data(&[0x00, 1, 2]), 0);
    let _ = asm.on_event(UartEvent::Error(UartErrorKind::Frame), 0);

    // interrupted frame discarded
    let _ = asm.on_event(UartEvent::Break, 0);
    assert_eq!(endpoint.read(1), 0);

    // machine is live again: next frame promotes normally
    let _ = asm.on_event(UartEvent::Data(&[0x00, 77]), 0);
    let _ = asm.on_event(UartEvent::Break, 0);
    assert_eq!(endpoint.read(1), 77);
    assert_eq!(endpoint.stats().uart_errors, 1);
}

#[test]
fn test_data_split_across_events() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    // the driver may deliver a frame in arbitrary chunks
    let _ = asm.on_event(UartEvent::Break, 0);
    let _ = asm.on_event(UartEvent::Data(&[0x00, 1]), 0);
    let _ = asm.on_event(UartEvent::Data(&[2, 3]), 0);
    let _ = asm.on_event(UartEvent::Data(&[4]), 0);
    let _ = asm.on_event(UartEvent::Break, 0);

    assert_eq!(endpoint.read(1), 1);
    assert_eq!(endpoint.read(4), 4);
}

#[test]
fn test_health_timestamp_survives_zero_filtering() {
    // liveness is stamped at start-code recognition, so a frame that is
    // later held as all-zero still refreshes health
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &zero_frame(32), 2000);
    assert_eq!(endpoint.stats().frames_promoted, 0);
    assert!(endpoint.is_healthy(2100));
}

#[test]
fn test_channel_count_change_applies_next_frame() {
    let endpoint = DmxEndpoint::new(EndpointConfig::input(1, 512));
    let mut asm = endpoint.assembler().unwrap();

    arm(&mut asm);
    frame(&mut asm, &[0x00, 1, 2, 3, 4], 0);
    assert_eq!(endpoint.read(4), 4);

    // shrink zero-fills immediately; reads beyond the new count return 0
    endpoint.set_channel_count(2);
    assert_eq!(endpoint.read(3), 0);
    assert_eq!(endpoint.read(4), 0);

    frame(&mut asm, &[0x00, 7, 8, 9, 10], 0);
    assert_eq!(endpoint.read(1), 7);
    assert_eq!(endpoint.read(2), 8);
    assert_eq!(endpoint.read(3), 0);
}
