//! Transmit path integration tests: output endpoint driving a mock sink.

use esp32_dmx::{
    DmxEndpoint, EndpointConfig, FrameSink, BREAK_US, MARK_AFTER_BREAK_US, NULL_START_CODE,
};

#[derive(Debug, PartialEq, Eq)]
enum SinkOp {
    WaitTxDone,
    Break(bool),
    DelayUs(u32),
    Write(Vec<u8>),
}

#[derive(Default)]
struct RecordingSink {
    ops: Vec<SinkOp>,
}

impl FrameSink for RecordingSink {
    type Error = ();

    fn wait_tx_done(&mut self) -> Result<(), ()> {
        self.ops.push(SinkOp::WaitTxDone);
        Ok(())
    }

    fn set_break(&mut self, active: bool) -> Result<(), ()> {
        self.ops.push(SinkOp::Break(active));
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.ops.push(SinkOp::DelayUs(us));
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.ops.push(SinkOp::Write(bytes.to_vec()));
        Ok(())
    }
}

fn channel_bytes(ops: &[SinkOp]) -> &[u8] {
    match ops.last() {
        Some(SinkOp::Write(bytes)) => bytes,
        other => panic!("expected trailing channel write, got {:?}", other),
    }
}

#[test]
fn test_endpoint_frame_reflects_written_channels() {
    let endpoint = DmxEndpoint::new(EndpointConfig::output());
    endpoint.write(1, 0x10);
    endpoint.write(100, 0x64);
    endpoint.write(512, 0xFF);

    let tx = endpoint.transmitter().unwrap();
    let mut sink = RecordingSink::default();
    tx.send_frame(&mut sink).unwrap();

    let channels = channel_bytes(&sink.ops);
    assert_eq!(channels.len(), 512);
    assert_eq!(channels[0], 0x10);
    assert_eq!(channels[99], 0x64);
    assert_eq!(channels[511], 0xFF);
    // untouched channels stay zero
    assert_eq!(channels[1], 0);
}

#[test]
fn test_frame_preamble_shape() {
    let endpoint = DmxEndpoint::new(EndpointConfig::output());
    let tx = endpoint.transmitter().unwrap();
    let mut sink = RecordingSink::default();
    tx.send_frame(&mut sink).unwrap();

    assert_eq!(
        &sink.ops[..6],
        &[
            SinkOp::WaitTxDone,
            SinkOp::Break(true),
            SinkOp::DelayUs(BREAK_US),
            SinkOp::Break(false),
            SinkOp::DelayUs(MARK_AFTER_BREAK_US),
            SinkOp::Write(vec![NULL_START_CODE]),
        ]
    );
    assert_eq!(sink.ops.len(), 7);
}

#[test]
fn test_consecutive_frames_pick_up_changes() {
    let endpoint = DmxEndpoint::new(EndpointConfig::output());
    let tx = endpoint.transmitter().unwrap();

    endpoint.write(10, 1);
    let mut sink = RecordingSink::default();
    tx.send_frame(&mut sink).unwrap();
    assert_eq!(channel_bytes(&sink.ops)[9], 1);

    // a write between frames shows up in the next one
    endpoint.write(10, 200);
    let mut sink = RecordingSink::default();
    tx.send_frame(&mut sink).unwrap();
    assert_eq!(channel_bytes(&sink.ops)[9], 200);
}

#[test]
fn test_bulk_write_feeds_frame() {
    let endpoint = DmxEndpoint::new(EndpointConfig::output());
    let scene: Vec<u8> = (0u8..64).map(|i| i * 2).collect();
    endpoint.write_all(&scene, 1);

    let tx = endpoint.transmitter().unwrap();
    let mut sink = RecordingSink::default();
    tx.send_frame(&mut sink).unwrap();

    assert_eq!(&channel_bytes(&sink.ops)[..64], scene.as_slice());
}
