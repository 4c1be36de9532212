//! Integration tests for the bridge lifecycle.
//!
//! These drive the public API end to end with scripted controllers:
//! initialize → channel frames → poll thread → update ticks → shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use wiimote_bridge::{BridgeConfig, BridgeError, RecordingSink, SessionRegistry, INPUT_FRAME_LEN};
use wiimote_transport::mock::{MockDiscovery, MockWiimote};

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

fn start(mock: &MockWiimote) -> (SessionRegistry, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let mut bridge = SessionRegistry::new(BridgeConfig::default(), sink.clone());
    let count = bridge
        .initialize(&MockDiscovery::new(vec![mock.clone()]))
        .unwrap();
    assert_eq!(count, 1);
    (bridge, sink)
}

/// Tick until the sink has `n` frames or time runs out
fn tick_until(bridge: &SessionRegistry, sink: &RecordingSink, n: usize) -> bool {
    wait_for(|| {
        bridge.update();
        sink.len() >= n
    })
}

// ── Ordering ──

#[test]
fn status_and_ack_reach_host_in_order() {
    let mock = MockWiimote::default();
    let (bridge, sink) = start(&mock);

    // Host asks for status, then requests a reporting mode
    bridge.control_channel(0x41, &[0xA2, 0x15, 0x00]).unwrap();
    bridge.control_channel(0x41, &[0xA2, 0x12, 0x00, 0x30]).unwrap();
    assert!(wait_for(|| mock.writes().len() == 2));
    assert_eq!(mock.writes(), vec![vec![0x15, 0x00], vec![0x12, 0x00, 0x30]]);

    mock.push_report(&[0x20, 0x00, 0x00, 0x02, 0x00, 0x00, 0xC0]);
    mock.push_report(&[0x22, 0x00, 0x00, 0x12, 0x00]);
    assert!(wait_for(|| mock.pending_reads() == 0));
    // Give the poll thread time to buffer the last report it read
    assert!(wait_for(|| bridge.sessions()[0].pending_events() == 2));

    assert_eq!(bridge.update(), 1);
    assert_eq!(bridge.update(), 1);
    assert_eq!(bridge.update(), 0);

    let frames = sink.take();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].1[..2], [0xA1, 0x20]);
    assert_eq!(frames[1].1[..2], [0xA1, 0x22]);
    assert!(frames.iter().all(|(ch, f)| *ch == 0x41 && f.len() == INPUT_FRAME_LEN));
}

#[test]
fn continuous_reports_coalesce_between_ticks() {
    let mock = MockWiimote::default();
    let (bridge, sink) = start(&mock);
    bridge.interrupt_channel(0x42, &[0xA2, 0x12, 0x04, 0x31]).unwrap();

    mock.push_report(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x01]);
    mock.push_report(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x02]);
    mock.push_report(&[0x31, 0x00, 0x00, 0x80, 0x80, 0x03]);
    assert!(wait_for(|| mock.pending_reads() == 0));
    assert!(wait_for(|| bridge
        .sessions()[0]
        .stats()
        .reports_read
        == 3));

    assert_eq!(bridge.update(), 1);
    let frames = sink.take();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].1[6], 0x03);
}

#[test]
fn event_preempts_continuous_for_one_tick() {
    let mock = MockWiimote::default();
    let (bridge, sink) = start(&mock);
    bridge.control_channel(0x43, &[0xA2, 0x15, 0x00]).unwrap();

    mock.push_report(&[0x30, 0x00, 0x00]);
    assert!(tick_until(&bridge, &sink, 1));
    assert_eq!(sink.take()[0].1[1], 0x30);

    mock.push_report(&[0x20, 0x00, 0x00, 0x00]);
    assert!(wait_for(|| bridge.sessions()[0].pending_events() == 1));
    assert_eq!(bridge.update(), 1);
    assert_eq!(bridge.update(), 1);

    let frames = sink.take();
    assert_eq!(frames[0].1[1], 0x20);
    assert_eq!(frames[1].1[1], 0x30);
}

// ── Channel gating ──

#[test]
fn nothing_delivered_before_a_channel_exists() {
    let mock = MockWiimote::default();
    let (bridge, sink) = start(&mock);

    mock.push_report(&[0x20, 0x00, 0x00, 0x01]);
    assert!(wait_for(|| bridge.sessions()[0].stats().reports_discarded == 1));
    assert_eq!(bridge.update(), 0);

    bridge.control_channel(5, &[0xA2, 0x15, 0x00]).unwrap();
    assert_eq!(bridge.update(), 0);

    mock.push_report(&[0x20, 0x00, 0x00, 0x02]);
    assert!(tick_until(&bridge, &sink, 1));
    let frames = sink.take();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].0, 5);
    assert_eq!(frames[0].1[4], 0x02);
}

// ── Lifecycle ──

#[test]
fn empty_bridge_is_inert() {
    let sink = Arc::new(RecordingSink::new());
    let mut bridge = SessionRegistry::new(BridgeConfig::default(), sink.clone());
    assert_eq!(bridge.initialize(&MockDiscovery::empty()).unwrap(), 0);
    assert!(!bridge.is_active());

    assert_eq!(bridge.update(), 0);
    assert!(matches!(
        bridge.interrupt_channel(1, &[0xA2, 0x11, 0x10]),
        Err(BridgeError::NoDevice)
    ));
    assert!(sink.is_empty());
    bridge.shutdown();
}

#[test]
fn shutdown_stops_all_device_io() {
    let mock = MockWiimote::default();
    let (mut bridge, _sink) = start(&mock);
    bridge.control_channel(1, &[0xA2, 0x15, 0x00]).unwrap();
    assert!(wait_for(|| mock.read_calls() > 5));

    bridge.shutdown();
    let calls = mock.io_calls();
    std::thread::sleep(Duration::from_millis(25));
    assert_eq!(mock.io_calls(), calls);
}

#[test]
fn dropping_the_bridge_shuts_it_down() {
    let mock = MockWiimote::default();
    let (bridge, _sink) = start(&mock);
    assert!(wait_for(|| mock.read_calls() > 0));

    drop(bridge);
    let calls = mock.io_calls();
    std::thread::sleep(Duration::from_millis(25));
    assert_eq!(mock.io_calls(), calls);
}

#[test]
fn reinitialize_after_shutdown() {
    let mock = MockWiimote::default();
    let (mut bridge, _sink) = start(&mock);
    bridge.shutdown();

    let count = bridge
        .initialize(&MockDiscovery::new(vec![mock.clone()]))
        .unwrap();
    assert_eq!(count, 1);
    assert!(bridge.is_active());
}
