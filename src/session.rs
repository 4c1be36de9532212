//! Per-controller session
//!
//! A session sits between one physical Wii Remote and the host. The poll
//! thread calls [`DeviceSession::read_and_classify`], the host thread calls
//! [`DeviceSession::send_data`] and [`DeviceSession::update`]. Buffers and
//! the reply channel live behind one lock; device I/O happens outside it.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use wiimote_transport::protocol::{hid, input};
use wiimote_transport::{BoxedDevice, DeviceInfo, Leds, Payload, MAX_PAYLOAD};

use crate::error::BridgeError;
use crate::frame::{self, HidHeader};
use crate::host::InputSink;
use crate::queue::{ReportClass, ReportQueues};

/// Consecutive read failures between repeated warnings
const READ_ERROR_WARN_INTERVAL: u64 = 500;

/// Channel value meaning "no destination"
pub const NO_CHANNEL: u16 = 0;

struct SessionState {
    /// Reply destination, last sender wins
    channel_id: u16,
    queues: ReportQueues,
}

/// Counters for diagnostics
#[derive(Debug, Default)]
struct Counters {
    reports_read: AtomicU64,
    reports_discarded: AtomicU64,
    frames_delivered: AtomicU64,
    writes: AtomicU64,
    io_errors: AtomicU64,
    consecutive_read_errors: AtomicU64,
}

/// Snapshot of a session's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub reports_read: u64,
    pub reports_discarded: u64,
    pub frames_delivered: u64,
    pub writes: u64,
    pub io_errors: u64,
}

/// One controller and its buffers
pub struct DeviceSession {
    /// 1-based, for log messages only
    index: u8,
    device: BoxedDevice,
    state: Mutex<SessionState>,
    counters: Counters,
}

impl DeviceSession {
    /// Take ownership of an opened controller and light its indicator
    ///
    /// A failed indicator write is logged and otherwise ignored.
    pub fn new(index: u8, device: BoxedDevice, indicator: Leds) -> Self {
        if let Err(e) = device.set_indicator(indicator) {
            warn!("Wiimote {}: failed to set LEDs {}: {}", index, indicator, e);
        }

        debug!(
            "Wiimote {}: session for {} ({})",
            index,
            device.device_info().display_name(),
            device.device_info().device_path
        );

        Self {
            index,
            device,
            state: Mutex::new(SessionState {
                channel_id: NO_CHANNEL,
                queues: ReportQueues::new(),
            }),
            counters: Counters::default(),
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn device_info(&self) -> &DeviceInfo {
        self.device.device_info()
    }

    /// Current reply channel (0 = none)
    pub fn channel_id(&self) -> u16 {
        self.state.lock().channel_id
    }

    /// Queue a host frame for the controller
    ///
    /// `data` is the frame as the host sends it: a transaction header byte
    /// followed by the output report. The header is stripped. `channel_id`
    /// becomes the destination for all following input reports.
    pub fn send_data(&self, channel_id: u16, data: &[u8]) -> Result<(), BridgeError> {
        let report = match data.split_first() {
            Some((_, report)) if !report.is_empty() => report,
            _ => return Err(BridgeError::EmptyPayload),
        };
        if report.len() > MAX_PAYLOAD {
            return Err(BridgeError::PayloadTooLarge { size: report.len() });
        }

        if data[0] != hid::DATA_OUTPUT {
            let header = HidHeader::from_byte(data[0]);
            trace!(
                "Wiimote {}: unexpected header type 0x{:X} param 0x{:X}",
                self.index,
                header.kind,
                header.param
            );
        }

        let mut state = self.state.lock();
        if state.channel_id != channel_id {
            debug!(
                "Wiimote {}: reply channel 0x{:04X} -> 0x{:04X}",
                self.index, state.channel_id, channel_id
            );
        }
        state.channel_id = channel_id;
        state.queues.push_write(Payload::from_slice(report));
        Ok(())
    }

    /// One poll cycle: drain one write, read one report, buffer it
    ///
    /// Returns the class the report was buffered as, or `None` when nothing
    /// was read or the report was discarded for lack of a channel.
    pub fn read_and_classify(&self) -> Option<ReportClass> {
        let pending = self.state.lock().queues.pop_write();
        if let Some(request) = pending {
            self.counters.writes.fetch_add(1, Ordering::Relaxed);
            match self.device.write(request.as_bytes()) {
                Ok(()) => trace!("Wiimote {}: wrote {:?}", self.index, request),
                Err(e) => {
                    self.counters.io_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Wiimote {}: dropping output report 0x{:02X}: {}",
                        self.index,
                        request.report_id(),
                        e
                    );
                }
            }
        }

        let report = match self.device.read() {
            Ok(Some(report)) => {
                self.counters
                    .consecutive_read_errors
                    .store(0, Ordering::Relaxed);
                report
            }
            Ok(None) => return None,
            Err(e) => {
                self.counters.io_errors.fetch_add(1, Ordering::Relaxed);
                let streak = self
                    .counters
                    .consecutive_read_errors
                    .fetch_add(1, Ordering::Relaxed);
                if streak % READ_ERROR_WARN_INTERVAL == 0 {
                    warn!("Wiimote {}: read failed: {}", self.index, e);
                } else {
                    debug!("Wiimote {}: read failed: {}", self.index, e);
                }
                return None;
            }
        };

        let mut state = self.state.lock();
        self.counters.reports_read.fetch_add(1, Ordering::Relaxed);
        if state.channel_id == NO_CHANNEL {
            self.counters
                .reports_discarded
                .fetch_add(1, Ordering::Relaxed);
            trace!(
                "Wiimote {}: no channel, discarding {}",
                self.index,
                input::name(report.report_id())
            );
            return None;
        }

        let class = state.queues.store_inbound(report);
        trace!(
            "Wiimote {}: buffered {} as {:?}",
            self.index,
            input::name(report.report_id()),
            class
        );
        Some(class)
    }

    /// One host tick: hand the most relevant buffered report to `sink`
    ///
    /// Returns whether a frame was delivered. The sink runs after the
    /// session lock is released, so it may call back into the session.
    pub fn update(&self, sink: &dyn InputSink) -> bool {
        let (channel_id, payload) = {
            let mut state = self.state.lock();
            (state.channel_id, state.queues.next_delivery())
        };

        let Some(payload) = payload else {
            return false;
        };
        if channel_id == NO_CHANNEL {
            return false;
        }

        let frame = frame::input_frame(&payload);
        sink.on_input_report(channel_id, &frame);
        self.counters
            .frames_delivered
            .fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Reports waiting in the event queue
    pub fn pending_events(&self) -> usize {
        self.state.lock().queues.pending_events()
    }

    /// Output reports not yet written
    pub fn pending_writes(&self) -> usize {
        self.state.lock().queues.pending_writes()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            reports_read: self.counters.reports_read.load(Ordering::Relaxed),
            reports_discarded: self.counters.reports_discarded.load(Ordering::Relaxed),
            frames_delivered: self.counters.frames_delivered.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            io_errors: self.counters.io_errors.load(Ordering::Relaxed),
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        debug!("Wiimote {}: session closed", self.index);
    }
}
