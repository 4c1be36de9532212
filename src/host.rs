//! Host-facing contracts
//!
//! The emulated console side receives framed input reports through an
//! `InputSink`. Savestates have nothing to capture from a real controller,
//! so the state hook is a no-op.

use parking_lot::Mutex;

/// Receives framed input reports for a channel
pub trait InputSink: Send + Sync {
    /// Called once per delivered report with the full frame (header + slot)
    fn on_input_report(&self, channel_id: u16, frame: &[u8]);
}

impl<F> InputSink for F
where
    F: Fn(u16, &[u8]) + Send + Sync,
{
    fn on_input_report(&self, channel_id: u16, frame: &[u8]) {
        self(channel_id, frame)
    }
}

/// Direction of a savestate pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMode {
    Read,
    Write,
    Measure,
    Verify,
}

/// Sink that keeps every frame until drained
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<(u16, Vec<u8>)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything received so far
    pub fn take(&self) -> Vec<(u16, Vec<u8>)> {
        std::mem::take(&mut *self.frames.lock())
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

impl InputSink for RecordingSink {
    fn on_input_report(&self, channel_id: u16, frame: &[u8]) {
        self.frames.lock().push((channel_id, frame.to_vec()));
    }
}
