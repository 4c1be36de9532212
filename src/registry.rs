//! Session registry
//!
//! Owns the fixed pool of sessions and the poll thread for one bridge
//! instance. The host drives it through `initialize`, the two channel
//! entry points, `update` once per frame, and `shutdown`.
//!
//! ```text
//! host ──send_data──▶ [DeviceSession] ◀──read_and_classify── [PollLoop] ◀── HID
//! host ◀──update───── [DeviceSession]
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use wiimote_transport::DeviceDiscovery;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::host::{InputSink, StateMode};
use crate::poll_loop::PollLoop;
use crate::session::{DeviceSession, SessionStats};

/// All sessions of one bridge plus their poll thread
pub struct SessionRegistry {
    config: BridgeConfig,
    sink: Arc<dyn InputSink>,
    sessions: Vec<Arc<DeviceSession>>,
    poll: Option<PollLoop>,
}

impl SessionRegistry {
    /// Create an empty registry delivering input to `sink`
    pub fn new(config: BridgeConfig, sink: Arc<dyn InputSink>) -> Self {
        Self {
            config,
            sink,
            sessions: Vec::new(),
            poll: None,
        }
    }

    /// Open controllers and start polling
    ///
    /// Returns the number of sessions created. With zero controllers found
    /// nothing is started and the registry stays inactive.
    pub fn initialize(&mut self, discovery: &dyn DeviceDiscovery) -> Result<usize, BridgeError> {
        if self.is_active() {
            return Err(BridgeError::AlreadyInitialized);
        }

        let devices = discovery.discover(self.config.pool_size())?;
        if devices.is_empty() {
            info!("No Wii Remote found");
            return Ok(0);
        }

        let indicator = self.config.indicator();
        let sessions: Vec<Arc<DeviceSession>> = devices
            .into_iter()
            .take(self.config.pool_size())
            .enumerate()
            .map(|(i, device)| Arc::new(DeviceSession::new(i as u8 + 1, device, indicator)))
            .collect();

        let poll = PollLoop::spawn(sessions.clone(), self.config.poll_idle())?;

        for session in &sessions {
            let info = session.device_info();
            info!(
                "Wiimote {}: {} ({:04X}:{:04X})",
                session.index(),
                info.display_name(),
                info.vid,
                info.pid
            );
        }

        self.sessions = sessions;
        self.poll = Some(poll);
        Ok(self.sessions.len())
    }

    /// Stop polling, then release every session
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(mut poll) = self.poll.take() {
            poll.stop();
            debug!("Poll thread joined");
        }
        if !self.sessions.is_empty() {
            info!("Closing {} Wii Remote session(s)", self.sessions.len());
            self.sessions.clear();
        }
    }

    /// Queue a host frame for the controller
    ///
    /// Frames always go to the first controller; `channel_id` becomes its
    /// reply channel.
    pub fn send_data(&self, channel_id: u16, data: &[u8]) -> Result<(), BridgeError> {
        let session = self.sessions.first().ok_or(BridgeError::NoDevice)?;
        session.send_data(channel_id, data)
    }

    /// Frame arriving on the host's HID interrupt channel
    pub fn interrupt_channel(&self, channel_id: u16, data: &[u8]) -> Result<(), BridgeError> {
        self.send_data(channel_id, data)
    }

    /// Frame arriving on the host's HID control channel
    pub fn control_channel(&self, channel_id: u16, data: &[u8]) -> Result<(), BridgeError> {
        self.send_data(channel_id, data)
    }

    /// One host tick across all sessions
    ///
    /// Returns the number of frames delivered.
    pub fn update(&self) -> usize {
        self.sessions
            .iter()
            .filter(|session| session.update(self.sink.as_ref()))
            .count()
    }

    /// Savestate hook; a real controller has nothing to capture
    pub fn do_state(&self, mode: StateMode) {
        debug!("Savestate pass {:?} ignored", mode);
    }

    /// Whether sessions exist and the poll thread was started
    pub fn is_active(&self) -> bool {
        self.poll.is_some()
    }

    pub fn device_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn sessions(&self) -> &[Arc<DeviceSession>] {
        &self.sessions
    }

    /// Counters per session, in registry order
    pub fn stats(&self) -> Vec<SessionStats> {
        self.sessions.iter().map(|s| s.stats()).collect()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
