//! Background poll thread
//!
//! Sweeps every session's read/classify step until cancelled. The blocking
//! device read paces the loop; an optional idle pause can be added after
//! each sweep.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::BridgeError;
use crate::session::DeviceSession;

/// Running poll thread
///
/// Dropping the loop stops it and waits for the thread to exit.
pub struct PollLoop {
    shutdown: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl PollLoop {
    /// Start polling `sessions` in order on a dedicated thread
    pub fn spawn(
        sessions: Vec<Arc<DeviceSession>>,
        idle: Option<Duration>,
    ) -> Result<Self, BridgeError> {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let thread = std::thread::Builder::new()
            .name("wiimote-poll".into())
            .spawn(move || run_poll_loop(&sessions, &token, idle))
            .map_err(BridgeError::PollThread)?;

        Ok(Self {
            shutdown,
            thread: Some(thread),
        })
    }

    /// Signal shutdown and wait for the thread to exit
    ///
    /// After this returns no session is touched by the poll thread again.
    pub fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Poll thread panicked");
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll loop body
///
/// Exits within one sweep of `shutdown` being cancelled.
pub fn run_poll_loop(
    sessions: &[Arc<DeviceSession>],
    shutdown: &CancellationToken,
    idle: Option<Duration>,
) {
    debug!("Poll thread started with {} sessions", sessions.len());
    let mut sweeps: u64 = 0;

    while !shutdown.is_cancelled() {
        for session in sessions {
            session.read_and_classify();
        }
        sweeps += 1;

        match idle {
            Some(pause) => std::thread::sleep(pause),
            None => std::thread::yield_now(),
        }
    }

    debug!("Poll thread exiting after {} sweeps", sweeps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiimote_transport::mock::MockWiimote;
    use wiimote_transport::Leds;

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

    #[test]
    fn test_loop_drains_reads_and_writes() {
        let mock = MockWiimote::default();
        let session = Arc::new(DeviceSession::new(1, mock.boxed(), Leds::LED_4));
        session.send_data(9, &[0xA2, 0x15, 0x00]).unwrap();
        mock.push_report(&[0x20, 0x00]);

        let mut poll = PollLoop::spawn(vec![Arc::clone(&session)], None).unwrap();
        assert!(wait_for(|| session.pending_events() == 1));
        assert_eq!(mock.writes(), vec![vec![0x15, 0x00]]);

        poll.stop();
        assert!(poll.thread.is_none());
    }

    #[test]
    fn test_no_device_calls_after_stop() {
        let mock = MockWiimote::default();
        let session = Arc::new(DeviceSession::new(1, mock.boxed(), Leds::LED_4));
        let mut poll = PollLoop::spawn(vec![session], None).unwrap();
        assert!(wait_for(|| mock.read_calls() > 3));

        poll.stop();
        let calls = mock.io_calls();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(mock.io_calls(), calls);
    }

    #[test]
    fn test_sweeps_sessions_in_order() {
        let first = MockWiimote::new("a");
        let second = MockWiimote::new("b");
        let sessions = vec![
            Arc::new(DeviceSession::new(1, first.boxed(), Leds::LED_1)),
            Arc::new(DeviceSession::new(2, second.boxed(), Leds::LED_2)),
        ];

        let token = CancellationToken::new();
        token.cancel();
        // Already cancelled: no sweep at all
        run_poll_loop(&sessions, &token, None);
        assert_eq!(first.read_calls(), 0);
        assert_eq!(second.read_calls(), 0);

        let mut poll = PollLoop::spawn(sessions, Some(Duration::from_micros(100))).unwrap();
        assert!(wait_for(|| first.read_calls() > 0 && second.read_calls() > 0));
        poll.stop();
        // Each completed sweep visits both
        let diff = first.read_calls() as i64 - second.read_calls() as i64;
        assert!((0..=1).contains(&diff));
    }

    #[test]
    fn test_drop_stops_thread() {
        let mock = MockWiimote::default();
        let session = Arc::new(DeviceSession::new(1, mock.boxed(), Leds::LED_4));
        let poll = PollLoop::spawn(vec![session], None).unwrap();
        let token = poll.shutdown.clone();
        drop(poll);
        assert!(token.is_cancelled());
        let calls = mock.io_calls();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(mock.io_calls(), calls);
    }
}
