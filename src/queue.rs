//! Per-device report buffers
//!
//! Not synchronized on its own; the owning session keeps it behind a lock.

use std::collections::VecDeque;

use wiimote_transport::protocol::is_continuous_report;
use wiimote_transport::Payload;

/// Which inbound buffer a report landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportClass {
    /// One-off report, queued in order
    Event,
    /// Periodic data report, only the newest is kept
    Continuous,
}

impl ReportClass {
    pub fn of(payload: &Payload) -> Self {
        if is_continuous_report(payload.report_id()) {
            ReportClass::Continuous
        } else {
            ReportClass::Event
        }
    }
}

/// Outbound write queue plus the two inbound buffers
#[derive(Debug, Default)]
pub struct ReportQueues {
    writes: VecDeque<Payload>,
    events: VecDeque<Payload>,
    latest: Option<Payload>,
}

impl ReportQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a report for the device
    pub fn push_write(&mut self, payload: Payload) {
        self.writes.push_back(payload);
    }

    /// Oldest pending write
    pub fn pop_write(&mut self) -> Option<Payload> {
        self.writes.pop_front()
    }

    /// Buffer a report from the device according to its class
    pub fn store_inbound(&mut self, payload: Payload) -> ReportClass {
        let class = ReportClass::of(&payload);
        match class {
            ReportClass::Continuous => self.latest = Some(payload),
            ReportClass::Event => self.events.push_back(payload),
        }
        class
    }

    /// Report to hand out on this tick
    ///
    /// Pops the oldest event if any; otherwise repeats the latest
    /// continuous report, which stays in place for the next tick.
    pub fn next_delivery(&mut self) -> Option<Payload> {
        self.events.pop_front().or(self.latest)
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn latest(&self) -> Option<&Payload> {
        self.latest.as_ref()
    }
}
