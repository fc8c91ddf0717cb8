//! Thread-safe handle
//!
//! Hosts that drive the draw from more than one thread (a UI thread plus the
//! animator's reveal thread, for example) share one orchestrator behind a
//! mutex so transitions never interleave.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;

use pd_core::{DrawError, DrawResult, Participant};

use crate::animator::{DrawSession, WinnerReport};
use crate::ledger::WinnerEntry;
use crate::orchestrator::{DrawOrchestrator, DrawStatus};

/// Cloneable handle serializing all transitions through one lock
#[derive(Clone)]
pub struct DrawHandle {
    inner: Arc<Mutex<DrawOrchestrator>>,
}

impl DrawHandle {
    pub fn new(orchestrator: DrawOrchestrator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(orchestrator)),
        }
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut DrawOrchestrator) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn status(&self) -> DrawStatus {
        self.inner.lock().status()
    }

    pub fn start_spin(&self) -> DrawResult<DrawSession> {
        self.inner.lock().start_spin()
    }

    pub fn request_stop(&self) -> DrawResult<()> {
        self.inner.lock().request_stop()
    }

    pub fn confirm(&self) -> DrawResult<WinnerEntry> {
        self.inner.lock().confirm()
    }

    pub fn respin(&self) -> DrawResult<Participant> {
        self.inner.lock().respin()
    }

    pub fn undo(&self) -> DrawResult<WinnerEntry> {
        self.inner.lock().undo()
    }

    /// Feed one report to the orchestrator
    pub fn deliver(&self, report: WinnerReport) -> DrawResult<Participant> {
        self.inner.lock().report_winner(report)
    }

    /// Deliver every report already queued. Returns the accepted winner, if any.
    pub fn pump_reports(&self, reports: &Receiver<WinnerReport>) -> Option<Participant> {
        let mut accepted = None;
        for report in reports.try_iter() {
            match self.deliver(report) {
                Ok(winner) => accepted = Some(winner),
                Err(e) if e.is_silent() => {}
                Err(e) => log::warn!("Winner report rejected: {}", e),
            }
        }
        accepted
    }

    /// Block until a report for the running spin is accepted or `timeout`
    /// elapses. Stale reports are skipped.
    pub fn wait_for_winner(
        &self,
        reports: &Receiver<WinnerReport>,
        timeout: Duration,
    ) -> DrawResult<Option<Participant>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match reports.recv_timeout(remaining) {
                Ok(report) => match self.deliver(report) {
                    Ok(winner) => return Ok(Some(winner)),
                    Err(DrawError::StaleReport { .. }) => continue,
                    Err(e) => return Err(e),
                },
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::ReelAnimator;
    use pd_core::{DrawPhase, PrizeTier};
    use std::thread;

    fn handle(delay: Duration) -> (DrawHandle, Receiver<WinnerReport>) {
        let (reel, rx) = ReelAnimator::seeded(99);
        let reel = reel.with_reveal_delay(delay);
        let orchestrator = DrawOrchestrator::new(
            vec![PrizeTier::new(1, "Grand", 2).unwrap()],
            vec![
                Participant::new("A", "X").unwrap(),
                Participant::new("B", "Y").unwrap(),
            ],
            Box::new(reel),
        )
        .unwrap();
        (DrawHandle::new(orchestrator), rx)
    }

    #[test]
    fn test_pump_instant_reel() {
        let (draw, rx) = handle(Duration::ZERO);

        draw.start_spin().unwrap();
        draw.request_stop().unwrap();
        let winner = draw.pump_reports(&rx).unwrap();

        assert_eq!(draw.status().phase, DrawPhase::Stopped);
        assert_eq!(draw.status().pending_winner.unwrap(), winner);
        draw.confirm().unwrap();
        assert_eq!(draw.status().awarded_count, 1);
    }

    #[test]
    fn test_wait_for_delayed_reveal() {
        let (draw, rx) = handle(Duration::from_millis(10));

        draw.start_spin().unwrap();
        draw.request_stop().unwrap();
        let winner = draw.wait_for_winner(&rx, Duration::from_secs(2)).unwrap();
        assert!(winner.is_some());
        assert_eq!(draw.status().phase, DrawPhase::Stopped);
    }

    #[test]
    fn test_delayed_report_after_reset_is_ignored() {
        let (draw, rx) = handle(Duration::from_millis(30));

        draw.start_spin().unwrap();
        draw.request_stop().unwrap();
        draw.with(|o| o.reset_to_roster()).unwrap();

        // The reveal thread still delivers, but for a dead session
        let winner = draw.wait_for_winner(&rx, Duration::from_millis(300)).unwrap();
        assert!(winner.is_none());
        assert_eq!(draw.status().phase, DrawPhase::Ready);
        assert!(draw.status().pending_winner.is_none());
    }

    #[test]
    fn test_handle_shared_across_threads() {
        let (draw, rx) = handle(Duration::ZERO);
        let worker = draw.clone();

        thread::spawn(move || {
            worker.start_spin().unwrap();
            worker.request_stop().unwrap();
        })
        .join()
        .unwrap();

        assert!(draw.pump_reports(&rx).is_some());
        assert!(draw.respin().is_ok());
        assert_eq!(draw.status().awarded_count, 0);
    }
}
