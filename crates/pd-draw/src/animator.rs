//! Selection animator contract
//!
//! The orchestrator arms an animator when a spin starts and asks it to stop
//! on request. The animator answers later, out of band, with exactly one
//! [`WinnerReport`] tagged with the session it was armed for. Reports for a
//! session the orchestrator has since abandoned are discarded on arrival.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use pd_core::Participant;

use crate::pool::pick_uniform;

/// Monotonically increasing spin token
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DrawSession(pub u64);

impl DrawSession {
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for DrawSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Winner produced by an animator run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerReport {
    pub session: DrawSession,
    pub participant: Participant,
}

/// Something that turns start/stop signals into a single winner report
pub trait SelectionAnimator: Send {
    /// Begin a run over `candidates`
    fn arm(&mut self, session: DrawSession, candidates: &[Participant]);

    /// Ask the run to settle on a winner. The report arrives later.
    fn request_stop(&mut self, session: DrawSession);

    /// Abandon a run. Any report it still produces will be stale.
    fn cancel(&mut self, session: DrawSession);

    /// Name for logging
    fn name(&self) -> &str {
        "animator"
    }
}

struct ArmedRun {
    session: DrawSession,
    candidates: Vec<Participant>,
}

/// Reel-style animator
///
/// Picks uniformly from the candidates captured at arm time and posts the
/// report to a channel, optionally after a reveal delay on a worker thread.
/// The host drains the receiver and feeds reports to the orchestrator.
pub struct ReelAnimator {
    rng: StdRng,
    reports: Sender<WinnerReport>,
    armed: Option<ArmedRun>,
    reveal_delay: Duration,
}

impl ReelAnimator {
    /// Create an OS-seeded animator and the receiving end of its reports
    pub fn new() -> (Self, Receiver<WinnerReport>) {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create with a fixed seed for reproducible rehearsals
    pub fn seeded(seed: u64) -> (Self, Receiver<WinnerReport>) {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> (Self, Receiver<WinnerReport>) {
        let (tx, rx) = unbounded();
        let animator = Self {
            rng,
            reports: tx,
            armed: None,
            reveal_delay: Duration::ZERO,
        };
        (animator, rx)
    }

    /// Delay between the stop request and the report
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Session currently armed, if any
    pub fn armed_session(&self) -> Option<DrawSession> {
        self.armed.as_ref().map(|run| run.session)
    }

    fn post(&self, report: WinnerReport) {
        if self.reveal_delay.is_zero() {
            if self.reports.send(report).is_err() {
                log::warn!("Winner report dropped: receiver closed");
            }
            return;
        }

        let tx = self.reports.clone();
        let delay = self.reveal_delay;
        thread::spawn(move || {
            thread::sleep(delay);
            if tx.send(report).is_err() {
                log::warn!("Winner report dropped: receiver closed");
            }
        });
    }
}

impl SelectionAnimator for ReelAnimator {
    fn arm(&mut self, session: DrawSession, candidates: &[Participant]) {
        log::debug!("Reel armed for session {} ({} candidates)", session, candidates.len());
        self.armed = Some(ArmedRun {
            session,
            candidates: candidates.to_vec(),
        });
    }

    fn request_stop(&mut self, session: DrawSession) {
        let run = match self.armed.take() {
            Some(run) if run.session == session => run,
            other => {
                log::debug!("Stop request for unarmed session {}", session);
                self.armed = other;
                return;
            }
        };

        match pick_uniform(&run.candidates, &mut self.rng) {
            Ok(winner) => self.post(WinnerReport {
                session,
                participant: winner.clone(),
            }),
            Err(_) => log::warn!("Reel stopped with no candidates (session {})", session),
        }
    }

    fn cancel(&mut self, session: DrawSession) {
        if self.armed_session() == Some(session) {
            log::debug!("Reel run {} cancelled", session);
            self.armed = None;
        }
    }

    fn name(&self) -> &str {
        "reel"
    }
}
