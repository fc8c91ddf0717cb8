//! Draw orchestrator: the state machine tying pool, queue and ledger together

use std::collections::HashSet;

use serde::Serialize;

use pd_core::{DrawError, DrawPhase, DrawResult, Participant, PrizeTier};

use crate::animator::{DrawSession, SelectionAnimator, WinnerReport};
use crate::ledger::{WinnerEntry, WinnerLedger};
use crate::observer::{DrawEvent, DrawObserver};
use crate::pool::ParticipantPool;
use crate::queue::{PrizeQueue, PrizeQueueEntry};
use crate::snapshot::DrawSnapshot;

/// Observable state for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStatus {
    pub phase: DrawPhase,
    pub pending_winner: Option<Participant>,
    pub current_prize: Option<PrizeQueueEntry>,
    pub remaining_count: usize,
    pub awarded_count: usize,
    pub total_prizes: usize,
    pub cursor: usize,
    pub session: DrawSession,
}

/// Draw orchestrator
///
/// Owns the prize queue, the participant pool, the winner ledger and the
/// cursor. Every operation checks its guards before touching anything, so a
/// rejected call leaves the state exactly as it was.
///
/// Completion is derived from the ledger (`awarded >= total`), never from the
/// cursor: manual prize selection moves the cursor without awarding.
pub struct DrawOrchestrator {
    /// Tier list as loaded
    tiers: Vec<PrizeTier>,
    /// Expanded award slots
    queue: PrizeQueue,
    /// Full participant list, used by reset
    roster: Vec<Participant>,
    /// Undrawn participants
    pool: ParticipantPool,
    /// Committed winners
    ledger: WinnerLedger,
    /// Active slot in `queue`, in `[0, queue.len()]`
    cursor: usize,
    /// Stored phase (never `Complete`)
    phase: DrawPhase,
    /// Stop already requested for the current spin
    stop_requested: bool,
    /// Winner awaiting confirm/respin
    pending: Option<Participant>,
    /// Token of the latest spin; reports for other sessions are stale
    session: DrawSession,
    animator: Box<dyn SelectionAnimator>,
    observers: Vec<Box<dyn DrawObserver>>,
}

impl DrawOrchestrator {
    /// Create a fresh draw
    pub fn new(
        tiers: Vec<PrizeTier>,
        participants: Vec<Participant>,
        animator: Box<dyn SelectionAnimator>,
    ) -> DrawResult<Self> {
        let queue = PrizeQueue::build(&tiers)?;
        let pool = ParticipantPool::from_participants(participants.clone())?;

        log::info!(
            "Draw created: {} prize slots across {} tiers, {} participants",
            queue.len(),
            tiers.len(),
            pool.size()
        );

        Ok(Self {
            tiers,
            queue,
            roster: participants,
            pool,
            ledger: WinnerLedger::new(),
            cursor: 0,
            phase: DrawPhase::Ready,
            stop_requested: false,
            pending: None,
            session: DrawSession::default(),
            animator,
            observers: Vec::new(),
        })
    }

    /// Resume a draw from a persisted snapshot
    pub fn from_snapshot(
        snapshot: DrawSnapshot,
        animator: Box<dyn SelectionAnimator>,
    ) -> DrawResult<Self> {
        let mut orchestrator = Self::new(Vec::new(), Vec::new(), animator)?;
        orchestrator.restore(snapshot)?;
        Ok(orchestrator)
    }

    /// Register a state-change subscriber
    pub fn subscribe(&mut self, observer: Box<dyn DrawObserver>) {
        self.observers.push(observer);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Current phase, with `Complete` derived from the ledger
    pub fn phase(&self) -> DrawPhase {
        if self.phase == DrawPhase::Ready && self.is_complete() {
            DrawPhase::Complete
        } else {
            self.phase
        }
    }

    /// Every prize instance awarded
    pub fn is_complete(&self) -> bool {
        self.ledger.len() >= self.queue.len()
    }

    /// Slot under the cursor, `None` once the cursor passed the end
    pub fn current_prize(&self) -> Option<&PrizeQueueEntry> {
        self.queue.current(self.cursor)
    }

    /// Slot under the cursor if it can still be awarded
    fn active_prize(&self) -> Option<&PrizeQueueEntry> {
        self.current_prize()
            .filter(|entry| !self.ledger.holds_instance(entry.tier_id, entry.instance_number))
    }

    pub fn pending_winner(&self) -> Option<&Participant> {
        self.pending.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn session(&self) -> DrawSession {
        self.session
    }

    pub fn pool(&self) -> &ParticipantPool {
        &self.pool
    }

    pub fn ledger(&self) -> &WinnerLedger {
        &self.ledger
    }

    pub fn queue(&self) -> &PrizeQueue {
        &self.queue
    }

    pub fn tiers(&self) -> &[PrizeTier] {
        &self.tiers
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Unawarded instances left for a tier
    pub fn remaining_for_tier(&self, tier_id: u32) -> usize {
        self.queue
            .tier_quantity(tier_id)
            .map(|q| (q as usize).saturating_sub(self.ledger.count_for_tier(tier_id)))
            .unwrap_or(0)
    }

    /// State for a presentation layer
    pub fn status(&self) -> DrawStatus {
        DrawStatus {
            phase: self.phase(),
            pending_winner: self.pending.clone(),
            current_prize: self.current_prize().cloned(),
            remaining_count: self.pool.size(),
            awarded_count: self.ledger.len(),
            total_prizes: self.queue.len(),
            cursor: self.cursor,
            session: self.session,
        }
    }

    /// Persistable copy of the state
    pub fn snapshot(&self) -> DrawSnapshot {
        DrawSnapshot {
            participants: self.pool.members().to_vec(),
            prize_tiers: self.tiers.clone(),
            cursor: self.cursor,
            winners: self.ledger.entries().to_vec(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN CYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Arm the animator for a new spin
    pub fn start_spin(&mut self) -> DrawResult<DrawSession> {
        match self.phase() {
            DrawPhase::Ready => {}
            DrawPhase::Complete => return Err(DrawError::DrawComplete),
            _ => return Err(self.illegal("start a spin")),
        }
        if self.pool.is_empty() {
            return Err(DrawError::EmptyPool);
        }
        if self.active_prize().is_none() {
            return Err(DrawError::NoActivePrize);
        }

        self.session = self.session.next();
        self.stop_requested = false;
        self.phase = DrawPhase::Spinning;
        self.animator.arm(self.session, self.pool.members());

        log::debug!(
            "Spin {} started via {} ({} candidates)",
            self.session,
            self.animator.name(),
            self.pool.size()
        );
        self.notify(DrawEvent::SpinStarted {
            session: self.session,
        });
        Ok(self.session)
    }

    /// Ask the animator to settle on a winner
    pub fn request_stop(&mut self) -> DrawResult<()> {
        if self.phase != DrawPhase::Spinning || self.stop_requested {
            return Err(self.illegal("stop"));
        }

        self.stop_requested = true;
        self.animator.request_stop(self.session);
        self.notify(DrawEvent::StopRequested {
            session: self.session,
        });
        Ok(())
    }

    /// Accept a winner report from the animator
    ///
    /// Reports from any session other than the running spin are discarded.
    /// A report is accepted with or without a prior `request_stop`: an
    /// animator may settle on its own before the facilitator stops it.
    /// A winner that is no longer in the pool aborts the spin.
    pub fn report_winner(&mut self, report: WinnerReport) -> DrawResult<Participant> {
        if report.session != self.session || self.phase != DrawPhase::Spinning {
            log::debug!(
                "Discarding stale winner report {} for {} (current {}, {})",
                report.session,
                report.participant.id,
                self.session,
                self.phase
            );
            return Err(DrawError::StaleReport {
                reported: report.session.0,
                current: self.session.0,
            });
        }

        let winner = match self.pool.get(&report.participant.id) {
            Some(member) => member.clone(),
            None => {
                log::warn!(
                    "Reported winner {} is not in the pool, aborting spin {}",
                    report.participant.id,
                    self.session
                );
                self.animator.cancel(self.session);
                self.phase = DrawPhase::Ready;
                self.stop_requested = false;
                self.notify(DrawEvent::SpinAborted {
                    session: self.session,
                });
                return Err(DrawError::EmptyPool);
            }
        };

        self.pending = Some(winner.clone());
        self.phase = DrawPhase::Stopped;
        log::info!("Winner pending: {}", winner);
        self.notify(DrawEvent::WinnerPending {
            participant: winner.clone(),
        });
        Ok(winner)
    }

    /// Commit the pending winner to the active prize
    pub fn confirm(&mut self) -> DrawResult<WinnerEntry> {
        if self.phase != DrawPhase::Stopped || self.pending.is_none() {
            return Err(self.illegal("confirm"));
        }
        let prize = match self.active_prize() {
            Some(prize) => prize.clone(),
            None => return Err(DrawError::NoActivePrize),
        };
        let Some(winner) = self.pending.take() else {
            return Err(self.illegal("confirm"));
        };

        self.pool.remove(&winner.id);
        let entry = WinnerEntry::new(winner, prize);
        self.ledger.append(entry.clone());
        self.cursor = self.queue.advance(self.cursor);
        self.phase = DrawPhase::Ready;
        self.stop_requested = false;

        log::info!(
            "Confirmed: {} wins {} ({}/{} awarded)",
            entry.participant,
            entry.prize.label(),
            self.ledger.len(),
            self.queue.len()
        );
        self.notify(DrawEvent::Confirmed {
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Discard the pending winner without awarding anything
    pub fn respin(&mut self) -> DrawResult<Participant> {
        if self.phase != DrawPhase::Stopped {
            return Err(self.illegal("respin"));
        }
        let Some(discarded) = self.pending.take() else {
            return Err(self.illegal("respin"));
        };

        self.phase = DrawPhase::Ready;
        self.stop_requested = false;

        log::info!("Respin: discarded {}", discarded);
        self.notify(DrawEvent::Respun {
            discarded: discarded.clone(),
        });
        Ok(discarded)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CORRECTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reverse the most recent confirm
    pub fn undo(&mut self) -> DrawResult<WinnerEntry> {
        if self.phase != DrawPhase::Ready {
            return Err(self.illegal("undo"));
        }
        let Some(entry) = self.ledger.pop_last() else {
            return Err(DrawError::NothingToUndo);
        };

        self.cursor = self.queue.retreat(self.cursor);
        if !self.pool.add(entry.participant.clone()) {
            log::warn!("Undo: {} was already back in the pool", entry.participant.id);
        }

        log::info!(
            "Undone: {} no longer wins {}",
            entry.participant,
            entry.prize.label()
        );
        self.notify(DrawEvent::Undone {
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Return an earlier winner to the pool
    ///
    /// The cursor stays put. The vacated instance is not re-offered in the
    /// normal order, but manual tier selection will land on it.
    pub fn remove_winner(&mut self, participant_id: &str) -> DrawResult<WinnerEntry> {
        if self.phase != DrawPhase::Ready {
            return Err(self.illegal("remove a winner"));
        }
        let Some(entry) = self.ledger.remove_by_id(participant_id) else {
            return Err(DrawError::WinnerNotFound(participant_id.to_string()));
        };

        if !self.pool.add(entry.participant.clone()) {
            log::warn!("Remove: {} was already back in the pool", entry.participant.id);
        }

        log::info!(
            "Removed winner {} from {}, slot left unawarded",
            entry.participant,
            entry.prize.label()
        );
        self.notify(DrawEvent::WinnerRemoved {
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Point the cursor at the next unawarded instance of a tier
    pub fn manual_select_tier(&mut self, tier_id: u32) -> DrawResult<usize> {
        match self.phase() {
            DrawPhase::Ready => {}
            DrawPhase::Complete => return Err(DrawError::DrawComplete),
            _ => return Err(self.illegal("select a prize")),
        }
        let Some(quantity) = self.queue.tier_quantity(tier_id) else {
            return Err(DrawError::UnknownTier(tier_id));
        };
        let slot = self
            .ledger
            .next_unawarded_instance(tier_id, quantity)
            .and_then(|instance| self.queue.find_slot_for_tier(tier_id, instance))
            .ok_or(DrawError::TierExhausted(tier_id))?;

        self.cursor = slot;

        log::info!("Prize selected: tier {} -> slot {}", tier_id, slot);
        self.notify(DrawEvent::PrizeSelected {
            tier_id,
            cursor: slot,
        });
        Ok(slot)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESET / IMPORT / RESTORE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start over with a fresh pool
    pub fn reset(&mut self, participants: Vec<Participant>) -> DrawResult<()> {
        let pool = ParticipantPool::from_participants(participants.clone())?;

        self.abandon_spin();
        self.ledger.clear();
        self.cursor = 0;
        self.pool = pool;
        self.roster = participants;

        log::info!("Draw reset with {} participants", self.pool.size());
        self.notify(DrawEvent::Reset);
        Ok(())
    }

    /// Start over with the roster the draw was created or last imported with
    pub fn reset_to_roster(&mut self) -> DrawResult<()> {
        self.reset(self.roster.clone())
    }

    /// Replace the roster. Participants who already won stay in the ledger and
    /// out of the pool.
    pub fn import_participants(&mut self, participants: Vec<Participant>) -> DrawResult<()> {
        let undrawn: Vec<Participant> = participants
            .iter()
            .filter(|p| !self.ledger.contains(&p.id))
            .cloned()
            .collect();
        pd_core::validate_participants(&participants)?;
        let pool = ParticipantPool::from_participants(undrawn)?;

        self.abandon_spin();
        self.pool = pool;
        self.roster = participants;

        log::info!(
            "Imported {} participants ({} undrawn)",
            self.roster.len(),
            self.pool.size()
        );
        self.notify(DrawEvent::ParticipantsImported {
            count: self.roster.len(),
        });
        Ok(())
    }

    /// Replace the prize tiers. Existing awards refer to the old queue, so the
    /// draw restarts from the roster.
    pub fn import_prizes(&mut self, tiers: Vec<PrizeTier>) -> DrawResult<()> {
        let queue = PrizeQueue::build(&tiers)?;
        let pool = ParticipantPool::from_participants(self.roster.clone())?;

        self.abandon_spin();
        self.tiers = tiers;
        self.queue = queue;
        self.ledger.clear();
        self.cursor = 0;
        self.pool = pool;

        log::info!(
            "Imported {} prize tiers ({} slots), draw restarted",
            self.tiers.len(),
            self.queue.len()
        );
        self.notify(DrawEvent::PrizesImported {
            slots: self.queue.len(),
        });
        Ok(())
    }

    /// Replace all state with a persisted snapshot
    pub fn restore(&mut self, snapshot: DrawSnapshot) -> DrawResult<()> {
        let DrawSnapshot {
            participants,
            prize_tiers,
            cursor,
            winners,
        } = snapshot;

        let queue = PrizeQueue::build(&prize_tiers)?;

        let mut winner_ids = HashSet::with_capacity(winners.len());
        let mut held_slots = HashSet::with_capacity(winners.len());
        for entry in &winners {
            entry.participant.validate()?;
            if !winner_ids.insert(entry.participant.id.clone()) {
                return Err(DrawError::Validation(format!(
                    "participant '{}' won more than once",
                    entry.participant.id
                )));
            }

            let prize = &entry.prize;
            let in_queue = queue
                .tier_quantity(prize.tier_id)
                .is_some_and(|quantity| (1..=quantity).contains(&prize.instance_number));
            if !in_queue {
                return Err(DrawError::Validation(format!(
                    "winner '{}' holds {} which is not in the prize list",
                    entry.participant.id,
                    prize.label()
                )));
            }
            if !held_slots.insert((prize.tier_id, prize.instance_number)) {
                return Err(DrawError::Validation(format!(
                    "{} awarded more than once",
                    prize.label()
                )));
            }
        }

        let listed = participants.len();
        let undrawn: Vec<Participant> = participants
            .into_iter()
            .filter(|p| !winner_ids.contains(&p.id))
            .collect();
        if undrawn.len() != listed {
            log::warn!(
                "Snapshot listed {} winners in the pool, removed them",
                listed - undrawn.len()
            );
        }
        let pool = ParticipantPool::from_participants(undrawn)?;

        let clamped = queue.clamp(cursor);
        if clamped != cursor {
            log::warn!("Snapshot cursor {} out of range, clamped to {}", cursor, clamped);
        }

        let roster: Vec<Participant> = winners
            .iter()
            .map(|e| e.participant.clone())
            .chain(pool.iter().cloned())
            .collect();

        self.abandon_spin();
        self.tiers = prize_tiers;
        self.queue = queue;
        self.ledger = WinnerLedger::from_entries(winners);
        self.pool = pool;
        self.roster = roster;
        self.cursor = clamped;

        log::info!(
            "Draw restored: {}/{} awarded, {} undrawn, cursor {}",
            self.ledger.len(),
            self.queue.len(),
            self.pool.size(),
            self.cursor
        );
        self.notify(DrawEvent::Restored);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Drop any spin in flight and invalidate its reports
    fn abandon_spin(&mut self) {
        if self.phase.is_drawing() {
            log::info!("Spin {} cancelled", self.session);
            self.animator.cancel(self.session);
        }
        self.session = self.session.next();
        self.phase = DrawPhase::Ready;
        self.stop_requested = false;
        self.pending = None;
    }

    fn illegal(&self, action: &'static str) -> DrawError {
        DrawError::IllegalTransition {
            action,
            phase: self.phase(),
        }
    }

    fn notify(&mut self, event: DrawEvent) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_state_changed(&event, &snapshot);
        }
    }
}

impl std::fmt::Debug for DrawOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawOrchestrator")
            .field("phase", &self.phase())
            .field("cursor", &self.cursor)
            .field("awarded", &self.ledger.len())
            .field("total", &self.queue.len())
            .field("pool", &self.pool.size())
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Animator that does nothing; tests inject reports directly
    struct SilentAnimator;

    impl SelectionAnimator for SilentAnimator {
        fn arm(&mut self, _session: DrawSession, _candidates: &[Participant]) {}
        fn request_stop(&mut self, _session: DrawSession) {}
        fn cancel(&mut self, _session: DrawSession) {}
    }

    fn p(id: &str, name: &str) -> Participant {
        Participant::new(id, name).unwrap()
    }

    fn draw() -> DrawOrchestrator {
        DrawOrchestrator::new(
            vec![
                PrizeTier::new(1, "Grand", 1).unwrap(),
                PrizeTier::new(2, "Second", 2).unwrap(),
            ],
            vec![p("A", "X"), p("B", "Y"), p("C", "Z")],
            Box::new(SilentAnimator),
        )
        .unwrap()
    }

    fn spin_to(draw: &mut DrawOrchestrator, id: &str) {
        let session = draw.start_spin().unwrap();
        draw.request_stop().unwrap();
        let participant = draw.pool().get(id).unwrap().clone();
        draw.report_winner(WinnerReport {
            session,
            participant,
        })
        .unwrap();
    }

    #[test]
    fn test_initial_status() {
        let draw = draw();
        let status = draw.status();

        assert_eq!(status.phase, DrawPhase::Ready);
        assert_eq!(status.total_prizes, 3);
        assert_eq!(status.remaining_count, 3);
        assert_eq!(status.awarded_count, 0);
        assert_eq!(status.current_prize.unwrap().tier_id, 2);
    }

    #[test]
    fn test_confirm_twice_is_rejected() {
        let mut draw = draw();
        spin_to(&mut draw, "A");

        assert!(draw.confirm().is_ok());
        let before = draw.snapshot();
        assert!(matches!(
            draw.confirm(),
            Err(DrawError::IllegalTransition { .. })
        ));
        assert_eq!(draw.snapshot(), before);
    }

    #[test]
    fn test_spinning_refuses_commands() {
        let mut draw = draw();
        draw.start_spin().unwrap();

        assert!(draw.start_spin().is_err());
        assert!(draw.confirm().is_err());
        assert!(draw.respin().is_err());
        assert!(draw.undo().is_err());
        assert!(draw.manual_select_tier(1).is_err());
        assert_eq!(draw.phase(), DrawPhase::Spinning);

        draw.request_stop().unwrap();
        assert!(draw.request_stop().is_err());
    }

    #[test]
    fn test_respin_changes_nothing() {
        let mut draw = draw();
        spin_to(&mut draw, "B");
        let before = draw.snapshot();

        let discarded = draw.respin().unwrap();
        assert_eq!(discarded.id, "B");
        assert_eq!(draw.phase(), DrawPhase::Ready);
        assert!(draw.pending_winner().is_none());
        assert_eq!(draw.snapshot(), before);
    }

    #[test]
    fn test_report_not_in_pool_aborts_spin() {
        let mut draw = draw();
        let session = draw.start_spin().unwrap();

        let result = draw.report_winner(WinnerReport {
            session,
            participant: p("Q", "Ghost"),
        });
        assert_eq!(result.unwrap_err(), DrawError::EmptyPool);
        assert_eq!(draw.phase(), DrawPhase::Ready);
        assert!(draw.pending_winner().is_none());
        assert!(draw.start_spin().is_ok());
    }

    #[test]
    fn test_duplicate_report_is_stale() {
        let mut draw = draw();
        spin_to(&mut draw, "A");
        let session = draw.session();

        let second = draw.report_winner(WinnerReport {
            session,
            participant: p("B", "Y"),
        });
        assert!(matches!(second, Err(DrawError::StaleReport { .. })));
        assert_eq!(draw.pending_winner().unwrap().id, "A");
    }

    #[test]
    fn test_undo_on_empty_ledger() {
        let mut draw = draw();
        let before = draw.snapshot();
        assert_eq!(draw.undo().unwrap_err(), DrawError::NothingToUndo);
        assert_eq!(draw.snapshot(), before);
    }

    #[test]
    fn test_complete_then_undo_leaves_complete() {
        let mut draw = draw();
        for id in ["A", "B", "C"] {
            spin_to(&mut draw, id);
            draw.confirm().unwrap();
        }

        assert_eq!(draw.phase(), DrawPhase::Complete);
        assert_eq!(draw.start_spin().unwrap_err(), DrawError::DrawComplete);
        assert_eq!(draw.manual_select_tier(1).unwrap_err(), DrawError::DrawComplete);

        let undone = draw.undo().unwrap();
        assert_eq!(undone.prize.tier_id, 1);
        assert_eq!(draw.phase(), DrawPhase::Ready);
        assert_eq!(draw.cursor(), 2);
        assert!(draw.start_spin().is_ok());
    }

    #[test]
    fn test_manual_select_does_not_complete() {
        let mut draw = draw();
        assert_eq!(draw.manual_select_tier(1).unwrap(), 2);
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();

        // Cursor ran off the end, but two instances are still unawarded
        assert_eq!(draw.cursor(), 3);
        assert!(!draw.is_complete());
        assert_eq!(draw.phase(), DrawPhase::Ready);
        assert_eq!(draw.start_spin().unwrap_err(), DrawError::NoActivePrize);

        assert_eq!(draw.manual_select_tier(1).unwrap_err(), DrawError::TierExhausted(1));
        assert_eq!(draw.manual_select_tier(9).unwrap_err(), DrawError::UnknownTier(9));
        assert_eq!(draw.manual_select_tier(2).unwrap(), 0);
    }

    #[test]
    fn test_awarded_slot_is_never_reawarded() {
        let mut draw = DrawOrchestrator::new(
            vec![
                PrizeTier::new(1, "Grand", 2).unwrap(),
                PrizeTier::new(2, "Second", 2).unwrap(),
            ],
            vec![p("A", "1"), p("B", "2"), p("C", "3"), p("D", "4")],
            Box::new(SilentAnimator),
        )
        .unwrap();

        // Grand #1 first, then back to the start of the queue
        draw.manual_select_tier(1).unwrap();
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();
        draw.manual_select_tier(2).unwrap();
        spin_to(&mut draw, "B");
        draw.confirm().unwrap();
        spin_to(&mut draw, "C");
        draw.confirm().unwrap();

        // Cursor now sits on Grand #1, which is already taken
        assert_eq!(draw.cursor(), 2);
        assert_eq!(draw.start_spin().unwrap_err(), DrawError::NoActivePrize);
        assert_eq!(draw.manual_select_tier(1).unwrap(), 3);
        spin_to(&mut draw, "D");
        let entry = draw.confirm().unwrap();
        assert_eq!(entry.prize.instance_number, 2);
        assert_eq!(draw.phase(), DrawPhase::Complete);
    }

    #[test]
    fn test_remove_winner_keeps_cursor() {
        let mut draw = draw();
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();
        spin_to(&mut draw, "B");
        draw.confirm().unwrap();
        assert_eq!(draw.cursor(), 2);

        let removed = draw.remove_winner("A").unwrap();
        assert_eq!(removed.prize.instance_number, 1);
        assert_eq!(draw.cursor(), 2);
        assert!(draw.pool().contains("A"));
        assert_eq!(draw.ledger().len(), 1);
        assert_eq!(
            draw.remove_winner("A").unwrap_err(),
            DrawError::WinnerNotFound("A".to_string())
        );

        // The vacated Second #1 is reachable through manual selection
        assert_eq!(draw.manual_select_tier(2).unwrap(), 0);
    }

    #[test]
    fn test_reset_mid_spin_discards_report() {
        let mut draw = draw();
        let session = draw.start_spin().unwrap();
        draw.request_stop().unwrap();

        draw.reset_to_roster().unwrap();
        let late = draw.report_winner(WinnerReport {
            session,
            participant: p("A", "X"),
        });
        assert!(matches!(late, Err(DrawError::StaleReport { .. })));
        assert!(draw.pending_winner().is_none());
        assert_eq!(draw.phase(), DrawPhase::Ready);
    }

    #[test]
    fn test_reset_rejects_invalid_roster() {
        let mut draw = draw();
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();
        let before = draw.snapshot();

        let result = draw.reset(vec![p("A", "X"), p("A", "Y")]);
        assert!(matches!(result, Err(DrawError::Validation(_))));
        assert_eq!(draw.snapshot(), before);
    }

    #[test]
    fn test_import_participants_keeps_winners_out() {
        let mut draw = draw();
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();

        draw.import_participants(vec![p("A", "X"), p("D", "W"), p("E", "V")])
            .unwrap();
        assert_eq!(draw.pool().size(), 2);
        assert!(!draw.pool().contains("A"));
        assert_eq!(draw.ledger().len(), 1);
    }

    #[test]
    fn test_import_prizes_restarts() {
        let mut draw = draw();
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();

        draw.import_prizes(vec![PrizeTier::new(5, "Mug", 10).unwrap()])
            .unwrap();
        assert_eq!(draw.queue().len(), 10);
        assert!(draw.ledger().is_empty());
        assert_eq!(draw.cursor(), 0);
        assert_eq!(draw.pool().size(), 3);

        let bad = PrizeTier {
            id: 6,
            name: "Car".into(),
            localized_name: None,
            quantity: 0,
        };
        assert!(draw.import_prizes(vec![bad]).is_err());
        assert_eq!(draw.queue().len(), 10);
    }

    #[test]
    fn test_observer_sees_every_commit() {
        let mut draw = draw();
        let events: Arc<Mutex<Vec<(&'static str, bool, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        draw.subscribe(Box::new(move |event: &DrawEvent, snapshot: &DrawSnapshot| {
            sink.lock()
                .push((event.name(), event.is_committed(), snapshot.winners.len()));
        }));

        spin_to(&mut draw, "C");
        draw.confirm().unwrap();
        draw.undo().unwrap();

        let events = events.lock();
        let names: Vec<&str> = events.iter().map(|e| e.0).collect();
        assert_eq!(
            names,
            vec!["spin_started", "stop_requested", "winner_pending", "confirmed", "undone"]
        );
        assert_eq!(events[3], ("confirmed", true, 1));
        assert_eq!(events[4], ("undone", true, 0));
    }

    #[test]
    fn test_restore_clamps_and_repairs() {
        let mut source = draw();
        spin_to(&mut source, "A");
        source.confirm().unwrap();

        let mut snapshot = source.snapshot();
        snapshot.cursor = 42;
        snapshot.participants.push(p("A", "X"));

        let restored = DrawOrchestrator::from_snapshot(snapshot, Box::new(SilentAnimator)).unwrap();
        assert_eq!(restored.cursor(), 3);
        assert!(!restored.pool().contains("A"));
        assert_eq!(restored.pool().size(), 2);
        assert_eq!(restored.roster().len(), 3);
        assert_eq!(restored.ledger().len(), 1);
    }

    #[test]
    fn test_restore_rejects_bad_snapshot() {
        let mut draw = draw();
        let before = draw.snapshot();

        let mut snapshot = before.clone();
        snapshot.prize_tiers[0].quantity = 5000;
        assert!(draw.restore(snapshot).is_err());
        assert_eq!(draw.snapshot(), before);
    }

    #[test]
    fn test_restore_rejects_winners_outside_queue() {
        let mut source = draw();
        spin_to(&mut source, "A");
        source.confirm().unwrap();
        spin_to(&mut source, "B");
        source.confirm().unwrap();
        let good = source.snapshot();

        let mut target = draw();
        let before = target.snapshot();

        // Tier that does not exist
        let mut snapshot = good.clone();
        for entry in &mut snapshot.winners {
            entry.prize.tier_id = 9;
        }
        assert!(matches!(
            target.restore(snapshot),
            Err(DrawError::Validation(_))
        ));

        // Instance beyond the tier quantity
        let mut snapshot = good.clone();
        snapshot.winners[0].prize.instance_number = 3;
        assert!(matches!(
            target.restore(snapshot),
            Err(DrawError::Validation(_))
        ));

        // Two winners on the same slot
        let mut snapshot = good.clone();
        snapshot.winners[1].prize = snapshot.winners[0].prize.clone();
        assert!(matches!(
            target.restore(snapshot),
            Err(DrawError::Validation(_))
        ));

        assert_eq!(target.snapshot(), before);
        assert_eq!(target.phase(), DrawPhase::Ready);

        target.restore(good).unwrap();
        assert_eq!(target.ledger().len(), 2);
        assert!(!target.is_complete());
    }

    #[test]
    fn test_remaining_for_tier() {
        let mut draw = draw();
        assert_eq!(draw.remaining_for_tier(2), 2);
        spin_to(&mut draw, "A");
        draw.confirm().unwrap();
        assert_eq!(draw.remaining_for_tier(2), 1);
        assert_eq!(draw.remaining_for_tier(9), 0);
    }
}
