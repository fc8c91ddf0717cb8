//! State-change notifications

use pd_core::Participant;

use crate::animator::DrawSession;
use crate::ledger::WinnerEntry;
use crate::snapshot::DrawSnapshot;

/// What just happened to the draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawEvent {
    SpinStarted { session: DrawSession },
    StopRequested { session: DrawSession },
    WinnerPending { participant: Participant },
    /// Reported winner was not in the pool; back to ready
    SpinAborted { session: DrawSession },
    Respun { discarded: Participant },
    Confirmed { entry: WinnerEntry },
    Undone { entry: WinnerEntry },
    WinnerRemoved { entry: WinnerEntry },
    PrizeSelected { tier_id: u32, cursor: usize },
    Reset,
    Restored,
    ParticipantsImported { count: usize },
    PrizesImported { slots: usize },
}

impl DrawEvent {
    /// Whether the event changed persisted state (ledger, pool, cursor, tiers)
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. }
                | Self::Undone { .. }
                | Self::WinnerRemoved { .. }
                | Self::PrizeSelected { .. }
                | Self::Reset
                | Self::Restored
                | Self::ParticipantsImported { .. }
                | Self::PrizesImported { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SpinStarted { .. } => "spin_started",
            Self::StopRequested { .. } => "stop_requested",
            Self::WinnerPending { .. } => "winner_pending",
            Self::SpinAborted { .. } => "spin_aborted",
            Self::Respun { .. } => "respun",
            Self::Confirmed { .. } => "confirmed",
            Self::Undone { .. } => "undone",
            Self::WinnerRemoved { .. } => "winner_removed",
            Self::PrizeSelected { .. } => "prize_selected",
            Self::Reset => "reset",
            Self::Restored => "restored",
            Self::ParticipantsImported { .. } => "participants_imported",
            Self::PrizesImported { .. } => "prizes_imported",
        }
    }
}

/// Subscriber to draw state changes
///
/// Called after the transition has fully completed, with a snapshot of the
/// resulting state.
pub trait DrawObserver: Send {
    fn on_state_changed(&mut self, event: &DrawEvent, snapshot: &DrawSnapshot);
}

impl<F> DrawObserver for F
where
    F: FnMut(&DrawEvent, &DrawSnapshot) + Send,
{
    fn on_state_changed(&mut self, event: &DrawEvent, snapshot: &DrawSnapshot) {
        self(event, snapshot)
    }
}
