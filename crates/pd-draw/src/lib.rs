//! # pd-draw: Draw orchestration for live prize drawings
//!
//! A facilitator repeatedly draws one participant from a shrinking pool and
//! awards the active prize instance, with confirm/respin/undo so mistakes
//! made on stage can be corrected without restarting.
//!
//! ## Architecture
//!
//! ```text
//! DrawOrchestrator
//!     │
//!     ├── PrizeQueue (tiers expanded into slots, highest id first)
//!     ├── ParticipantPool (undrawn entries)
//!     ├── WinnerLedger (committed awards)
//!     └── SelectionAnimator (arm / stop → async WinnerReport)
//!           │
//!           v
//!     DrawEvent + DrawSnapshot → DrawObserver (persistence, UI)
//! ```

pub mod animator;
pub mod handle;
pub mod ledger;
pub mod observer;
pub mod orchestrator;
pub mod pool;
pub mod queue;
pub mod snapshot;

pub use animator::*;
pub use handle::*;
pub use ledger::*;
pub use observer::*;
pub use orchestrator::*;
pub use pool::*;
pub use queue::*;
pub use snapshot::*;
