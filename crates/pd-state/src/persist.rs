//! Persist-on-commit observer

use std::sync::Arc;

use pd_draw::{DrawEvent, DrawObserver, DrawSnapshot};

use crate::SnapshotStore;

/// Saves a snapshot after every committed draw mutation
///
/// Spin, stop and respin notifications are ignored: they change nothing that
/// is persisted. Save failures are logged and counted, never propagated into
/// the draw.
pub struct PersistOnCommit<S: SnapshotStore> {
    store: Arc<S>,
    saves: u64,
    failures: u64,
}

impl<S: SnapshotStore> PersistOnCommit<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            saves: 0,
            failures: 0,
        }
    }

    pub fn saves(&self) -> u64 {
        self.saves
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl<S: SnapshotStore> DrawObserver for PersistOnCommit<S> {
    fn on_state_changed(&mut self, event: &DrawEvent, snapshot: &DrawSnapshot) {
        if !event.is_committed() {
            return;
        }

        match self.store.save(snapshot) {
            Ok(()) => {
                self.saves += 1;
                log::debug!("Snapshot saved after {}", event.name());
            }
            Err(e) => {
                self.failures += 1;
                log::error!("Failed to save snapshot after {}: {}", event.name(), e);
            }
        }
    }
}
