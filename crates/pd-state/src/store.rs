//! Snapshot stores

use std::collections::HashMap;

use parking_lot::RwLock;

use pd_draw::DrawSnapshot;

use crate::StateResult;

/// Default key for the in-memory blob store
pub const DEFAULT_SNAPSHOT_KEY: &str = "prize-draw-state";

/// Persistence transport for draw snapshots
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot, replacing the previous one
    fn save(&self, snapshot: &DrawSnapshot) -> StateResult<()>;

    /// Most recent snapshot, if any
    fn load(&self) -> StateResult<Option<DrawSnapshot>>;

    /// Forget stored snapshots
    fn clear(&self) -> StateResult<()>;
}

/// Key-value blob store holding JSON text in memory
///
/// Blobs are stored as text so a load goes through the same parsing (and the
/// same failure modes) as a file-backed store.
pub struct MemoryStore {
    key: String,
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_SNAPSHOT_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Raw blob, as an external editor would see it
    pub fn raw(&self) -> Option<String> {
        self.blobs.read().get(&self.key).cloned()
    }

    /// Overwrite the raw blob
    pub fn set_raw(&self, blob: impl Into<String>) {
        self.blobs.write().insert(self.key.clone(), blob.into());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, snapshot: &DrawSnapshot) -> StateResult<()> {
        let json = serde_json::to_string(snapshot)?;
        self.blobs.write().insert(self.key.clone(), json);
        Ok(())
    }

    fn load(&self) -> StateResult<Option<DrawSnapshot>> {
        match self.blobs.read().get(&self.key) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> StateResult<()> {
        self.blobs.write().remove(&self.key);
        Ok(())
    }
}
