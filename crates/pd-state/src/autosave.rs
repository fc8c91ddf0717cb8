//! Autosave System
//!
//! File-backed snapshot store for a running draw:
//! - One JSON file per save, named after the event
//! - Backup rotation
//! - Crash recovery from the newest file
//! - Change tracking between saves

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use pd_draw::DrawSnapshot;

use crate::{SnapshotStore, StateError, StateResult};

/// Autosave file extension
pub const AUTOSAVE_EXTENSION: &str = "json";

// ============ Autosave Config ============

/// Autosave configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Enable autosave
    pub enabled: bool,
    /// Number of autosave files to keep per event
    pub backup_count: usize,
    /// Autosave directory
    pub autosave_dir: PathBuf,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backup_count: 5,
            autosave_dir: default_autosave_dir(),
        }
    }
}

fn default_autosave_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prize-draw")
        .join("autosave")
}

// ============ Autosave State ============

/// State tracking for autosave
pub struct AutosaveState {
    /// Last save timestamp
    last_save: AtomicU64,
    /// Pending changes flag
    has_changes: AtomicBool,
    /// Currently saving flag
    is_saving: AtomicBool,
    /// Change counter
    change_count: AtomicU64,
    /// Change count at last save
    last_saved_change_count: AtomicU64,
}

impl AutosaveState {
    pub fn new() -> Self {
        Self {
            last_save: AtomicU64::new(0),
            has_changes: AtomicBool::new(false),
            is_saving: AtomicBool::new(false),
            change_count: AtomicU64::new(0),
            last_saved_change_count: AtomicU64::new(0),
        }
    }

    /// Mark that a change occurred
    pub fn mark_changed(&self) {
        self.has_changes.store(true, Ordering::Relaxed);
        self.change_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark save started
    pub fn start_save(&self) -> bool {
        self.is_saving
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Mark save finished. Changes are only cleared when the save succeeded.
    pub fn finish_save(&self, succeeded: bool) {
        if succeeded {
            self.has_changes.store(false, Ordering::Relaxed);
            self.last_saved_change_count
                .store(self.change_count.load(Ordering::Relaxed), Ordering::Relaxed);
            self.last_save.store(current_timestamp(), Ordering::Relaxed);
        }
        self.is_saving.store(false, Ordering::Relaxed);
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes.load(Ordering::Relaxed)
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving.load(Ordering::Relaxed)
    }

    /// Total changes seen
    pub fn change_count(&self) -> u64 {
        self.change_count.load(Ordering::Relaxed)
    }

    /// Time since last save (seconds)
    pub fn seconds_since_save(&self) -> u64 {
        let last = self.last_save.load(Ordering::Relaxed);
        if last == 0 {
            return u64::MAX;
        }
        current_timestamp().saturating_sub(last) / 1000
    }

    /// Number of changes since last save
    pub fn changes_since_save(&self) -> u64 {
        let current = self.change_count.load(Ordering::Relaxed);
        let saved = self.last_saved_change_count.load(Ordering::Relaxed);
        current.saturating_sub(saved)
    }
}

impl Default for AutosaveState {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ============ Autosave Manager ============

/// Manages autosave files for one event
pub struct AutosaveManager {
    config: RwLock<AutosaveConfig>,
    state: AutosaveState,
    event_name: RwLock<String>,
}

impl AutosaveManager {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config: RwLock::new(config),
            state: AutosaveState::new(),
            event_name: RwLock::new("Untitled".to_string()),
        }
    }

    /// Set event name (autosave files are grouped by it)
    pub fn set_event_name(&self, name: impl Into<String>) {
        *self.event_name.write() = name.into();
    }

    fn file_prefix(&self) -> String {
        format!("{}_autosave_", sanitize_filename(&self.event_name.read()))
    }

    /// Path for the next autosave
    ///
    /// Names sort chronologically: millisecond timestamp, then change count.
    pub fn autosave_path(&self) -> PathBuf {
        let config = self.config.read();
        let filename = format!(
            "{}{:013}_{:06}.{}",
            self.file_prefix(),
            current_timestamp(),
            self.state.change_count(),
            AUTOSAVE_EXTENSION
        );
        config.autosave_dir.join(filename)
    }

    /// Autosave files for the current event, oldest first
    fn event_autosaves(&self, dir: &Path) -> Vec<PathBuf> {
        let prefix = self.file_prefix();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .into_iter()
            .flatten()
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name();
                let name = name.to_string_lossy();
                name.starts_with(&prefix) && name.ends_with(AUTOSAVE_EXTENSION)
            })
            .map(|e| e.path())
            .collect();
        files.sort();
        files
    }

    /// Newest autosave for the current event
    pub fn latest_autosave(&self) -> Option<PathBuf> {
        let config = self.config.read();
        if !config.autosave_dir.exists() {
            return None;
        }
        self.event_autosaves(&config.autosave_dir).pop()
    }

    /// Mark change occurred
    pub fn mark_changed(&self) {
        self.state.mark_changed();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.state.has_changes()
    }

    /// Write a snapshot to a new autosave file
    pub fn autosave(&self, snapshot: &DrawSnapshot) -> StateResult<PathBuf> {
        if !self.state.start_save() {
            return Err(StateError::SaveInProgress);
        }

        let result = self.do_autosave(snapshot);

        self.state.finish_save(result.is_ok());
        result
    }

    fn do_autosave(&self, snapshot: &DrawSnapshot) -> StateResult<PathBuf> {
        let config = self.config.read().clone();

        std::fs::create_dir_all(&config.autosave_dir)?;

        let path = self.autosave_path();

        // Newest file must never be half-written
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        self.rotate_backups(&config);

        log::info!("Autosave completed: {:?}", path);
        Ok(path)
    }

    /// Delete autosaves beyond `backup_count`
    fn rotate_backups(&self, config: &AutosaveConfig) {
        let files = self.event_autosaves(&config.autosave_dir);
        let excess = files.len().saturating_sub(config.backup_count.max(1));

        for old in files.iter().take(excess) {
            if let Err(e) = std::fs::remove_file(old) {
                log::warn!("Failed to remove old autosave: {:?}", e);
            }
        }
    }

    /// Autosaves for the current event, newest first
    pub fn list_autosaves(&self) -> Vec<AutosaveInfo> {
        let config = self.config.read();
        if !config.autosave_dir.exists() {
            return Vec::new();
        }

        self.event_autosaves(&config.autosave_dir)
            .into_iter()
            .rev()
            .filter_map(|path| {
                let metadata = std::fs::metadata(&path).ok()?;
                Some(AutosaveInfo {
                    name: path.file_stem()?.to_string_lossy().into_owned(),
                    size: metadata.len(),
                    modified: metadata.modified().ok()?,
                    path,
                })
            })
            .collect()
    }

    /// Delete all autosaves for the current event
    pub fn clear_autosaves(&self) -> StateResult<usize> {
        let config = self.config.read();
        let mut count = 0;

        for path in self.event_autosaves(&config.autosave_dir) {
            if std::fs::remove_file(&path).is_ok() {
                count += 1;
            }
        }

        Ok(count)
    }

    /// Read a snapshot from an autosave file
    pub fn recover(&self, path: &Path) -> StateResult<DrawSnapshot> {
        if !path.exists() {
            return Err(StateError::NotFound);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn config(&self) -> AutosaveConfig {
        self.config.read().clone()
    }

    pub fn set_config(&self, config: AutosaveConfig) {
        *self.config.write() = config;
    }

    pub fn status(&self) -> AutosaveStatus {
        AutosaveStatus {
            enabled: self.config.read().enabled,
            has_changes: self.state.has_changes(),
            is_saving: self.state.is_saving(),
            seconds_since_save: self.state.seconds_since_save(),
            changes_since_save: self.state.changes_since_save(),
        }
    }
}

impl Default for AutosaveManager {
    fn default() -> Self {
        Self::new(AutosaveConfig::default())
    }
}

impl SnapshotStore for AutosaveManager {
    fn save(&self, snapshot: &DrawSnapshot) -> StateResult<()> {
        self.mark_changed();
        if !self.config.read().enabled {
            return Ok(());
        }
        self.autosave(snapshot).map(|_| ())
    }

    fn load(&self) -> StateResult<Option<DrawSnapshot>> {
        match self.latest_autosave() {
            Some(path) => self.recover(&path).map(Some),
            None => Ok(None),
        }
    }

    fn clear(&self) -> StateResult<()> {
        let removed = self.clear_autosaves()?;
        log::info!("Cleared {} autosave files", removed);
        Ok(())
    }
}

// ============ Helper Types ============

/// Autosave file info
#[derive(Debug, Clone)]
pub struct AutosaveInfo {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Autosave status
#[derive(Debug, Clone)]
pub struct AutosaveStatus {
    pub enabled: bool,
    pub has_changes: bool,
    pub is_saving: bool,
    pub seconds_since_save: u64,
    pub changes_since_save: u64,
}

/// Sanitize an event name for use in a filename
fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    let mut result = sanitized.replace("..", "");
    result = result.trim_matches(|c| c == '.' || c == ' ').to_string();

    if result.is_empty() {
        result = "unnamed".to_string();
    }

    if result.len() > 100 {
        let mut end = 100;
        while !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    result
}

// ============ Tests ============
