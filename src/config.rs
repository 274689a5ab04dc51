use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collection::DEFAULT_SAVE_DELAY;
use crate::storage::{default_fallback_dir, default_notes_dir};

/// Runtime configuration for the notes store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickiesConfig {
    /// Preferred directory for `notes.json`.
    pub notes_dir: PathBuf,
    /// Used when `notes_dir` cannot be created.
    pub fallback_dir: PathBuf,
    /// Quiet period before a change is written to disk.
    pub save_delay_ms: u64,
}

impl Default for StickiesConfig {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            fallback_dir: default_fallback_dir(),
            save_delay_ms: DEFAULT_SAVE_DELAY.as_millis() as u64,
        }
    }
}

impl StickiesConfig {
    /// Defaults with any explicitly provided values layered on top.
    pub fn with_overrides(
        notes_dir: Option<PathBuf>,
        fallback_dir: Option<PathBuf>,
        save_delay_ms: Option<u64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            notes_dir: notes_dir.unwrap_or(defaults.notes_dir),
            fallback_dir: fallback_dir.unwrap_or(defaults.fallback_dir),
            save_delay_ms: save_delay_ms.unwrap_or(defaults.save_delay_ms),
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}
