//! User-facing notices raised by the persistence layer.
//!
//! The core never shows dialogs itself. It collects [`Notice`]s and hands
//! them to whatever front end is attached, which decides how to present them.

use std::path::PathBuf;

use serde::Serialize;

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Something the user should be told about, once.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The preferred notes directory was unusable; a fallback is in use.
    StorageFallback {
        preferred: PathBuf,
        fallback: PathBuf,
        reason: String,
    },
    /// The primary notes file exists but could not be read.
    LoadFailed { reason: String },
    /// Notes were recovered from the backup file.
    BackupRestored { path: PathBuf },
    /// The backup could not be used either. `reason` is `None` when no
    /// backup file exists.
    RestoreFailed { reason: Option<String> },
    /// Writing notes to disk failed; the previous file is intact.
    SaveFailed { reason: String },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::StorageFallback { .. } | Notice::LoadFailed { .. } => Severity::Warning,
            Notice::BackupRestored { .. } => Severity::Info,
            Notice::RestoreFailed { .. } | Notice::SaveFailed { .. } => Severity::Error,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notice::StorageFallback { .. } => "Storage Warning",
            Notice::LoadFailed { .. } => "Load Error",
            Notice::BackupRestored { .. } => "Backup Restored",
            Notice::RestoreFailed { .. } => "Restore Error",
            Notice::SaveFailed { .. } => "Save Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::StorageFallback {
                preferred,
                fallback,
                reason,
            } => format!(
                "Could not use {} ({}). Notes will be saved in {}.",
                preferred.display(),
                reason,
                fallback.display()
            ),
            Notice::LoadFailed { reason } => format!(
                "Could not read saved notes ({}).\n\nAttempting to restore the last backup.",
                reason
            ),
            Notice::BackupRestored { path } => {
                format!("Notes were restored from {}.", path.display())
            }
            Notice::RestoreFailed { reason: None } => {
                "No backup was available. A new note will be created.".to_string()
            }
            Notice::RestoreFailed {
                reason: Some(reason),
            } => format!("Failed to restore notes from backup: {}", reason),
            Notice::SaveFailed { reason } => reason.clone(),
        }
    }
}

/// Format a notice as a single block of text for terminals and logs.
pub fn format_notice(notice: &Notice) -> String {
    let label = match notice.severity() {
        Severity::Info => "Info",
        Severity::Warning => "Warning",
        Severity::Error => "Error",
    };
    format!("{} ({}): {}", label, notice.title(), notice.message())
}
