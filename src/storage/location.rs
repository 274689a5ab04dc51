use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, StickiesError};
use crate::notices::Notice;

const NOTES_DIR: &str = ".stickies";
const FALLBACK_DIR: &str = "stickies";

/// Where notes live for this run, decided once at startup.
#[derive(Debug, Clone)]
pub struct StorageLocation {
    pub dir: PathBuf,
    /// Set when the preferred directory could not be used.
    pub warning: Option<Notice>,
}

impl StorageLocation {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// `~/.stickies`, or `./.stickies` when no home directory is known.
pub fn default_notes_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(NOTES_DIR)
}

/// `<system temp>/stickies`.
pub fn default_fallback_dir() -> PathBuf {
    std::env::temp_dir().join(FALLBACK_DIR)
}

/// Create the preferred directory, or the fallback if that fails.
///
/// Falling back is not an error but yields a warning notice for the user.
/// Failing to create either directory is fatal.
pub fn resolve(preferred: &Path, fallback: &Path) -> Result<StorageLocation> {
    let primary_error = match fs::create_dir_all(preferred) {
        Ok(()) => {
            debug!(dir = %preferred.display(), "using notes directory");
            return Ok(StorageLocation {
                dir: preferred.to_path_buf(),
                warning: None,
            });
        }
        Err(e) => e,
    };

    let reason = if primary_error.kind() == std::io::ErrorKind::PermissionDenied {
        "permission denied".to_string()
    } else {
        primary_error.to_string()
    };

    if let Err(fallback_error) = fs::create_dir_all(fallback) {
        return Err(StickiesError::StorageUnavailable {
            primary: preferred.to_path_buf(),
            primary_error,
            fallback: fallback.to_path_buf(),
            fallback_error,
        });
    }

    warn!(
        preferred = %preferred.display(),
        fallback = %fallback.display(),
        %reason,
        "notes directory unavailable, using fallback"
    );

    Ok(StorageLocation {
        dir: fallback.to_path_buf(),
        warning: Some(Notice::StorageFallback {
            preferred: preferred.to_path_buf(),
            fallback: fallback.to_path_buf(),
            reason,
        }),
    })
}
