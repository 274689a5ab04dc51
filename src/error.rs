use std::path::PathBuf;

use thiserror::Error;

use crate::entity::NoteId;

#[derive(Error, Debug)]
pub enum StickiesError {
    #[error(
        "Unable to create a writable notes directory.\n\
         Primary location: {}\nFailed with: {primary_error}\n\
         Fallback location: {}\nFailed with: {fallback_error}",
        .primary.display(),
        .fallback.display()
    )]
    StorageUnavailable {
        primary: PathBuf,
        primary_error: std::io::Error,
        fallback: PathBuf,
        fallback_error: std::io::Error,
    },

    #[error("Could not read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StickiesError>;
