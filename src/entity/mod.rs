mod color;
mod note;

pub use color::Color;
pub use note::{
    clamp_opacity, clamp_size, Note, NoteChange, DEFAULT_NOTE_SIZE, DEFAULT_ORIGIN, MAX_OPACITY,
    MIN_NOTE_SIZE, MIN_OPACITY, SPAWN_JITTER,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// In-memory handle for a live note. Never persisted; a note's identity on
/// disk is only its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
