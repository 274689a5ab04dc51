mod location;
mod note_store;

pub use location::{default_fallback_dir, default_notes_dir, resolve, StorageLocation};
pub use note_store::{NoteStore, RestoreSource, Restored, NOTES_FILE};
