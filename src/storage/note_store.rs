use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::entity::Note;
use crate::error::{Result, StickiesError};
use crate::notices::Notice;
use crate::storage::StorageLocation;

pub const NOTES_FILE: &str = "notes.json";
const BACKUP_SUFFIX: &str = ".bak";
const TEMP_SUFFIX: &str = ".tmp";
const BACKUP_TEMP_SUFFIX: &str = ".bak.tmp";

/// Top-level shape of the notes file when reading.
#[derive(Debug, Deserialize)]
struct NotesDocument {
    #[serde(default)]
    notes: Vec<Note>,
}

/// Borrowing counterpart of [`NotesDocument`] used when writing.
#[derive(Serialize)]
struct NotesDocumentRef<'a> {
    notes: &'a [Note],
}

/// Which file the restored notes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// No notes file existed yet.
    Fresh,
    Primary,
    Backup,
    /// Neither the primary file nor its backup could be read.
    Failed,
}

/// Outcome of [`NoteStore::restore`].
#[derive(Debug)]
pub struct Restored {
    pub notes: Vec<Note>,
    pub source: RestoreSource,
    pub notices: Vec<Notice>,
}

/// Crash-safe JSON persistence for the full set of notes.
///
/// Writes go to a `.tmp` sibling which is then renamed over the live file,
/// so the live file is never observed half-written. After each successful
/// replace the live file is copied to a `.bak` sibling the same way, which is
/// used to recover when the live file cannot be read.
#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    /// Store `notes.json` inside a resolved storage location.
    pub fn new(location: &StorageLocation) -> Self {
        Self::at(location.dir.join(NOTES_FILE))
    }

    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(BACKUP_SUFFIX)
    }

    pub fn temp_path(&self) -> PathBuf {
        self.sibling(TEMP_SUFFIX)
    }

    fn backup_temp_path(&self) -> PathBuf {
        self.sibling(BACKUP_TEMP_SUFFIX)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(NOTES_FILE));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Persist a full snapshot of `notes`.
    ///
    /// On error the previous live file is left exactly as it was.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        self.stage(notes)?;
        self.commit()?;
        info!(count = notes.len(), path = %self.path.display(), "saved notes");
        Ok(())
    }

    /// Write the serialized snapshot to the temp file without touching the
    /// live file.
    fn stage(&self, notes: &[Note]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&NotesDocumentRef { notes })?;
        json.push('\n');

        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, json.as_bytes()) {
            discard(&temp);
            return Err(e.into());
        }
        debug!(path = %temp.display(), bytes = json.len(), "staged notes");
        Ok(())
    }

    /// Atomically replace the live file with the staged temp file, then
    /// refresh the backup.
    fn commit(&self) -> Result<()> {
        let temp = self.temp_path();
        if let Err(e) = fs::rename(&temp, &self.path) {
            discard(&temp);
            return Err(e.into());
        }

        // Best-effort: the live file is already committed at this point.
        if let Err(e) = self.refresh_backup() {
            warn!(path = %self.backup_path().display(), error = %e, "failed to refresh backup");
        }
        Ok(())
    }

    /// Copy the live file next to the backup, then rename it into place so
    /// the previous backup survives an interrupted copy.
    fn refresh_backup(&self) -> io::Result<()> {
        let temp = self.backup_temp_path();
        let result = File::open(&self.path).and_then(|mut live| {
            let mut staged = File::create(&temp)?;
            io::copy(&mut live, &mut staged)?;
            staged.sync_all()?;
            fs::rename(&temp, self.backup_path())
        });
        if result.is_err() {
            discard(&temp);
        }
        result
    }

    /// Read the live file. `Ok(None)` means it does not exist yet.
    pub fn load(&self) -> Result<Option<Vec<Note>>> {
        read_document(&self.path)
    }

    /// Read the backup file. `Ok(None)` means there is no backup.
    pub fn load_backup(&self) -> Result<Option<Vec<Note>>> {
        read_document(&self.backup_path())
    }

    /// Load notes for startup, recovering from the backup when the live
    /// file is unreadable or corrupt.
    pub fn restore(&self) -> Restored {
        let err = match self.load() {
            Ok(None) => {
                debug!(path = %self.path.display(), "no notes file, starting fresh");
                return Restored {
                    notes: Vec::new(),
                    source: RestoreSource::Fresh,
                    notices: Vec::new(),
                };
            }
            Ok(Some(notes)) => {
                info!(count = notes.len(), "loaded notes");
                return Restored {
                    notes,
                    source: RestoreSource::Primary,
                    notices: Vec::new(),
                };
            }
            Err(e) => e,
        };

        warn!(error = %err, "could not load notes, trying backup");
        let mut notices = vec![Notice::LoadFailed {
            reason: err.to_string(),
        }];

        let backup = self.backup_path();
        let (notes, source) = match self.load_backup() {
            Ok(Some(notes)) => {
                info!(count = notes.len(), path = %backup.display(), "restored notes from backup");
                notices.push(Notice::BackupRestored { path: backup });
                (notes, RestoreSource::Backup)
            }
            Ok(None) => {
                error!(path = %backup.display(), "no backup available");
                notices.push(Notice::RestoreFailed { reason: None });
                (Vec::new(), RestoreSource::Failed)
            }
            Err(e) => {
                error!(error = %e, "backup restore failed");
                notices.push(Notice::RestoreFailed {
                    reason: Some(e.to_string()),
                });
                (Vec::new(), RestoreSource::Failed)
            }
        };

        Restored {
            notes,
            source,
            notices,
        }
    }
}

fn read_document(path: &Path) -> Result<Option<Vec<Note>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StickiesError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let corrupt = |source| StickiesError::Corrupt {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(&text).map_err(corrupt)?;
    if !value.is_object() {
        return Err(corrupt(serde::de::Error::custom(
            "expected a JSON object at the top level",
        )));
    }
    let document: NotesDocument = serde_json::from_value(value).map_err(corrupt)?;
    Ok(Some(document.notes))
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove temp file");
        }
    }
}
