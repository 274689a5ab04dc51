use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, warn};

use super::{Closed, NoteCollection};
use crate::entity::{Note, NoteChange, NoteId};
use crate::error::{Result, StickiesError};
use crate::notices::{Notice, Severity};

/// Lifecycle events delivered from the UI to the collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NoteEvent {
    /// The user asked for a new note.
    Spawn {
        #[serde(default)]
        note: Option<Note>,
    },
    Changed {
        id: NoteId,
        change: NoteChange,
    },
    /// The note's window was dismissed. Sent exactly once per note.
    Closed {
        id: NoteId,
    },
    /// The UI is shutting down for a reason other than closing the last note.
    Quit,
}

/// Instructions from the collection back to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    /// Open a window for this note.
    Show { id: NoteId, note: Note },
    /// Present a message to the user.
    Notify {
        severity: Severity,
        title: String,
        message: String,
    },
    /// Everything is saved; the process should terminate.
    Exit,
}

impl UiCommand {
    pub fn notify(notice: &Notice) -> Self {
        UiCommand::Notify {
            severity: notice.severity(),
            title: notice.title().to_string(),
            message: notice.message(),
        }
    }
}

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    LastNoteClosed,
    Quit,
    /// Every event sender was dropped.
    Disconnected,
}

/// Parse one line of the JSON event protocol.
pub fn parse_event(line: &str) -> Result<NoteEvent> {
    serde_json::from_str(line).map_err(|e| StickiesError::InvalidEvent(e.to_string()))
}

/// Drive the collection until the last note closes or the UI goes away.
///
/// Every restored note is shown first, then `notices` are sent, so warnings
/// appear on top of the open notes. Events and the debounce timer are handled on the calling task only, so at
/// most one save runs at a time and saves happen in request order. Pending
/// saves are flushed before returning.
pub async fn run(
    collection: &mut NoteCollection,
    mut events: mpsc::UnboundedReceiver<NoteEvent>,
    ui: mpsc::UnboundedSender<UiCommand>,
    notices: &[Notice],
) -> ExitReason {
    for live in collection.notes() {
        send(
            &ui,
            UiCommand::Show {
                id: live.id,
                note: live.note.clone(),
            },
        );
    }
    for notice in notices {
        send(&ui, UiCommand::notify(notice));
    }

    loop {
        let deadline = collection.save_deadline();
        tokio::select! {
            event = events.recv() => {
                let exit = match event {
                    Some(event) => handle_event(collection, event, &ui),
                    None => Some(shutdown(collection, &ui, ExitReason::Disconnected)),
                };
                if let Some(exit) = exit {
                    return exit;
                }
            }
            _ = wait_for(deadline) => {
                if let Some(Err(e)) = collection.poll_save(Instant::now()) {
                    report_save_failure(&ui, &e);
                }
            }
        }
    }
}

fn handle_event(
    collection: &mut NoteCollection,
    event: NoteEvent,
    ui: &mpsc::UnboundedSender<UiCommand>,
) -> Option<ExitReason> {
    let now = Instant::now();
    match event {
        NoteEvent::Spawn { note } => {
            let id = collection.spawn_note(note, now);
            if let Some(note) = collection.get(id) {
                send(
                    ui,
                    UiCommand::Show {
                        id,
                        note: note.clone(),
                    },
                );
            }
            None
        }
        NoteEvent::Changed { id, change } => {
            if let Err(e) = collection.update_note(id, change, now) {
                warn!(error = %e, "ignoring change");
            }
            None
        }
        NoteEvent::Closed { id } => match collection.close_note(id, now) {
            Ok(Closed::Remaining(_)) => None,
            Ok(Closed::Last(result)) => {
                if let Err(e) = result {
                    report_save_failure(ui, &e);
                }
                send(ui, UiCommand::Exit);
                Some(ExitReason::LastNoteClosed)
            }
            Err(e) => {
                warn!(error = %e, "ignoring close");
                None
            }
        },
        NoteEvent::Quit => Some(shutdown(collection, ui, ExitReason::Quit)),
    }
}

fn shutdown(
    collection: &mut NoteCollection,
    ui: &mpsc::UnboundedSender<UiCommand>,
    reason: ExitReason,
) -> ExitReason {
    if let Some(Err(e)) = collection.flush() {
        report_save_failure(ui, &e);
    }
    send(ui, UiCommand::Exit);
    debug!(?reason, "event loop finished");
    reason
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn report_save_failure(ui: &mpsc::UnboundedSender<UiCommand>, err: &StickiesError) {
    error!(error = %err, "save failed");
    send(
        ui,
        UiCommand::notify(&Notice::SaveFailed {
            reason: err.to_string(),
        }),
    );
}

fn send(ui: &mpsc::UnboundedSender<UiCommand>, command: UiCommand) {
    if ui.send(command).is_err() {
        debug!("ui channel closed, dropping command");
    }
}
