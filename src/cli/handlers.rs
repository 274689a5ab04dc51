use std::io::{self, Read};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{AddArgs, GlobalArgs};
use crate::collection::{parse_event, run, NoteCollection, NoteEvent, UiCommand};
use crate::config::StickiesConfig;
use crate::entity::Note;
use crate::error::Result;
use crate::notices::{format_notice, Notice};
use crate::storage::{self, NoteStore, StorageLocation};

fn config_from(global: &GlobalArgs) -> StickiesConfig {
    StickiesConfig::with_overrides(
        global.dir.clone(),
        global.fallback_dir.clone(),
        global.debounce_ms,
    )
}

fn resolve_location(config: &StickiesConfig) -> Result<StorageLocation> {
    storage::resolve(&config.notes_dir, &config.fallback_dir)
}

fn print_notices<'a>(notices: impl IntoIterator<Item = &'a Notice>) {
    for notice in notices {
        eprintln!("{}", format_notice(notice));
    }
}

fn summary_line(index: usize, note: &Note) -> String {
    let first_line = note.text.lines().next().unwrap_or("");
    format!(
        "{:>3}. ({}, {}) {}x{} {} {:>3}%  {}",
        index + 1,
        note.x,
        note.y,
        note.width,
        note.height,
        note.background,
        (note.opacity * 100.0).round() as i64,
        first_line
    )
}

pub fn handle_run(global: &GlobalArgs) -> Result<()> {
    let config = config_from(global);
    let location = resolve_location(&config)?;
    let store = NoteStore::new(&location);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let exit = runtime.block_on(async move {
        let (mut collection, restore_notices) =
            NoteCollection::initialize(store, config.save_delay());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_events(event_tx.clone()));
        tokio::spawn(quit_on_interrupt(event_tx));
        let writer = tokio::spawn(write_commands(ui_rx));

        // Restore problems are reported while starting up, the storage
        // warning after the restored notes are shown.
        for notice in &restore_notices {
            let _ = ui_tx.send(UiCommand::notify(notice));
        }

        let startup: Vec<Notice> = location.warning.iter().cloned().collect();
        let exit = run(&mut collection, event_rx, ui_tx, &startup).await;
        match writer.await {
            Ok(Err(e)) => warn!(error = %e, "failed to write ui commands"),
            Err(e) => warn!(error = %e, "ui writer task failed"),
            Ok(Ok(())) => {}
        }
        exit
    });

    // The stdin reader may still be blocked on a read; don't wait for it.
    runtime.shutdown_background();

    debug!(?exit, "stickies finished");
    Ok(())
}

async fn read_events(events: mpsc::UnboundedSender<NoteEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_event(line) {
            Ok(event) => {
                if events.send(event).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, "skipping malformed event"),
        }
    }
    // stdin closed: the UI is gone.
    let _ = events.send(NoteEvent::Quit);
}

async fn quit_on_interrupt(events: mpsc::UnboundedSender<NoteEvent>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        let _ = events.send(NoteEvent::Quit);
    }
}

async fn write_commands(mut commands: mpsc::UnboundedReceiver<UiCommand>) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(command) = commands.recv().await {
        let mut line = serde_json::to_string(&command)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
    }
    Ok(())
}

pub fn handle_list(global: &GlobalArgs, json: bool) -> Result<()> {
    let location = resolve_location(&config_from(global))?;
    let restored = NoteStore::new(&location).restore();
    print_notices(restored.notices.iter().chain(location.warning.iter()));

    if json {
        println!("{}", serde_json::to_string_pretty(&restored.notes)?);
    } else if restored.notes.is_empty() {
        println!("No notes.");
    } else {
        for (index, note) in restored.notes.iter().enumerate() {
            println!("{}", summary_line(index, note));
        }
    }

    Ok(())
}

pub fn handle_add(global: &GlobalArgs, args: AddArgs) -> Result<()> {
    let location = resolve_location(&config_from(global))?;
    let store = NoteStore::new(&location);
    let restored = store.restore();
    print_notices(restored.notices.iter().chain(location.warning.iter()));

    let mut note = Note::spawn_default();
    if args.stdin {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        note.text = text;
    } else if let Some(text) = args.text {
        note.text = text;
    }
    if let Some(bg) = args.bg {
        note.background = bg;
    }
    if let Some(opacity) = args.opacity {
        note.opacity = opacity;
    }
    note.x = args.x.unwrap_or(note.x);
    note.y = args.y.unwrap_or(note.y);
    note.width = args.width.unwrap_or(note.width);
    note.height = args.height.unwrap_or(note.height);
    let note = note.normalized();

    let mut notes = restored.notes;
    notes.push(note.clone());
    store.save(&notes)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!("Added {}", summary_line(notes.len() - 1, &note));
    }

    Ok(())
}

pub fn handle_path(global: &GlobalArgs, json: bool) -> Result<()> {
    let location = resolve_location(&config_from(global))?;
    let store = NoteStore::new(&location);

    if json {
        let value = serde_json::json!({
            "dir": location.dir,
            "notes": store.path(),
            "backup": store.backup_path(),
            "fallback": location.is_fallback(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("dir:    {}", location.dir.display());
        println!("notes:  {}", store.path().display());
        println!("backup: {}", store.backup_path().display());
    }
    print_notices(location.warning.iter());

    Ok(())
}
