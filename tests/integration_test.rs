use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn stickies_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stickies"));
    cmd.env("STICKIES_DIR", dir.join("notes"))
        .env("STICKIES_FALLBACK_DIR", dir.join("fallback"))
        .env_remove("RUST_LOG");
    cmd
}

fn list_json(dir: &Path) -> Vec<Value> {
    let output = stickies_cmd(dir).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice::<Vec<Value>>(&output.stdout).unwrap()
}

#[test]
fn test_list_without_notes() {
    let tmp = TempDir::new().unwrap();

    let output = stickies_cmd(tmp.path()).args(["list"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No notes."));
    // Listing alone never creates the notes file.
    assert!(!tmp.path().join("notes/notes.json").exists());
}

#[test]
fn test_add_then_list() {
    let tmp = TempDir::new().unwrap();

    let output = stickies_cmd(tmp.path())
        .args(["add", "buy milk", "--bg=#AABBCC", "--opacity=0.05", "--width=40"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added"));
    assert!(stdout.contains("buy milk"));

    let output = stickies_cmd(tmp.path())
        .args(["add", "call mom", "--x=-40", "--y=12"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let notes = list_json(tmp.path());
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["text"], "buy milk");
    assert_eq!(notes[0]["bg"], "#aabbcc");
    assert_eq!(notes[0]["opacity"], 0.1);
    assert_eq!(notes[0]["w"], 128);
    assert_eq!(notes[1]["text"], "call mom");
    assert_eq!(notes[1]["x"], -40);
    assert_eq!(notes[1]["y"], 12);

    assert!(tmp.path().join("notes/notes.json.bak").exists());
    assert!(!tmp.path().join("notes/notes.json.tmp").exists());
}

#[test]
fn test_add_from_stdin() {
    let tmp = TempDir::new().unwrap();

    let mut child = stickies_cmd(tmp.path())
        .args(["add", "--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"line one\nline two")
        .unwrap();
    assert!(child.wait().unwrap().success());

    let notes = list_json(tmp.path());
    assert_eq!(notes[0]["text"], "line one\nline two");
}

#[test]
fn test_add_rejects_invalid_color() {
    let tmp = TempDir::new().unwrap();

    let output = stickies_cmd(tmp.path())
        .args(["add", "x", "--bg=yellowish"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!tmp.path().join("notes/notes.json").exists());
}

#[test]
fn test_corrupt_notes_restored_from_backup() {
    let tmp = TempDir::new().unwrap();
    let output = stickies_cmd(tmp.path())
        .args(["add", "precious"])
        .output()
        .unwrap();
    assert!(output.status.success());

    fs::write(tmp.path().join("notes/notes.json"), "{\"notes\": [").unwrap();

    let output = stickies_cmd(tmp.path())
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let notes: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["text"], "precious");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Load Error"));
    assert!(stderr.contains("Backup Restored"));
}

#[test]
fn test_fallback_directory_used_with_warning() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes"), "a file, not a directory").unwrap();

    let output = stickies_cmd(tmp.path())
        .args(["add", "elsewhere"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Storage Warning"));
    assert!(tmp.path().join("fallback/notes.json").exists());
}

#[test]
fn test_no_writable_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes"), "blocked").unwrap();
    fs::write(tmp.path().join("fallback"), "blocked too").unwrap();

    let output = stickies_cmd(tmp.path()).args(["list"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unable to create a writable notes directory"));
}

#[test]
fn test_path_json() {
    let tmp = TempDir::new().unwrap();

    let output = stickies_cmd(tmp.path())
        .args(["path", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["fallback"], false);
    assert!(value["notes"].as_str().unwrap().ends_with("notes.json"));
    assert!(value["backup"].as_str().unwrap().ends_with("notes.json.bak"));
}

fn read_command(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Value {
    let line = lines.next().expect("stdout closed early").unwrap();
    serde_json::from_str(&line).unwrap()
}

#[test]
fn test_run_quit_flushes_pending_changes() {
    let tmp = TempDir::new().unwrap();
    for text in ["first", "second"] {
        let output = stickies_cmd(tmp.path()).args(["add", text]).output().unwrap();
        assert!(output.status.success());
    }

    let mut child = stickies_cmd(tmp.path())
        .args(["run", "--debounce-ms=60000"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    let first = read_command(&mut lines);
    let second = read_command(&mut lines);
    assert_eq!(first["command"], "show");
    assert_eq!(first["note"]["text"], "first");
    assert_eq!(second["note"]["text"], "second");

    let events = [
        serde_json::json!({"event": "changed", "id": first["id"], "change": {"text": "edited"}}),
        serde_json::json!({"event": "closed", "id": second["id"]}),
        serde_json::json!({"event": "quit"}),
    ];
    for event in events {
        writeln!(stdin, "{}", event).unwrap();
    }
    stdin.flush().unwrap();

    let exit = read_command(&mut lines);
    assert_eq!(exit["command"], "exit");
    assert!(child.wait().unwrap().success());

    let notes = list_json(tmp.path());
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["text"], "edited");
}

#[test]
fn test_run_closing_last_note_exits() {
    let tmp = TempDir::new().unwrap();

    let mut child = stickies_cmd(tmp.path())
        .args(["run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    // Fresh start: exactly one default note.
    let shown = read_command(&mut lines);
    assert_eq!(shown["command"], "show");
    assert_eq!(shown["note"]["w"], 256);
    assert_eq!(shown["note"]["bg"], "#fff79a");

    writeln!(stdin, "this is not json").unwrap();
    writeln!(stdin, "{}", serde_json::json!({"event": "closed", "id": shown["id"]})).unwrap();
    stdin.flush().unwrap();

    let exit = read_command(&mut lines);
    assert_eq!(exit["command"], "exit");
    assert!(child.wait().unwrap().success());

    let saved = fs::read_to_string(tmp.path().join("notes/notes.json")).unwrap();
    let value: Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value, serde_json::json!({"notes": []}));
}

#[test]
fn test_run_storage_warning_follows_notes() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("notes"), "a file, not a directory").unwrap();

    let mut child = stickies_cmd(tmp.path())
        .args(["run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    let shown = read_command(&mut lines);
    assert_eq!(shown["command"], "show");

    let warning = read_command(&mut lines);
    assert_eq!(warning["command"], "notify");
    assert_eq!(warning["severity"], "warning");
    assert_eq!(warning["title"], "Storage Warning");

    writeln!(stdin, "{}", serde_json::json!({"event": "closed", "id": shown["id"]})).unwrap();
    stdin.flush().unwrap();

    let exit = read_command(&mut lines);
    assert_eq!(exit["command"], "exit");
    assert!(child.wait().unwrap().success());
    assert!(tmp.path().join("fallback/notes.json").exists());
}
