// src/entity/note.rs
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Color;

/// Smallest width or height a note may have.
pub const MIN_NOTE_SIZE: i32 = 128;
pub const MIN_OPACITY: f64 = 0.1;
pub const MAX_OPACITY: f64 = 1.0;

/// Side length of a freshly spawned note.
pub const DEFAULT_NOTE_SIZE: i32 = 256;
/// Anchor for freshly spawned notes before jitter is applied.
pub const DEFAULT_ORIGIN: (i32, i32) = (140, 140);
/// Maximum distance a fresh note is nudged from [`DEFAULT_ORIGIN`] on each axis.
pub const SPAWN_JITTER: i32 = 120;

// Values used when a persisted record omits a field.
const RECORD_DEFAULT_POS: i64 = 140;
const RECORD_DEFAULT_SIZE: i64 = 300;

/// The persisted and live state of one sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NoteRecord")]
pub struct Note {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "w")]
    pub width: i32,
    #[serde(rename = "h")]
    pub height: i32,
    pub text: String,
    #[serde(rename = "bg")]
    pub background: Color,
    pub opacity: f64,
}

impl Note {
    /// A blank note at the default origin, nudged by a random offset so
    /// repeated fresh starts do not stack windows exactly on top of each other.
    pub fn spawn_default() -> Self {
        let mut rng = rand::thread_rng();
        let dx = rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
        let dy = rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
        Self {
            x: DEFAULT_ORIGIN.0 + dx,
            y: DEFAULT_ORIGIN.1 + dy,
            ..Self::default()
        }
    }

    /// Clamp size and opacity into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.width = clamp_size(self.width as i64);
        self.height = clamp_size(self.height as i64);
        self.opacity = clamp_opacity(self.opacity);
        self
    }

    /// Apply a single attribute change coming from the UI.
    pub fn apply(&mut self, change: NoteChange) {
        match change {
            NoteChange::Text(text) => self.text = text,
            NoteChange::Moved { x, y } => {
                self.x = x;
                self.y = y;
            }
            NoteChange::Resized { w, h } => {
                self.width = clamp_size(w as i64);
                self.height = clamp_size(h as i64);
            }
            NoteChange::Recolored(color) => self.background = color,
            NoteChange::Opacity(value) => self.opacity = clamp_opacity(value),
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self {
            x: DEFAULT_ORIGIN.0,
            y: DEFAULT_ORIGIN.1,
            width: DEFAULT_NOTE_SIZE,
            height: DEFAULT_NOTE_SIZE,
            text: String::new(),
            background: Color::DEFAULT,
            opacity: MAX_OPACITY,
        }
    }
}

/// A single observable mutation reported by the UI for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteChange {
    Text(String),
    Moved { x: i32, y: i32 },
    Resized { w: i32, h: i32 },
    Recolored(Color),
    Opacity(f64),
}

/// Lenient on-disk shape of a note. Every field is optional; values are
/// clamped or defaulted when converted into a [`Note`].
#[derive(Debug, Default, Deserialize)]
struct NoteRecord {
    x: Option<i64>,
    y: Option<i64>,
    w: Option<i64>,
    h: Option<i64>,
    text: Option<String>,
    // Any JSON value; only a parseable string yields a custom color.
    bg: Option<serde_json::Value>,
    opacity: Option<f64>,
}

impl From<NoteRecord> for Note {
    fn from(record: NoteRecord) -> Self {
        Self {
            x: clamp_coord(record.x.unwrap_or(RECORD_DEFAULT_POS)),
            y: clamp_coord(record.y.unwrap_or(RECORD_DEFAULT_POS)),
            width: clamp_size(record.w.unwrap_or(RECORD_DEFAULT_SIZE)),
            height: clamp_size(record.h.unwrap_or(RECORD_DEFAULT_SIZE)),
            text: record.text.unwrap_or_default(),
            background: Color::parse_or_default(record.bg.as_ref().and_then(|bg| bg.as_str())),
            opacity: clamp_opacity(record.opacity.unwrap_or(MAX_OPACITY)),
        }
    }
}

/// Raise a width or height to [`MIN_NOTE_SIZE`], saturating at `i32::MAX`.
pub fn clamp_size(value: i64) -> i32 {
    value.clamp(MIN_NOTE_SIZE as i64, i32::MAX as i64) as i32
}

/// Clamp opacity to `[MIN_OPACITY, MAX_OPACITY]`. NaN maps to fully opaque.
pub fn clamp_opacity(value: f64) -> f64 {
    if value.is_nan() {
        return MAX_OPACITY;
    }
    value.clamp(MIN_OPACITY, MAX_OPACITY)
}

fn clamp_coord(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
