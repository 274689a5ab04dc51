pub mod cli;
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod notices;
pub mod storage;

pub use collection::NoteCollection;
pub use entity::{Color, Note, NoteId};
pub use error::{Result, StickiesError};
pub use storage::NoteStore;
