use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::entity::Color;

#[derive(Parser, Debug)]
#[command(name = "stickies")]
#[command(version, about = "Floating sticky notes with crash-safe persistence")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding notes.json [default: ~/.stickies]
    #[arg(long, global = true, env = "STICKIES_DIR", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Directory used when --dir cannot be created [default: <tmp>/stickies]
    #[arg(long, global = true, env = "STICKIES_FALLBACK_DIR", value_name = "DIR")]
    pub fallback_dir: Option<PathBuf>,

    /// Quiet period before changes are written, in milliseconds [default: 200]
    #[arg(long, global = true, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve notes to a UI over JSON lines on stdin/stdout
    Run,

    /// List saved notes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Append a note to the saved notes
    Add(AddArgs),

    /// Show where notes are stored
    Path {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Note text
    pub text: Option<String>,

    /// Read text from stdin
    #[arg(long, conflicts_with = "text")]
    pub stdin: bool,

    /// Background color as #rrggbb or #rgb
    #[arg(long, value_name = "COLOR")]
    pub bg: Option<Color>,

    /// Opacity between 0.1 and 1.0
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Left edge in screen coordinates
    #[arg(long, allow_negative_numbers = true)]
    pub x: Option<i32>,

    /// Top edge in screen coordinates
    #[arg(long, allow_negative_numbers = true)]
    pub y: Option<i32>,

    #[arg(long)]
    pub width: Option<i32>,

    #[arg(long)]
    pub height: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
