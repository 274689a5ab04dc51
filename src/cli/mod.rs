mod commands;
mod handlers;

pub use commands::{AddArgs, Cli, Commands, GlobalArgs};
pub use handlers::{handle_add, handle_list, handle_path, handle_run};
