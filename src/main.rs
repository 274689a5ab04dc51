use clap::Parser;
use stickies::cli::{handle_add, handle_list, handle_path, handle_run, Cli, Commands};
use stickies::logging;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(&cli.global),
        Commands::List { json } => handle_list(&cli.global, json),
        Commands::Add(args) => handle_add(&cli.global, args),
        Commands::Path { json } => handle_path(&cli.global, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
