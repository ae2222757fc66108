mod cli;
mod context;
mod dates;
mod encoding;
mod error;
mod export;
mod fingerprint;
mod fmt;
mod importer;
mod models;
mod session;
mod settings;
mod store;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Review => cli::review::run(),
        Commands::Groups => cli::groups::run(),
        Commands::Export { output } => cli::export::run(output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
