use anyhow::Result;

use cutoff_tracker::cli::Command;
use cutoff_tracker::{handle_completions, handle_import, handle_report, handle_serve, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Import { file } => handle_import(file),
        Command::Report {
            season,
            regions,
            overlays,
            now,
            json,
        } => handle_report(season, regions.as_deref(), overlays.as_deref(), *now, *json),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
