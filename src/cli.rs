use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "cutoff-tracker backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Load scraped snapshot rows from a JSON file into the database
    Import {
        /// JSON array of {timestamp, region, faction?, score, rank?}
        file: PathBuf,
    },
    /// Print the aggregated view of a season without starting the server
    Report {
        /// Season slug, e.g. df-season-3
        season: String,
        /// Comma separated regions (defaults to all)
        #[arg(short, long)]
        regions: Option<String>,
        /// Comma separated overlays: rank, affixes
        #[arg(short, long)]
        overlays: Option<String>,
        /// Evaluate as of this time, in milliseconds since epoch
        #[arg(long)]
        now: Option<i64>,
        /// Print the full payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn print_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}
