mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "orderscript",
    version,
    about = "Preview, validate and commit pasted Arabic order scripts"
)]
struct Cli {
    /// Debug logging on stderr, and full reasoning in `check` output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a script into orders and extract fields (no catalog lookups)
    Parse {
        /// Path to the script text file, or "-" for stdin
        script: PathBuf,

        /// Import settings JSON (defaults apply when omitted)
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Highest order number already in use; new orders continue after it
        #[arg(long, default_value_t = 0)]
        highest: u64,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Resolve products and prices, compute totals and show every flag
    Check {
        /// Path to the script text file, or "-" for stdin
        script: PathBuf,

        /// Catalog snapshot JSON
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,

        /// Import settings JSON (defaults apply when omitted)
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Highest order number already in use; new orders continue after it
        #[arg(long, default_value_t = 0)]
        highest: u64,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Gate the batch and write order-creation payloads
    Commit {
        /// Path to the script text file, or "-" for stdin
        script: PathBuf,

        /// Catalog snapshot JSON
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,

        /// Import settings JSON (defaults apply when omitted)
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Highest order number already in use; new orders continue after it
        #[arg(long, default_value_t = 0)]
        highest: u64,

        /// Accept warnings on this order (repeatable)
        #[arg(long = "confirm", value_name = "SEQ")]
        confirm: Vec<u64>,

        /// Accept warnings on every order
        #[arg(long)]
        confirm_all: bool,

        /// Where to write the payload array
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: PathBuf,
    },
    /// Inspect and validate import settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the settings file format with field descriptions and example
    Schema,
    /// Validate a settings file
    Validate {
        /// Path to settings JSON
        file: PathBuf,
    },
    /// Print the default settings as JSON
    Defaults,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            script,
            settings,
            highest,
            output,
        } => commands::parse::run(&script, settings.as_deref(), highest, &output),
        Commands::Check {
            script,
            catalog,
            settings,
            highest,
            output,
        } => commands::check::run(
            &script,
            &catalog,
            settings.as_deref(),
            highest,
            &output,
            cli.verbose,
        ),
        Commands::Commit {
            script,
            catalog,
            settings,
            highest,
            confirm,
            confirm_all,
            out,
        } => commands::commit::run(
            &script,
            &catalog,
            settings.as_deref(),
            highest,
            confirm,
            confirm_all,
            &out,
        ),
        Commands::Settings { action } => match action {
            SettingsAction::Schema => commands::settings::schema(),
            SettingsAction::Validate { file } => commands::settings::validate(&file),
            SettingsAction::Defaults => commands::settings::defaults(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays clean. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
