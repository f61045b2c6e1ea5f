//! autoformat-replay: runs an editor event trace through the reformat
//! scheduler against a simulated editor and prints what the editor was asked
//! to do.
//!
//! ```text
//! autoformat-replay trace.jsonl --config autoformat.toml
//! ```

mod logging;
mod replay;
mod sim_host;
mod trace;

use clap::Parser;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "autoformat-replay")]
#[command(about = "Replay an editor event trace through the reformat scheduler")]
#[command(version)]
struct Cli {
    /// JSON-lines trace file
    #[arg(value_name = "TRACE")]
    trace: PathBuf,

    /// Scheduler config (defaults to ~/.autoformat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init(cli.log_dir.as_deref());

    let config = match autoformat_core::load_config(cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load scheduler config");
            std::process::exit(1);
        }
    };

    let entries = match trace::load_trace(&cli.trace) {
        Ok(entries) => entries,
        Err(err) => {
            error!(error = %err, "Failed to load trace");
            std::process::exit(1);
        }
    };

    let summary = match replay::run(&entries, config) {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %err, "Replay failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            error!(error = %err, "Failed to serialize replay summary");
            std::process::exit(1);
        }
    }
}
