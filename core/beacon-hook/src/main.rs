//! beacon-hook: CLI hook handler for Beacon session state tracking.
//!
//! Invoked by the coding agent's hooks, one short-lived process per
//! lifecycle event. Reads the event as JSON from stdin and applies it to
//! the session store. Exit codes: 0 on success (including silent no-ops),
//! 2 for an unrecognized event name (protocol mismatch), 1 otherwise.

mod handle;
mod logging;

use beacon_core::BeaconError;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "beacon-hook")]
#[command(about = "Beacon session state tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle a hook event (reads JSON from stdin)
    Handle,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle => {
            if let Err(e) = handle::run() {
                tracing::error!(error = %e, "beacon-hook handle failed");
                let code = match e {
                    BeaconError::UnknownEvent(_) => 2,
                    _ => 1,
                };
                std::process::exit(code);
            }
        }
    }
}
