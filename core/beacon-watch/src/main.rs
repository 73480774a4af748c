//! Beacon watch process.
//!
//! The long-lived host for the reconciliation loop. A background thread
//! runs the loop on its own timer; the main thread prints the prioritized
//! snapshot on another. Presentation layers (TUI, HTTP) replace the
//! printing side and reuse everything else.

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use beacon_core::state::StateStore;
use beacon_core::{config, snapshot, CommandTmuxAdapter, ReconcileLoop};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const STORE_RETRY_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "beacon-watch")]
#[command(about = "Beacon session dashboard (plain-text view)")]
#[command(version)]
struct Cli {
    /// Reconciliation tick period in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_ms: u64,

    /// Snapshot refresh period in milliseconds
    #[arg(long, default_value_t = 500)]
    refresh_ms: u64,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let store = open_store_with_retry();
    info!(root = %store.root().display(), "Beacon watch started");

    let shutdown = Arc::new(AtomicBool::new(false));
    let poll_flag = Arc::clone(&shutdown);
    let poll_store = store.clone();
    let poll_period = Duration::from_millis(cli.poll_ms);
    thread::spawn(move || {
        ReconcileLoop::new(poll_store, CommandTmuxAdapter).run(poll_period, &poll_flag);
    });

    loop {
        render(&store);
        thread::sleep(Duration::from_millis(cli.refresh_ms));
    }
}

/// Blocks until the store root is usable. Unavailability is reported once,
/// then retried quietly.
fn open_store_with_retry() -> StateStore {
    let mut reported = false;
    loop {
        let result = config::data_root().and_then(|root| StateStore::open(&root));
        match result {
            Ok(store) => return store,
            Err(e) => {
                if !reported {
                    error!(error = %e, "Session store unavailable; retrying");
                    reported = true;
                }
                thread::sleep(Duration::from_secs(STORE_RETRY_SECS));
            }
        }
    }
}

fn render(store: &StateStore) {
    let records = snapshot(store);

    // Full re-render: clear and repaint, no incremental diffing.
    print!("\x1b[2J\x1b[H");
    if records.is_empty() {
        println!("no active sessions");
        return;
    }
    for record in records {
        let marker = if record.state.needs_attention() {
            "!"
        } else {
            " "
        };
        println!(
            "{} {:<10} {:<12} {:<28} {}",
            marker,
            record.state.as_str(),
            record.window_label.as_deref().unwrap_or("-"),
            record.cwd,
            record.current_action.as_deref().unwrap_or("")
        );
        if let Some(prompt) = &record.prompt_text {
            println!("      ⎿ {}", prompt);
        }
    }
}

fn init_logging() {
    let debug_enabled = env::var("BEACON_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
