//! Periodic reconciliation loop.
//!
//! The one place where the authoritative store is combined with the
//! secondary pane-text signal and with process liveness. Each tick:
//!
//! 1. List all records.
//! 2. For records with a terminal target, capture the pane and run the
//!    interruption detector; a fresh interrupt drops the record back to
//!    idle. (If the hook protocol ever grows a real "user interrupted"
//!    event, this pass is one call-site deletion.)
//! 3. On a slower cadence, garbage-collect records whose process died.
//!
//! Every external call in here is best-effort: a failed capture or a
//! store scan error is logged and skipped, never fatal to the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::detect::detect_interruption;
use crate::process;
use crate::state::{SessionPatch, SessionState, StateStore};
use crate::tmux::TmuxAdapter;

/// Default spacing between liveness GC passes.
const GC_INTERVAL: Duration = Duration::from_secs(5);

pub struct ReconcileLoop<A: TmuxAdapter> {
    store: StateStore,
    tmux: A,
    gc_interval: Duration,
    last_gc: Option<Instant>,
}

impl<A: TmuxAdapter> ReconcileLoop<A> {
    pub fn new(store: StateStore, tmux: A) -> Self {
        ReconcileLoop {
            store,
            tmux,
            gc_interval: GC_INTERVAL,
            last_gc: None,
        }
    }

    pub fn with_gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval;
        self
    }

    /// One maintenance pass. Safe to call from a timer or a test.
    pub fn tick(&mut self) {
        self.interruption_pass();

        let gc_due = self
            .last_gc
            .map(|at| at.elapsed() >= self.gc_interval)
            .unwrap_or(true);
        if gc_due {
            self.liveness_pass();
            self.last_gc = Some(Instant::now());
        }
    }

    /// Runs `tick` every `period` until the shutdown flag is set. Each store
    /// operation is atomic, so stopping between ticks never leaves a
    /// partial write.
    pub fn run(mut self, period: Duration, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
            std::thread::sleep(period);
        }
        tracing::info!("Reconciliation loop stopped");
    }

    fn interruption_pass(&self) {
        let records = match self.store.list() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Store scan failed; retrying next tick");
                return;
            }
        };

        for record in records {
            let Some(target) = &record.target else {
                continue;
            };
            // Already idle: nothing to correct, and updating would churn
            // the record's freshness for no reason.
            if record.state == SessionState::Idle {
                continue;
            }
            let Some(pane) = self.tmux.capture_pane(target) else {
                continue;
            };
            if let Some(signal) = detect_interruption(&pane) {
                tracing::debug!(
                    session = %record.session_id,
                    target = %target,
                    signal = ?signal,
                    "Pane shows user interruption"
                );
                if let Err(e) = self.store.update(&record.session_id, &SessionPatch::idle()) {
                    tracing::warn!(session = %record.session_id, error = %e, "Failed to reset interrupted session");
                }
            }
        }
    }

    fn liveness_pass(&self) {
        match self.store.delete_where_pid(|pid| !process::is_alive(pid)) {
            Ok(removed) if removed > 0 => {
                tracing::info!(removed, "Garbage-collected dead sessions");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Liveness GC failed; retrying next pass");
            }
        }
    }
}
