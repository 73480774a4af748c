//! # beacon-core
//!
//! Session-state reconciliation engine for Beacon, a terminal dashboard
//! that tracks live coding-agent sessions.
//!
//! State arrives as lifecycle events fired by agent hooks, one short-lived
//! process per event, with no delivery guarantee. This crate keeps the
//! durable record of each session, corrects it against captured pane text
//! for the one transition hooks cannot report (user interruption), garbage
//! collects records whose process died, and projects a prioritized snapshot
//! for consumers.
//!
//! ## Design Principles
//!
//! - **Synchronous**: no async runtime. The loop and consumers run on plain
//!   timers; clients wrap with async if they need to.
//! - **Cross-process safety via the filesystem**: writers are separate OS
//!   processes, so atomicity lives in the store's temp-file + rename
//!   primitive, never in in-process locks.
//! - **Graceful degradation**: missing tmux, corrupt records, and lost
//!   events all degrade to "no signal", never to failure.
//! - **Explicit handles**: every component takes its [`state::StateStore`]
//!   at construction; there is no global store.

pub mod config;
pub mod detect;
pub mod error;
pub mod poll;
pub mod process;
pub mod snapshot;
pub mod state;
pub mod tmux;

pub use detect::{detect_interruption, Interruption};
pub use error::{BeaconError, Result};
pub use poll::ReconcileLoop;
pub use snapshot::snapshot;
pub use state::{
    apply_event, EventContext, HookEvent, HookInput, SessionPatch, SessionRecord, SessionState,
    StateStore, TerminalTarget,
};
pub use tmux::{CommandTmuxAdapter, TmuxAdapter};
