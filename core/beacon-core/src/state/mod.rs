//! Session state tracking.
//!
//! The engine's write side. Lifecycle events arrive one per short-lived hook
//! process; each invocation reads the existing record, reconciles the event
//! against it, and replaces the record file atomically. The long-lived
//! polling process is the only other writer.
//!
//! ```text
//! agent hook → event::HookInput → reconcile::apply_event → store::StateStore
//! ```
//!
//! - [`types`]: record, state enum, terminal target, partial-update patch
//! - [`store`]: per-record JSON files with atomic replace
//! - [`event`]: hook payload parsing and the internal event vocabulary
//! - [`reconcile`]: the session state machine

pub mod event;
pub mod reconcile;
pub mod store;
pub mod types;

pub use event::{describe_tool, HookEvent, HookInput, NotificationKind};
pub use reconcile::{apply_event, reconcile, EventContext, Reconciled};
pub use store::StateStore;
pub use types::{SessionPatch, SessionRecord, SessionState, TerminalTarget};
