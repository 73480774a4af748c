//! Maps lifecycle events to session record changes.
//!
//! [`reconcile`] is the pure state machine: one incoming event plus the
//! existing record (if any) in, a record change out. Events that need an
//! existing record are silent no-ops when none exists — delivery is
//! at-most-once and a lost SessionStart must not cascade into failures.
//!
//! ```text
//! SessionStart                 → idle   (creates; supersedes same-target records)
//! UserPromptSubmit             → busy   "Thinking…"
//! PreToolUse                   → busy   tool description
//! PostToolUse(/Failure)        → busy   action cleared
//! Stop                         → idle
//! PermissionRequest            → waiting "Waiting…"
//! Notification idle_prompt     → idle
//! Notification permission_prompt → permission "Waiting for permission"
//! Notification elicitation_dialog → waiting "Waiting for input"
//! SessionEnd                   → record removed
//! ```

use crate::error::Result;

use super::event::{HookEvent, NotificationKind};
use super::store::StateStore;
use super::types::{SessionPatch, SessionRecord, SessionState, TerminalTarget};

/// The record change an event reconciles to.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Create-or-merge, superseding any other record on the same terminal
    /// target. Only SessionStart produces this.
    Start(SessionPatch),
    /// Partial update applied only if the record exists.
    Apply(SessionPatch),
    /// Remove the record.
    Remove,
    /// No state change.
    Skip,
}

/// Pure event → record-change mapping.
pub fn reconcile(event: &HookEvent, existing: Option<&SessionRecord>) -> Reconciled {
    // Everything except SessionStart and SessionEnd requires a live record.
    let requires_record = !matches!(event, HookEvent::SessionStart | HookEvent::SessionEnd);
    if requires_record && existing.is_none() {
        return Reconciled::Skip;
    }

    match event {
        HookEvent::SessionStart => Reconciled::Start(SessionPatch {
            state: Some(SessionState::Idle),
            current_action: Some(None),
            prompt_text: Some(None),
            ..SessionPatch::default()
        }),

        HookEvent::UserPromptSubmit => Reconciled::Apply(SessionPatch {
            state: Some(SessionState::Busy),
            current_action: Some(Some("Thinking…".to_string())),
            prompt_text: Some(None),
            ..SessionPatch::default()
        }),

        // A tool starting or finishing means any pending question was
        // answered; the prompt is only kept while the session is blocked
        // on it.
        HookEvent::PreToolUse { action } => Reconciled::Apply(SessionPatch {
            state: Some(SessionState::Busy),
            current_action: Some(Some(action.clone())),
            prompt_text: Some(None),
            ..SessionPatch::default()
        }),

        // Tool finished; more may follow, so the session stays busy with
        // no named action.
        HookEvent::PostToolUse | HookEvent::PostToolUseFailure => {
            Reconciled::Apply(SessionPatch {
                state: Some(SessionState::Busy),
                current_action: Some(None),
                prompt_text: Some(None),
                ..SessionPatch::default()
            })
        }

        HookEvent::Stop => Reconciled::Apply(SessionPatch {
            state: Some(SessionState::Idle),
            current_action: Some(None),
            prompt_text: Some(None),
            ..SessionPatch::default()
        }),

        HookEvent::PermissionRequest { prompt } => Reconciled::Apply(SessionPatch {
            state: Some(SessionState::Waiting),
            current_action: Some(Some("Waiting…".to_string())),
            prompt_text: Some(prompt.clone()),
            ..SessionPatch::default()
        }),

        HookEvent::Notification { kind, message } => match kind {
            Some(NotificationKind::Idle) => Reconciled::Apply(SessionPatch {
                state: Some(SessionState::Idle),
                current_action: Some(None),
                prompt_text: Some(None),
                ..SessionPatch::default()
            }),
            Some(NotificationKind::Permission) => Reconciled::Apply(SessionPatch {
                state: Some(SessionState::Permission),
                current_action: Some(Some("Waiting for permission".to_string())),
                prompt_text: Some(message.clone()),
                ..SessionPatch::default()
            }),
            Some(NotificationKind::Elicitation) => Reconciled::Apply(SessionPatch {
                state: Some(SessionState::Waiting),
                current_action: Some(Some("Waiting for input".to_string())),
                prompt_text: Some(message.clone()),
                ..SessionPatch::default()
            }),
            None => Reconciled::Skip,
        },

        HookEvent::SessionEnd => Reconciled::Remove,
    }
}

/// Per-invocation context resolved by the hook entrypoint: who fired the
/// event and where its terminal lives right now.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub session_id: String,
    pub pid: u32,
    pub cwd: Option<String>,
    /// Current pane, when the invoking process is attached to one. None
    /// means "could not determine", which preserves the stored target
    /// rather than clobbering it.
    pub target: Option<TerminalTarget>,
    pub window_label: Option<String>,
}

/// Applies one event against the store: reconcile, refresh the terminal
/// target from the environment, write.
pub fn apply_event(store: &StateStore, ctx: &EventContext, event: &HookEvent) -> Result<()> {
    let existing = store.get(&ctx.session_id);

    match reconcile(event, existing.as_ref()) {
        Reconciled::Start(mut patch) => {
            patch.pid = Some(ctx.pid);
            patch.cwd = ctx.cwd.clone();
            refresh_target(&mut patch, ctx);
            if let Some(target) = &ctx.target {
                store.delete_by_target(target, &ctx.session_id)?;
            }
            store.upsert(&ctx.session_id, &patch)?;
            tracing::debug!(session = %ctx.session_id, "Session started");
        }
        Reconciled::Apply(mut patch) => {
            refresh_target(&mut patch, ctx);
            let applied = store.update(&ctx.session_id, &patch)?;
            if !applied {
                // Record vanished between get and update; same no-op rule.
                tracing::debug!(session = %ctx.session_id, "Dropping event for absent record");
            }
        }
        Reconciled::Remove => {
            store.delete(&ctx.session_id)?;
            tracing::debug!(session = %ctx.session_id, "Session ended");
        }
        Reconciled::Skip => {
            tracing::debug!(session = %ctx.session_id, event = ?event, "Event ignored");
        }
    }
    Ok(())
}

/// Folds the freshly probed terminal target into the patch. When the probe
/// came up empty the patch leaves the stored target untouched.
fn refresh_target(patch: &mut SessionPatch, ctx: &EventContext) {
    if let Some(target) = &ctx.target {
        patch.target = Some(Some(target.clone()));
        if let Some(label) = &ctx.window_label {
            patch.window_label = Some(Some(label.clone()));
        }
    }
}
