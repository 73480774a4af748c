//! Read-side projection of the store.
//!
//! Consumers (TUI list, HTTP layer) call [`snapshot`] on their own timer and
//! re-render fully from the result. It never fails: a store scan error
//! yields an empty list and the next poll corrects it.

use std::collections::HashMap;

use crate::state::{SessionRecord, StateStore, TerminalTarget};

/// Sorted, duplicate-collapsed view of all current records.
///
/// Order: permission prompts first, then waiting, idle, busy; ties broken by
/// most recent update. Two records sharing a terminal target (a transient
/// condition around an agent restart) collapse to the fresher one; records
/// without a target are never deduplicated.
pub fn snapshot(store: &StateStore) -> Vec<SessionRecord> {
    let records = store.list().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Snapshot scan failed; returning empty list");
        Vec::new()
    });

    let mut by_target: HashMap<TerminalTarget, SessionRecord> = HashMap::new();
    let mut untargeted: Vec<SessionRecord> = Vec::new();

    for record in records {
        match &record.target {
            Some(target) => match by_target.get(target) {
                Some(kept) if kept.updated_at >= record.updated_at => {}
                _ => {
                    by_target.insert(target.clone(), record);
                }
            },
            None => untargeted.push(record),
        }
    }

    let mut result: Vec<SessionRecord> = by_target.into_values().chain(untargeted).collect();
    result.sort_by(|a, b| {
        a.state
            .priority()
            .cmp(&b.state.priority())
            .then(b.updated_at.cmp(&a.updated_at))
    });
    result
}
