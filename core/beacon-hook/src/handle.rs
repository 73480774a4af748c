//! Event handler for agent hooks.
//!
//! Reads one hook payload from stdin, resolves the invoking process's
//! terminal pane, and applies the event to the store. Loss-tolerant by
//! design: a missing session id or an empty stdin is a silent no-op, since
//! any event may arrive without its predecessors.

use std::io::Read;

use beacon_core::config;
use beacon_core::state::{apply_event, EventContext, HookInput, StateStore};
use beacon_core::tmux::{CommandTmuxAdapter, TmuxAdapter};
use beacon_core::{BeaconError, Result};

pub fn run() -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| BeaconError::Io {
            context: "read hook payload from stdin".to_string(),
            source: e,
        })?;

    if input.trim().is_empty() {
        return Ok(());
    }

    let hook_input: HookInput =
        serde_json::from_str(&input).map_err(|e| BeaconError::Json {
            context: "parse hook payload".to_string(),
            source: e,
        })?;

    let store = StateStore::open(&config::data_root()?)?;
    handle_hook_input(&store, &CommandTmuxAdapter, hook_input)
}

fn handle_hook_input(
    store: &StateStore,
    tmux: &dyn TmuxAdapter,
    hook_input: HookInput,
) -> Result<()> {
    let Some(event) = hook_input.to_event()? else {
        return Ok(());
    };

    let Some(session_id) = hook_input.session_id.clone() else {
        tracing::debug!(event = ?hook_input.hook_event_name, "Skipping event (missing session_id)");
        return Ok(());
    };

    // The agent process is this hook's parent; its pid drives liveness GC.
    // 0 (unknown) exempts the record from GC.
    let pid = parent_pid().unwrap_or(0);

    let (target, window_label) = match tmux.current_target() {
        Some((target, label)) => (Some(target), label),
        None => (None, None),
    };

    let ctx = EventContext {
        session_id,
        pid,
        cwd: hook_input.cwd.clone(),
        target,
        window_label,
    };

    tracing::debug!(
        session = %ctx.session_id,
        event = ?hook_input.hook_event_name,
        "Applying hook event"
    );
    apply_event(store, &ctx, &event)
}

fn parent_pid() -> Option<u32> {
    #[cfg(unix)]
    {
        // SAFETY: getppid() has no failure modes and always returns a valid
        // pid (1 if the parent already exited).
        #[allow(unsafe_code)]
        Some(unsafe { libc::getppid() } as u32)
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{SessionState, TerminalTarget};
    use tempfile::tempdir;

    struct NoTmux;

    impl TmuxAdapter for NoTmux {
        fn current_target(&self) -> Option<(TerminalTarget, Option<String>)> {
            None
        }
        fn capture_pane(&self, _target: &TerminalTarget) -> Option<String> {
            None
        }
    }

    fn input(event: &str, session_id: Option<&str>) -> HookInput {
        let json = serde_json::json!({
            "hook_event_name": event,
            "session_id": session_id,
            "cwd": "/repo",
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_session_start_creates_record() {
        let temp = tempdir().unwrap();
        let store = StateStore::open(temp.path()).unwrap();

        handle_hook_input(&store, &NoTmux, input("SessionStart", Some("s1"))).unwrap();

        let record = store.get("s1").unwrap();
        assert_eq!(record.state, SessionState::Idle);
        assert_eq!(record.cwd, "/repo");
        assert!(record.pid > 0);
    }

    #[test]
    fn test_missing_session_id_is_silent_noop() {
        let temp = tempdir().unwrap();
        let store = StateStore::open(temp.path()).unwrap();

        handle_hook_input(&store, &NoTmux, input("SessionStart", None)).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_event_surfaces_error() {
        let temp = tempdir().unwrap();
        let store = StateStore::open(temp.path()).unwrap();

        let result = handle_hook_input(&store, &NoTmux, input("BrandNewEvent", Some("s1")));
        assert!(matches!(result, Err(BeaconError::UnknownEvent(_))));
        // And the store was not touched.
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_event_before_session_start_is_noop() {
        let temp = tempdir().unwrap();
        let store = StateStore::open(temp.path()).unwrap();

        handle_hook_input(&store, &NoTmux, input("UserPromptSubmit", Some("s1"))).unwrap();
        assert!(store.get("s1").is_none());
    }
}
