//! Serialized state types used by the hook/state pipeline.
//!
//! One record per live session, persisted as `{session_id}.json` under the
//! store root. Fields added later must carry `#[serde(default)]` so older
//! records still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current state of a tracked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Busy,
    #[default]
    Idle,
    Waiting,
    Permission,
}

impl SessionState {
    /// Presentation priority band: lower sorts first in a snapshot.
    /// Permission prompts outrank everything; busy sessions sink to the bottom.
    pub fn priority(&self) -> u8 {
        match self {
            SessionState::Permission => 1,
            SessionState::Waiting => 2,
            SessionState::Idle => 3,
            SessionState::Busy => 4,
        }
    }

    /// Whether this state indicates the session needs the user's attention.
    pub fn needs_attention(&self) -> bool {
        matches!(self, SessionState::Waiting | SessionState::Permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Busy => "busy",
            SessionState::Idle => "idle",
            SessionState::Waiting => "waiting",
            SessionState::Permission => "permission",
        }
    }
}

/// Locator for the tmux pane a session is visible in.
///
/// The target may be stale: the pane can die or be reused without the store
/// noticing. Staleness is resolved lazily by the reconciliation loop and
/// liveness GC, never assumed away.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalTarget {
    pub session: String,
    pub window: u32,
    pub pane: u32,
}

impl std::fmt::Display for TerminalTarget {
    /// Renders in tmux target syntax (`session:window.pane`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}.{}", self.session, self.window, self.pane)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Process id of the agent; 0 means unknown, which exempts the record
    /// from liveness-based garbage collection.
    #[serde(default)]
    pub pid: u32,
    pub cwd: String,
    #[serde(default)]
    pub target: Option<TerminalTarget>,
    #[serde(default)]
    pub window_label: Option<String>,
    pub state: SessionState,
    #[serde(default)]
    pub current_action: Option<String>,
    #[serde(default)]
    pub prompt_text: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: &str) -> Self {
        SessionRecord {
            session_id: session_id.to_string(),
            pid: 0,
            cwd: String::new(),
            target: None,
            window_label: None,
            state: SessionState::Idle,
            current_action: None,
            prompt_text: None,
            updated_at: Utc::now(),
        }
    }

    /// Applies a partial update in place. `updated_at` is refreshed by the
    /// store on every write, not here.
    pub fn apply(&mut self, patch: &SessionPatch) {
        if let Some(pid) = patch.pid {
            self.pid = pid;
        }
        if let Some(cwd) = &patch.cwd {
            self.cwd = cwd.clone();
        }
        if let Some(target) = &patch.target {
            self.target = target.clone();
        }
        if let Some(label) = &patch.window_label {
            self.window_label = label.clone();
        }
        if let Some(state) = patch.state {
            self.state = state;
        }
        if let Some(action) = &patch.current_action {
            self.current_action = action.clone();
        }
        if let Some(prompt) = &patch.prompt_text {
            self.prompt_text = prompt.clone();
        }
    }
}

/// Partial update to a session record.
///
/// Outer `Option` decides whether the field is touched at all; for the
/// optional record fields the inner value is what gets stored, so
/// `Some(None)` clears and `None` leaves the existing value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub pid: Option<u32>,
    pub cwd: Option<String>,
    pub target: Option<Option<TerminalTarget>>,
    pub window_label: Option<Option<String>>,
    pub state: Option<SessionState>,
    pub current_action: Option<Option<String>>,
    pub prompt_text: Option<Option<String>>,
}

impl SessionPatch {
    /// The patch the reconciliation loop applies when the pane text shows a
    /// user interruption: back to idle with action and prompt cleared.
    pub fn idle() -> Self {
        SessionPatch {
            state: Some(SessionState::Idle),
            current_action: Some(None),
            prompt_text: Some(None),
            ..SessionPatch::default()
        }
    }
}
