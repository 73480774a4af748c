//! Hook event ingestion boundary.
//!
//! [`HookInput`] mirrors the JSON Claude Code writes to a hook's stdin.
//! It is converted into the internal [`HookEvent`] vocabulary here, so the
//! reconciler stays protocol-agnostic: another agent backend with a
//! different payload shape only needs its own input type converging on the
//! same enum.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{BeaconError, Result};

/// Commands longer than this are truncated in the action description.
const MAX_COMMAND_CHARS: usize = 30;

/// Raw hook payload as delivered on stdin. Every field is optional; the
/// hook vocabulary has grown over agent versions and older payloads omit
/// most of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl HookInput {
    /// Maps the raw payload to the internal event vocabulary.
    ///
    /// An event name outside the vocabulary is an error (protocol mismatch,
    /// surfaced to the caller); a missing event name is a silent no-op.
    pub fn to_event(&self) -> Result<Option<HookEvent>> {
        let Some(name) = self.hook_event_name.as_deref() else {
            return Ok(None);
        };

        let event = match name {
            "SessionStart" => HookEvent::SessionStart,
            "UserPromptSubmit" => HookEvent::UserPromptSubmit,
            "PreToolUse" => HookEvent::PreToolUse {
                action: describe_tool(
                    self.tool_name.as_deref().unwrap_or(""),
                    self.tool_input.as_ref(),
                ),
            },
            "PostToolUse" => HookEvent::PostToolUse,
            "PostToolUseFailure" => HookEvent::PostToolUseFailure,
            "Stop" => HookEvent::Stop,
            "PermissionRequest" => HookEvent::PermissionRequest {
                prompt: self.message.clone().or_else(|| self.prompt.clone()),
            },
            "Notification" => HookEvent::Notification {
                kind: NotificationKind::parse(self.notification_type.as_deref()),
                message: self.message.clone(),
            },
            "SessionEnd" => HookEvent::SessionEnd,
            other => return Err(BeaconError::UnknownEvent(other.to_string())),
        };
        Ok(Some(event))
    }
}

/// Internal lifecycle event vocabulary consumed by the reconciler.
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    SessionStart,
    UserPromptSubmit,
    PreToolUse { action: String },
    PostToolUse,
    PostToolUseFailure,
    Stop,
    PermissionRequest { prompt: Option<String> },
    Notification {
        kind: Option<NotificationKind>,
        message: Option<String>,
    },
    SessionEnd,
}

/// Notification subtypes that affect session state. Unlisted subtypes are
/// ignored (not errors; the agent emits informational notifications too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Idle,
    Permission,
    Elicitation,
}

impl NotificationKind {
    fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            Some("idle_prompt") => Some(NotificationKind::Idle),
            Some("permission_prompt") => Some(NotificationKind::Permission),
            Some("elicitation_dialog") => Some(NotificationKind::Elicitation),
            _ => None,
        }
    }
}

/// Builds the short human-readable description shown while a tool runs.
pub fn describe_tool(tool_name: &str, tool_input: Option<&Value>) -> String {
    let name = strip_namespace(tool_name);

    match name {
        "Bash" => {
            let command = tool_input
                .and_then(|v| v.get("command"))
                .and_then(Value::as_str)
                .unwrap_or("");
            format!("Bash: {}", truncate_chars(command, MAX_COMMAND_CHARS))
        }
        "Read" | "Write" | "Edit" | "NotebookEdit" => {
            let file = tool_input
                .and_then(|v| v.get("file_path"))
                .and_then(Value::as_str)
                .map(base_name)
                .unwrap_or("");
            if file.is_empty() {
                format!("Running: {}", name)
            } else {
                format!("{}: {}", name, file)
            }
        }
        "Grep" | "Glob" | "WebSearch" => "Searching…".to_string(),
        "Task" | "Agent" => "Running agent…".to_string(),
        _ => format!("Running: {}", name),
    }
}

/// Strips namespace-style prefixes from MCP tool names
/// (`mcp__server__tool` → `tool`).
fn strip_namespace(tool_name: &str) -> &str {
    tool_name.rsplit("__").next().unwrap_or(tool_name)
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max).collect();
    truncated.push('…');
    truncated
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(event: &str) -> HookInput {
        HookInput {
            session_id: Some("s1".to_string()),
            hook_event_name: Some(event.to_string()),
            ..HookInput::default()
        }
    }

    #[test]
    fn test_unknown_event_name_is_an_error() {
        let result = input("FutureEvent").to_event();
        assert!(matches!(result, Err(BeaconError::UnknownEvent(name)) if name == "FutureEvent"));
    }

    #[test]
    fn test_missing_event_name_is_a_noop() {
        let parsed = HookInput::default().to_event().unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_pre_tool_use_carries_description() {
        let mut raw = input("PreToolUse");
        raw.tool_name = Some("Bash".to_string());
        raw.tool_input = Some(json!({"command": "npm test"}));

        let event = raw.to_event().unwrap().unwrap();
        assert_eq!(
            event,
            HookEvent::PreToolUse {
                action: "Bash: npm test".to_string()
            }
        );
    }

    #[test]
    fn test_notification_subtypes() {
        let mut raw = input("Notification");
        raw.notification_type = Some("permission_prompt".to_string());
        let event = raw.to_event().unwrap().unwrap();
        assert!(matches!(
            event,
            HookEvent::Notification {
                kind: Some(NotificationKind::Permission),
                ..
            }
        ));

        raw.notification_type = Some("auth_success".to_string());
        let event = raw.to_event().unwrap().unwrap();
        assert!(matches!(event, HookEvent::Notification { kind: None, .. }));
    }

    #[test]
    fn test_describe_tool_truncates_long_commands() {
        let input = json!({"command": "cargo test --workspace --all-features --quiet"});
        let action = describe_tool("Bash", Some(&input));
        assert_eq!(action, "Bash: cargo test --workspace --all-f…");
        // 30 command chars plus the ellipsis, after the prefix.
        assert_eq!(action.chars().count(), "Bash: ".chars().count() + 31);
    }

    #[test]
    fn test_describe_tool_short_command_untruncated() {
        let input = json!({"command": "ls"});
        assert_eq!(describe_tool("Bash", Some(&input)), "Bash: ls");
    }

    #[test]
    fn test_describe_tool_file_tools_show_base_name() {
        let input = json!({"file_path": "/repo/src/state/store.rs"});
        assert_eq!(describe_tool("Edit", Some(&input)), "Edit: store.rs");
        assert_eq!(describe_tool("Read", Some(&input)), "Read: store.rs");
    }

    #[test]
    fn test_describe_tool_search_and_agent_tools() {
        assert_eq!(describe_tool("Grep", None), "Searching…");
        assert_eq!(describe_tool("Glob", None), "Searching…");
        assert_eq!(describe_tool("Task", None), "Running agent…");
    }

    #[test]
    fn test_describe_tool_strips_mcp_namespace() {
        assert_eq!(
            describe_tool("mcp__playwright__browser_click", None),
            "Running: browser_click"
        );
    }

    #[test]
    fn test_describe_tool_fallback() {
        assert_eq!(describe_tool("TodoWrite", None), "Running: TodoWrite");
    }
}
