//! Pane-text interruption detection.
//!
//! The hook protocol has no event for "user pressed escape mid-operation",
//! so that one transition is inferred from captured pane text. The heuristic
//! is positional: it anchors on the two separator rows the agent draws
//! around its input box and only inspects the most recent interaction block
//! above them. Pane text is a rolling buffer — old interruption text stays
//! visible long after it was handled — so two guards prevent re-firing:
//! an active busy indicator short-circuits everything, and the backward
//! scan for the interaction start is bounded.
//!
//! Pure function over a captured string; no tmux required to test it.

/// Literal shown while the agent is mid-operation ("… (esc to interrupt)").
const BUSY_MARKER: &str = "esc to interrupt";
/// Only the last few lines are checked for the busy marker; older
/// occurrences are scrollback.
const BUSY_TAIL_LINES: usize = 6;
/// How far above the top separator the interaction-start scan reaches.
const SCAN_WINDOW_LINES: usize = 12;
/// Minimum run of box-drawing dashes to count as a separator row.
const MIN_SEPARATOR_WIDTH: usize = 4;

const INTERRUPTED_MARKER: &str = "Interrupted";
const DECLINED_MARKER: &str = "User declined";

/// A user-interrupt condition read off the pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// User cancelled the in-flight operation.
    Interrupted,
    /// User declined to answer a question.
    Declined,
}

/// Scans captured pane text for a fresh interruption.
///
/// Returns None when the pane shows an active operation, when the expected
/// layout (two separator rows bounding the input box) is missing, or when
/// the most recent interaction block contains neither marker.
pub fn detect_interruption(pane: &str) -> Option<Interruption> {
    let lines: Vec<&str> = pane.lines().collect();

    // An active operation means any interruption text still visible is old.
    if lines
        .iter()
        .rev()
        .take(BUSY_TAIL_LINES)
        .any(|line| line.contains(BUSY_MARKER))
    {
        return None;
    }

    let bottom_separator = lines.iter().rposition(|line| is_separator(line))?;
    let top_separator = lines[..bottom_separator]
        .iter()
        .rposition(|line| is_separator(line))?;

    // Bounded backward scan for the start of the interaction above the box.
    let floor = top_separator.saturating_sub(SCAN_WINDOW_LINES);
    let start = (floor..top_separator)
        .rev()
        .find(|&i| is_interaction_start(lines[i]))?;

    let block = &lines[start + 1..top_separator];
    if block.iter().any(|line| line.contains(INTERRUPTED_MARKER)) {
        Some(Interruption::Interrupted)
    } else if block.iter().any(|line| line.contains(DECLINED_MARKER)) {
        Some(Interruption::Declined)
    } else {
        None
    }
}

/// A row consisting only of the box-drawing dash.
fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= MIN_SEPARATOR_WIDTH && trimmed.chars().all(|c| c == '─')
}

/// User input lines start with `>`; agent turns start with `⏺`.
fn is_interaction_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('>') || trimmed.starts_with('⏺')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEPARATOR: &str = "──────────────────────────────";

    fn pane(body: &[&str]) -> String {
        let mut lines: Vec<&str> = body.to_vec();
        lines.extend([SEPARATOR, " > ", SEPARATOR]);
        lines.join("\n")
    }

    #[test]
    fn test_interrupted_in_latest_block() {
        let text = pane(&[
            "⏺ Bash(npm test)",
            "  ⎿  Interrupted by user",
        ]);
        assert_eq!(detect_interruption(&text), Some(Interruption::Interrupted));
    }

    #[test]
    fn test_declined_in_latest_block() {
        let text = pane(&[
            "⏺ May I edit src/main.rs?",
            "  ⎿  User declined to answer",
        ]);
        assert_eq!(detect_interruption(&text), Some(Interruption::Declined));
    }

    #[test]
    fn test_busy_indicator_suppresses_stale_interrupt() {
        let text = [
            "⏺ Bash(npm test)",
            "  ⎿  Interrupted by user",
            SEPARATOR,
            " > ",
            SEPARATOR,
            "✻ Simmering… (3s · esc to interrupt)",
        ]
        .join("\n");
        assert_eq!(detect_interruption(&text), None);
    }

    #[test]
    fn test_no_separators_yields_none() {
        let text = "⏺ Bash(npm test)\n  ⎿  Interrupted by user";
        assert_eq!(detect_interruption(text), None);
    }

    #[test]
    fn test_single_separator_yields_none() {
        let text = ["  ⎿  Interrupted by user", SEPARATOR, " > "].join("\n");
        assert_eq!(detect_interruption(&text), None);
    }

    #[test]
    fn test_clean_block_yields_none() {
        let text = pane(&[
            "⏺ Bash(npm test)",
            "  ⎿  142 passed, 0 failed",
        ]);
        assert_eq!(detect_interruption(&text), None);
    }

    #[test]
    fn test_interrupt_above_scan_window_ignored() {
        // The interaction start sits too far above the top separator; the
        // bounded scan must not reach it, even though a marker is present.
        let mut body = vec!["⏺ Bash(npm test)", "  ⎿  Interrupted by user"];
        let filler: Vec<String> = (0..SCAN_WINDOW_LINES + 2)
            .map(|i| format!("  output line {}", i))
            .collect();
        body.extend(filler.iter().map(String::as_str));
        assert_eq!(detect_interruption(&pane(&body)), None);
    }

    #[test]
    fn test_marker_outside_block_ignored() {
        // Marker above the interaction start does not belong to the latest
        // block and must not fire.
        let text = pane(&[
            "  ⎿  Interrupted by user",
            "⏺ Bash(cargo build)",
            "  ⎿  Finished dev profile",
        ]);
        assert_eq!(detect_interruption(&text), None);
    }

    #[test]
    fn test_user_input_glyph_starts_block() {
        let text = pane(&[
            "> run the tests",
            "  ⎿  Interrupted by user",
        ]);
        assert_eq!(detect_interruption(&text), Some(Interruption::Interrupted));
    }

    #[test]
    fn test_empty_pane_yields_none() {
        assert_eq!(detect_interruption(""), None);
    }

    #[test]
    fn test_busy_marker_deep_in_scrollback_does_not_suppress() {
        let text = [
            "✻ Simmering… (3s · esc to interrupt)",
            "  old scrollback",
            "  old scrollback",
            "  old scrollback",
            "  old scrollback",
            "  old scrollback",
            "  old scrollback",
            "⏺ Bash(npm test)",
            "  ⎿  Interrupted by user",
            SEPARATOR,
            " > ",
            SEPARATOR,
        ]
        .join("\n");
        assert_eq!(detect_interruption(&text), Some(Interruption::Interrupted));
    }
}
