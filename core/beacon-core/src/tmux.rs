//! Read-only tmux query interface.
//!
//! Everything here is best-effort: tmux may not be installed, may not be
//! running, or a target may have died since the record was written. All of
//! those surface as None and are handled by callers as "feature
//! unavailable", never as errors. Commands run under a hard timeout because
//! tmux can hang when its server is wedged.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::state::TerminalTarget;

/// Hard ceiling on any single tmux invocation.
const TMUX_TIMEOUT: Duration = Duration::from_millis(1000);
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Read-only view of the terminal multiplexer. The reconciliation loop is
/// generic over this so tests drive it with canned pane text.
pub trait TmuxAdapter: Send + Sync {
    /// The pane the calling process is attached to, with its window label,
    /// if that can be determined.
    fn current_target(&self) -> Option<(TerminalTarget, Option<String>)>;

    /// Visible text of the given pane.
    fn capture_pane(&self, target: &TerminalTarget) -> Option<String>;
}

/// Adapter shelling out to the `tmux` binary.
#[derive(Debug, Clone, Default)]
pub struct CommandTmuxAdapter;

impl TmuxAdapter for CommandTmuxAdapter {
    fn current_target(&self) -> Option<(TerminalTarget, Option<String>)> {
        // Outside tmux there is nothing to resolve.
        let pane = std::env::var("TMUX_PANE").ok()?;
        let output = run_tmux(&[
            "display-message",
            "-p",
            "-t",
            &pane,
            "#{session_name}\t#{window_index}\t#{pane_index}\t#{window_name}",
        ])?;
        let line = output.lines().next()?;
        let (target, label) = parse_target_line(line)?;
        Some((target, label))
    }

    fn capture_pane(&self, target: &TerminalTarget) -> Option<String> {
        run_tmux(&["capture-pane", "-p", "-t", &target.to_string()])
    }
}

/// Runs tmux with a deadline. Returns stdout on success; None on spawn
/// failure, nonzero exit, or timeout (the child is killed on timeout).
fn run_tmux(args: &[&str]) -> Option<String> {
    run_with_deadline("tmux", args)
}

fn run_with_deadline(program: &str, args: &[&str]) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    // Drain stdout while the child runs. A capture larger than the pipe
    // buffer would otherwise block the child on write until the deadline.
    let mut pipe = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        use std::io::Read;
        let mut stdout = String::new();
        pipe.read_to_string(&mut stdout).ok().map(|_| stdout)
    });

    let deadline = Instant::now() + TMUX_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = reader.join().ok().flatten();
                if !status.success() {
                    return None;
                }
                return stdout;
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    tracing::warn!(args = ?args, "tmux command timed out");
                    let _ = child.kill();
                    let _ = child.wait();
                    // Killing closes the pipe, so the reader unblocks.
                    let _ = reader.join();
                    return None;
                }
                std::thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader.join();
                return None;
            }
        }
    }
}

fn parse_target_line(line: &str) -> Option<(TerminalTarget, Option<String>)> {
    let mut parts = line.split('\t');
    let session = parts.next().map(str::trim).filter(|v| !v.is_empty())?;
    let window = parts.next()?.trim().parse().ok()?;
    let pane = parts.next()?.trim().parse().ok()?;
    let label = parts
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Some((
        TerminalTarget {
            session: session.to_string(),
            window,
            pane,
        },
        label,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_line_with_label() {
        let (target, label) = parse_target_line("main\t2\t1\teditor").unwrap();
        assert_eq!(target.session, "main");
        assert_eq!(target.window, 2);
        assert_eq!(target.pane, 1);
        assert_eq!(label.as_deref(), Some("editor"));
    }

    #[test]
    fn test_parse_target_line_missing_label() {
        let (target, label) = parse_target_line("main\t0\t0\t").unwrap();
        assert_eq!(target.to_string(), "main:0.0");
        assert!(label.is_none());
    }

    #[test]
    fn test_parse_target_line_rejects_garbage() {
        assert!(parse_target_line("").is_none());
        assert!(parse_target_line("only-session").is_none());
        assert!(parse_target_line("main\tx\t0\tname").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_larger_than_pipe_buffer_is_fully_drained() {
        // Well past the ~64 KiB pipe buffer; the child must never block
        // on write while we wait for it to exit.
        let output = run_with_deadline("sh", &["-c", "yes x | head -c 262144"]).unwrap();
        assert_eq!(output.len(), 262_144);
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_command_times_out() {
        assert!(run_with_deadline("sleep", &["30"]).is_none());
    }

    #[test]
    fn test_missing_binary_yields_none() {
        assert!(run_with_deadline("beacon-no-such-binary", &[]).is_none());
    }
}
