//! The execution engine — the one place a command actually runs.
//!
//! [`CommandRunner`] is the seam between the pipeline and the host: the
//! orchestrator only ever sees a [`CommandOutcome`]. The shipped
//! implementation is [`ShellRunner`] (`bash -c`, the invoking user's real
//! privileges — sandboxing is explicitly not this layer's job). Tests swap
//! in scripted runners through the same trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Instant;
use tokio::process::Command;

/// Captured output is capped per stream; anything beyond this is dropped.
pub const MAX_STREAM_CAPTURE: usize = 10_000;

/// Step previews keep only the head of the combined output.
pub const OUTPUT_PREVIEW_CHARS: usize = 200;

/// The result of running one command to completion.
///
/// A non-zero exit is a *normal* outcome (`success = false`), not an error;
/// it is recorded and surfaced, never hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Whether the command exited with code 0.
    pub success: bool,
    /// Captured stdout, truncated to [`MAX_STREAM_CAPTURE`] chars.
    pub stdout: String,
    /// Captured stderr, truncated to [`MAX_STREAM_CAPTURE`] chars.
    pub stderr: String,
    /// Process exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandOutcome {
    /// The head of the command's output for status listings: stdout when
    /// present, stderr otherwise.
    #[must_use]
    pub fn preview(&self) -> String {
        let source = if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        };
        truncate_chars(source, OUTPUT_PREVIEW_CHARS)
    }
}

/// Runs one approved command, synchronously from the caller's point of view.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute `command_text` to completion and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] only when the process could not be spawned
    /// at all; a failing command is a successful run with `success = false`.
    async fn run(&self, command_text: &str) -> io::Result<CommandOutcome>;
}

/// Executes commands through a shell (`bash -c` by default).
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    /// A runner using `bash`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }

    /// A runner using the given shell binary.
    #[must_use]
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_text: &str) -> io::Result<CommandOutcome> {
        let started = Instant::now();
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command_text)
            .output()
            .await?;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let stdout = truncate_chars(&String::from_utf8_lossy(&output.stdout), MAX_STREAM_CAPTURE);
        let stderr = truncate_chars(&String::from_utf8_lossy(&output.stderr), MAX_STREAM_CAPTURE);
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(CommandOutcome {
            success: output.status.success(),
            stdout,
            stderr,
            exit_code,
            duration_ms,
        })
    }
}

/// Truncate to at most `max` chars, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
