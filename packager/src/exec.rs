//! Abstraction for running external commands.
//!
//! The image builder shells out to JDK tools. The trait seam keeps those
//! invocations mockable; the output type carries only what callers need,
//! so tests can fabricate results without constructing platform exit
//! statuses.

use std::process::Command;

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Whether the command exited successfully.
    pub status_ok: bool,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Run a command with arguments and return the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or running the
    /// command (the tool not being on `PATH` is the common case).
    fn run(&self, cmd: &str, args: &[String]) -> std::io::Result<ExecOutput>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[String]) -> std::io::Result<ExecOutput> {
        let output = Command::new(cmd).args(args).output()?;
        Ok(ExecOutput {
            status_ok: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
