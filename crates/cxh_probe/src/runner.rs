//! Execution of tool commands.

use std::process::Command;

use crate::error::ProbeError;
use crate::toolchain::ToolCommand;

/// Captured output of a finished tool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8.
    pub stderr: String,
}

/// Runs [`ToolCommand`]s to completion.
///
/// Calls block until the tool exits; there is no timeout.
pub trait CommandRunner: Send + Sync {
    /// Runs `cmd` and returns its output.
    ///
    /// Fails with [`ProbeError::Tool`] if the tool cannot be started, or if
    /// it exits non-zero and `cmd.check_status` is set.
    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, ProbeError>;
}

/// Runs commands as child processes of the current process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, ProbeError> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| ProbeError::Tool {
            tool: cmd.kind,
            reason: format!("could not run '{}': {e}", cmd.program.display()),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if cmd.check_status && !output.status.success() {
            return Err(ProbeError::Tool {
                tool: cmd.kind,
                reason: format!("'{cmd}' exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
