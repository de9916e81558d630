//! External command invocation.
//!
//! Every hardware driver, media tool and system utility is an opaque
//! external program. Commands are always built as argument vectors; a
//! failure (non-zero exit, missing binary, timeout) is an ordinary result
//! the caller can inspect, never an error that unwinds the request.

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub success: bool,
    /// Trimmed stdout on success, trimmed stderr (or a diagnostic
    /// message) on failure.
    pub output: String,
}

impl CommandOutcome {
    fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// Run `program` with `args`, waiting at most `timeout`.
pub async fn run(program: &Path, args: &[&str], timeout: Duration) -> CommandOutcome {
    tracing::debug!("Executing: {} {}", program.display(), args.join(" "));

    let child = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::error!("Failed to execute {}: {}", program.display(), e);
            return CommandOutcome::failure(format!(
                "Command not found or not executable: {}",
                program.display()
            ));
        }
        Err(_) => {
            tracing::error!(
                "Command {} timed out after {}s",
                program.display(),
                timeout.as_secs()
            );
            return CommandOutcome::failure(format!(
                "Command timed out after {}s: {}",
                timeout.as_secs(),
                program.display()
            ));
        }
    };

    if output.status.success() {
        CommandOutcome {
            success: true,
            output: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!(
            "Command {} failed with {}: {}",
            program.display(),
            output.status,
            stderr
        );
        CommandOutcome::failure(stderr)
    }
}
