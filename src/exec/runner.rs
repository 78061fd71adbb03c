// src/exec/runner.rs

//! Running block commands and capturing their output.

use std::io;

use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::errors::{Result, StatusBlocksError};
use crate::exec::command::{click_command, update_command};

/// Result of one update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutput {
    /// Bytes read from the command's stdout, at most `capacity` of them.
    Captured(Vec<u8>),
    /// The command could not be executed (missing, not executable). The
    /// block keeps whatever it showed before.
    NotStarted,
}

/// Errors that mean "this program cannot be run" rather than "the process
/// machinery is broken".
fn is_exec_failure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || err.raw_os_error() == Some(libc::ENOEXEC)
}

/// Run an update command and read at most `capacity` bytes of its stdout.
///
/// Reading stops when the pipe closes or the capacity is reached. Output
/// past the capacity is discarded; the read end is closed and the child is
/// left to finish on its own. The child is reaped by a detached task, so the
/// caller never waits on its exit status.
pub async fn run_update(
    program: &str,
    arg: Option<i32>,
    capacity: usize,
) -> Result<UpdateOutput> {
    debug!(command = %program, ?arg, "running update command");

    let mut child = match update_command(program, arg).spawn() {
        Ok(child) => child,
        Err(e) if is_exec_failure(&e) => {
            warn!(command = %program, error = %e, "update command could not be executed");
            return Ok(UpdateOutput::NotStarted);
        }
        Err(source) => {
            return Err(StatusBlocksError::Spawn {
                command: program.to_string(),
                source,
            });
        }
    };

    let stdout = child.stdout.take().ok_or_else(|| StatusBlocksError::Read {
        command: program.to_string(),
        source: io::Error::other("child stdout was not captured"),
    })?;

    let mut buf = Vec::with_capacity(capacity);
    let read = stdout.take(capacity as u64).read_to_end(&mut buf).await;

    // The read end is closed here (the `Take` wrapper owned it); a child
    // still writing past the capacity gets EPIPE.
    read.map_err(|source| StatusBlocksError::Read {
        command: program.to_string(),
        source,
    })?;

    reap_in_background(program.to_string(), child);

    debug!(command = %program, bytes = buf.len(), "update output captured");
    Ok(UpdateOutput::Captured(buf))
}

/// Start a click command and return immediately.
pub fn spawn_click(program: &str, button: u8) -> Result<()> {
    let child = click_command(program, button)
        .spawn()
        .map_err(|source| StatusBlocksError::Spawn {
            command: program.to_string(),
            source,
        })?;

    info!(command = %program, button, pid = child.id(), "click command started");
    reap_in_background(program.to_string(), child);
    Ok(())
}

/// Wait for `child` on a detached task and log abnormal exits.
fn reap_in_background(command: String, mut child: Child) {
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {
                debug!(command = %command, "child exited");
            }
            Ok(status) => {
                warn!(command = %command, %status, "child exited unsuccessfully");
            }
            Err(e) => {
                warn!(command = %command, error = %e, "failed to reap child");
            }
        }
    });
}
