// src/publish.rs

//! Status publishers: where a finished status line goes.

use std::ffi::OsStr;
use std::future::Future;
use std::os::unix::ffi::OsStrExt;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, anyhow};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, StatusBlocksError};
use crate::types::PublisherKind;

pub trait StatusPublisher: Send {
    /// Display `line`. Failures are reported to the caller, which logs them.
    fn publish<'a>(
        &'a mut self,
        line: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Remove the status text (used on shutdown).
    fn clear(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.publish(b"")
    }
}

/// Open the publisher selected by `kind`.
///
/// Fails with `PublisherUnavailable` when the target cannot be reached.
pub fn open_publisher(kind: PublisherKind) -> Result<Box<dyn StatusPublisher>> {
    match kind {
        PublisherKind::Xsetroot => Ok(Box::new(XsetrootPublisher::open()?)),
        PublisherKind::Stdout => Ok(Box::new(StdoutPublisher::new())),
    }
}

const XSETROOT: &str = "xsetroot";

/// Sets the X root window name via `xsetroot -name`.
#[derive(Debug)]
pub struct XsetrootPublisher {
    display: String,
}

impl XsetrootPublisher {
    /// Requires `DISPLAY` and a runnable `xsetroot` on `PATH`.
    pub fn open() -> Result<Self> {
        let display = match std::env::var("DISPLAY") {
            Ok(display) if !display.is_empty() => display,
            _ => {
                return Err(StatusBlocksError::PublisherUnavailable(
                    "could not open display: DISPLAY is not set".to_string(),
                ));
            }
        };
        ensure_runnable(XSETROOT)?;
        Ok(Self { display })
    }
}

/// Start `program -version` once so a missing binary fails at startup
/// rather than on every publish. The exit status is not checked.
fn ensure_runnable(program: &str) -> Result<()> {
    std::process::Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| {
            StatusBlocksError::PublisherUnavailable(format!("cannot run {program}: {e}"))
        })?;
    Ok(())
}

impl StatusPublisher for XsetrootPublisher {
    fn publish<'a>(
        &'a mut self,
        line: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(run_xsetroot(&self.display, line))
    }
}

async fn run_xsetroot(display: &str, line: &[u8]) -> Result<()> {
    let status = Command::new(XSETROOT)
        .arg("-name")
        .arg(OsStr::from_bytes(line))
        .env("DISPLAY", display)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .status()
        .await
        .context("running xsetroot")?;

    if !status.success() {
        return Err(anyhow!("xsetroot exited with {status}").into());
    }
    debug!(bytes = line.len(), "root window name updated");
    Ok(())
}

/// Prints one status line per update on stdout.
#[derive(Debug)]
pub struct StdoutPublisher {
    out: tokio::io::Stdout,
}

impl StdoutPublisher {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPublisher for StdoutPublisher {
    fn publish<'a>(
        &'a mut self,
        line: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(write_line(&mut self.out, line))
    }
}

async fn write_line(out: &mut tokio::io::Stdout, line: &[u8]) -> Result<()> {
    out.write_all(line).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}
