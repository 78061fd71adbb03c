// src/lock.rs

//! Single-instance lock backed by a pid file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{Result, StatusBlocksError};

pub const DEFAULT_LOCK_FILE: &str = "/tmp/statusblocks.pid";

/// Exclusive lock held for the lifetime of the engine.
///
/// The lock file contains the pid of the holder. Dropping the lock (or
/// calling [`InstanceLock::release`]) removes the file.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    file: Option<File>,
}

impl InstanceLock {
    /// Take the lock at `path`.
    ///
    /// Returns `AlreadyRunning` if another process holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o644)
            .open(&path)?;

        // SAFETY: `file` owns a valid descriptor for the duration of the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Err(StatusBlocksError::AlreadyRunning { path });
            }
            return Err(err.into());
        }

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        file.flush()?;

        info!(lock = %path.display(), pid = std::process::id(), "instance lock acquired");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Remove the lock file and drop the lock. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to remove lock file");
        }
        drop(file);
        debug!(lock = %self.path.display(), "instance lock released");
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        self.release();
    }
}
