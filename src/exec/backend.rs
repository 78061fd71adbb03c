// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to a `BlockExecutor` instead of spawning processes
//! itself. Production uses [`ProcessExecutor`]; tests can provide their own
//! implementation that returns canned output and records what was run.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

use super::runner::{UpdateOutput, run_update, spawn_click};

/// Trait abstracting how block commands are executed.
pub trait BlockExecutor: Send {
    /// Run `program` (with `arg` when a trigger value is present) and
    /// capture at most `capacity` bytes of its output.
    ///
    /// An `Err` is fatal for the engine: it means the process machinery
    /// itself failed.
    fn update(
        &mut self,
        program: &str,
        arg: Option<i32>,
        capacity: usize,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateOutput>> + Send + '_>>;

    /// Start a click handler without waiting for it.
    ///
    /// An `Err` is reported by the caller and otherwise ignored.
    fn click(&mut self, program: &str, button: u8) -> Result<()>;
}

/// Real executor backend: runs commands as child processes.
#[derive(Debug, Default, Clone)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl BlockExecutor for ProcessExecutor {
    fn update(
        &mut self,
        program: &str,
        arg: Option<i32>,
        capacity: usize,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateOutput>> + Send + '_>> {
        // Own the program path so the future doesn't borrow the caller.
        let program = program.to_string();
        Box::pin(async move { run_update(&program, arg, capacity).await })
    }

    fn click(&mut self, program: &str, button: u8) -> Result<()> {
        spawn_click(program, button)
    }
}
