// src/engine/mod.rs

//! Scheduling and update engine for statusblocks.
//!
//! This module ties together:
//! - the tick schedule (which blocks are due on which tick)
//! - stimulus routing (update signals and clicks, via [`crate::signals`])
//! - change detection and status line assembly ([`assembler`])
//! - the main loop that alternates a tick's critical section with an idle
//!   section in which stimuli are serviced
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::block::Slot;
use crate::signals::Stimulus;

/// Events flowing into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The tick timer elapsed (the very first tick is the startup warm-up).
    Tick,
    /// A stimulus was delivered.
    Stimulus(Stimulus),
}

/// One update command to run for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRun {
    pub index: usize,
    pub program: String,
    pub arg: Option<i32>,
    pub capacity: usize,
}

/// One click command to start for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRun {
    pub index: usize,
    pub slot: Slot,
    pub program: String,
    pub button: u8,
}

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run these update commands in order, then assemble and publish if
    /// anything changed.
    Refresh(Vec<BlockRun>),
    /// Start a click command; nothing is re-assembled.
    Click(ClickRun),
    /// Clean up and stop (termination signal received).
    Exit { signal: i32 },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

pub mod assembler;
pub mod core;
pub mod runtime;

pub use assembler::{Assembler, StatusLine};
pub use self::core::CoreRuntime;
pub use runtime::Runtime;
