// src/signals/mod.rs

//! Asynchronous stimuli: termination requests, per-block update signals and
//! click events.
//!
//! - [`listener`] owns the OS side: it blocks the stimulus signals in the
//!   process mask and turns each queued delivery into a [`Stimulus`] on a
//!   channel read by the scheduler loop.
//! - [`mux`] maps a [`Stimulus`] onto the block table and decides what the
//!   engine should do with it.
//!
//! Because stimuli arrive on a channel and the scheduler loop handles one
//! thing at a time, a stimulus that arrives during a tick is held in the
//! queue until the tick's update + assemble + publish section is over.

pub mod listener;
pub mod mux;

pub use listener::{StimulusSet, spawn_listener};
pub use mux::{Action, resolve};

use crate::block::Slot;

/// One decoded signal delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    /// SIGHUP, SIGINT or SIGTERM.
    Terminate(i32),
    /// Realtime signal `SIGRTMIN + slot`, with the queued value when the
    /// sender used `sigqueue`.
    Update { slot: Slot, payload: Option<i32> },
    /// `SIGRTMIN` carrying `(slot << 8) | button`.
    Click { value: i32 },
}
