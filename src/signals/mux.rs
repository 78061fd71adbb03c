// src/signals/mux.rs

//! Route a [`Stimulus`] to the block it addresses.

use tracing::debug;

use crate::block::{BlockTable, Slot};
use crate::signals::Stimulus;

/// What the engine should do in response to a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Clean up and exit.
    Terminate { signal: i32 },
    /// Re-run the block's update command (with `arg` if present), then
    /// re-assemble and publish.
    Update { index: usize, arg: Option<i32> },
    /// Start the block's click command with `button`; no re-assembly.
    Click { index: usize, button: u8 },
    /// Nothing is bound to this stimulus.
    Ignore,
}

/// Split a packed click value into `(slot, button)`.
pub fn unpack_click(value: i32) -> Option<(Slot, u8)> {
    if value < 0 {
        return None;
    }
    let slot = Slot::try_from(value >> 8).ok()?;
    let button = (value & 0xff) as u8;
    Some((slot, button))
}

/// Resolve a stimulus against the block table.
pub fn resolve(table: &BlockTable, stimulus: Stimulus) -> Action {
    match stimulus {
        Stimulus::Terminate(signal) => Action::Terminate { signal },
        Stimulus::Update { slot, payload } => match table.position_by_slot(slot) {
            Some(index) => Action::Update {
                index,
                arg: payload,
            },
            None => {
                debug!(slot, "update signal for unconfigured slot; ignoring");
                Action::Ignore
            }
        },
        Stimulus::Click { value } => {
            let Some((slot, button)) = unpack_click(value) else {
                debug!(value, "malformed click value; ignoring");
                return Action::Ignore;
            };
            match table.position_by_slot(slot) {
                Some(index) if table.get(index).is_some_and(|b| b.is_clickable()) => {
                    Action::Click { index, button }
                }
                Some(_) => {
                    debug!(slot, button, "click on block without click command; ignoring");
                    Action::Ignore
                }
                None => {
                    debug!(slot, button, "click for unconfigured slot; ignoring");
                    Action::Ignore
                }
            }
        }
    }
}
