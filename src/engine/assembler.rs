// src/engine/assembler.rs

//! Change detection and status line assembly.
//!
//! Assembly is split into two passes:
//! 1. a read-only scan comparing each block's current and previous capture,
//!    stopping at the first block that diverges;
//! 2. only if something diverged, a full rebuild that commits every block
//!    (previous := current) and concatenates the line in table order.
//!
//! The rebuild always recomputes the whole line, including unchanged blocks.

use std::fmt;

use tracing::trace;

use crate::block::BlockTable;

pub const DEFAULT_DELIMITER: &str = " ";

/// The externally visible status text.
///
/// Kept as raw bytes: block output is not required to be UTF-8, and marker
/// bytes are control characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine(Vec<u8>);

impl StatusLine {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct Assembler {
    delimiter: Vec<u8>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl Assembler {
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }

    /// Index of the first block whose current output differs from the
    /// output seen by the previous assembly. Pure read.
    pub fn first_change(&self, table: &BlockTable) -> Option<usize> {
        table.iter().position(|block| block.has_changed())
    }

    /// Rebuild the status line if any block changed.
    ///
    /// Returns `None` when nothing changed; in that case neither the table
    /// nor any line is touched.
    pub fn try_assemble(&self, table: &mut BlockTable) -> Option<StatusLine> {
        let Some(index) = self.first_change(table) else {
            trace!("no block output changed; skipping assembly");
            return None;
        };
        trace!(block = index, "block output changed; rebuilding status line");
        Some(self.rebuild(table))
    }

    fn rebuild(&self, table: &mut BlockTable) -> StatusLine {
        let mut line = Vec::new();

        for block in table.iter_mut() {
            block.commit();

            let content = block.current().content();
            if content.is_empty() {
                continue;
            }
            line.extend_from_slice(content);
            if block.is_clickable() && block.signal_slot() != 0 {
                line.push(block.signal_slot());
            }
            line.extend_from_slice(&self.delimiter);
        }

        if !line.is_empty() {
            line.truncate(line.len() - self.delimiter.len());
        }

        StatusLine(line)
    }
}
