// src/block/mod.rs

//! Block descriptors and the fixed, ordered block table.
//!
//! A [`Block`] pairs its immutable identity (commands, interval, signal
//! slot) with two [`Capture`] buffers: the output of the latest run and the
//! output seen by the last assembly pass. The [`BlockTable`] is built once
//! at startup and never resized; its order is the order of the status line.

pub mod capture;

pub use capture::{Capture, DEFAULT_CAPACITY};

use crate::errors::{Result, StatusBlocksError};

/// Signal slot of a block. `0` means the block has no slot.
pub type Slot = u8;

/// Static description of a block, as provided by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpec {
    pub update_command: String,
    pub click_command: Option<String>,
    pub interval: i32,
    pub signal_slot: Slot,
}

#[derive(Debug, Clone)]
pub struct Block {
    spec: BlockSpec,
    current: Capture,
    previous: Capture,
}

impl Block {
    pub fn new(spec: BlockSpec, capacity: usize) -> Self {
        Self {
            spec,
            current: Capture::with_capacity(capacity),
            previous: Capture::with_capacity(capacity),
        }
    }

    pub fn update_command(&self) -> &str {
        &self.spec.update_command
    }

    pub fn click_command(&self) -> Option<&str> {
        self.spec.click_command.as_deref()
    }

    pub fn interval(&self) -> i32 {
        self.spec.interval
    }

    pub fn signal_slot(&self) -> Slot {
        self.spec.signal_slot
    }

    /// Clickable blocks carry their slot as a marker byte in the status line.
    pub fn is_clickable(&self) -> bool {
        self.spec.click_command.is_some()
    }

    /// Whether the block takes part in the startup warm-up pass.
    pub fn runs_at_startup(&self) -> bool {
        self.spec.interval >= 0
    }

    /// Whether a periodic tick `tick` (> 0) refreshes this block.
    pub fn is_due(&self, tick: u64) -> bool {
        self.spec.interval > 0 && tick % self.spec.interval as u64 == 0
    }

    pub fn current(&self) -> &Capture {
        &self.current
    }

    pub fn previous(&self) -> &Capture {
        &self.previous
    }

    /// Store freshly captured command output.
    pub fn record_output(&mut self, output: &[u8]) {
        self.current.replace(output);
    }

    /// Whether current and previous content diverge.
    pub fn has_changed(&self) -> bool {
        self.current.content() != self.previous.content()
    }

    /// Make `previous` match `current`.
    pub(crate) fn commit(&mut self) {
        let Self {
            current, previous, ..
        } = self;
        previous.replace(current.content());
    }
}

/// Immutable, ordered sequence of blocks.
#[derive(Debug, Clone)]
pub struct BlockTable {
    blocks: Vec<Block>,
}

impl BlockTable {
    /// Build the table from block specs, in order.
    ///
    /// An empty table is rejected: there would be nothing to display.
    pub fn new(specs: Vec<BlockSpec>, capacity: usize) -> Result<Self> {
        if specs.is_empty() {
            return Err(StatusBlocksError::ConfigError(
                "block table must contain at least one block".to_string(),
            ));
        }
        let blocks = specs
            .into_iter()
            .map(|spec| Block::new(spec, capacity))
            .collect();
        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Index of the block bound to `slot`, scanning in table order.
    ///
    /// Slot `0` never matches.
    pub fn position_by_slot(&self, slot: Slot) -> Option<usize> {
        if slot == 0 {
            return None;
        }
        self.blocks.iter().position(|b| b.signal_slot() == slot)
    }

    /// Slots declared by the table, in table order.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.blocks
            .iter()
            .map(|b| b.signal_slot())
            .filter(|&s| s != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(cmd: &str, interval: i32, slot: Slot, click: Option<&str>) -> BlockSpec {
        BlockSpec {
            update_command: cmd.to_string(),
            click_command: click.map(str::to_string),
            interval,
            signal_slot: slot,
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = BlockTable::new(vec![], DEFAULT_CAPACITY).unwrap_err();
        assert!(matches!(err, StatusBlocksError::ConfigError(_)));
    }

    #[test]
    fn lookup_by_slot_ignores_zero() {
        let table = BlockTable::new(
            vec![spec("a", 1, 0, None), spec("b", 1, 3, None), spec("c", 1, 7, None)],
            DEFAULT_CAPACITY,
        )
        .unwrap();

        assert_eq!(table.position_by_slot(3), Some(1));
        assert_eq!(table.position_by_slot(7), Some(2));
        assert_eq!(table.position_by_slot(0), None);
        assert_eq!(table.position_by_slot(9), None);
        assert_eq!(table.slots().collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn interval_semantics() {
        let never = Block::new(spec("n", -1, 0, None), 8);
        let once = Block::new(spec("o", 0, 0, None), 8);
        let every5 = Block::new(spec("e", 5, 0, None), 8);

        assert!(!never.runs_at_startup());
        assert!(once.runs_at_startup());
        assert!(every5.runs_at_startup());

        for tick in 1..=20 {
            assert!(!never.is_due(tick));
            assert!(!once.is_due(tick));
            assert_eq!(every5.is_due(tick), tick % 5 == 0);
        }
    }

    #[test]
    fn commit_makes_block_unchanged() {
        let mut block = Block::new(spec("a", 1, 0, None), 8);
        block.record_output(b"hello\n");
        assert!(block.has_changed());
        block.commit();
        assert!(!block.has_changed());
        assert_eq!(block.previous().content(), b"hello");
    }
}
