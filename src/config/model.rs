// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::block::{BlockSpec, BlockTable, DEFAULT_CAPACITY, Slot};
use crate::engine::assembler::DEFAULT_DELIMITER;
use crate::errors::Result;
use crate::lock::DEFAULT_LOCK_FILE;
use crate::types::PublisherKind;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// delimiter = " | "
/// tick = "1s"
///
/// [[block]]
/// command = "/home/me/bin/cpu"
/// interval = 5
///
/// [[block]]
/// command = "/home/me/bin/volume"
/// click = "/home/me/bin/volume-click"
/// interval = -1
/// signal = 3
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// `[[block]]` entries, in display order.
    #[serde(default)]
    pub block: Vec<BlockConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub block: Vec<BlockConfig>,
    tick: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        block: Vec<BlockConfig>,
        tick: Duration,
    ) -> Self {
        Self { config, block, tick }
    }

    /// Parsed scheduler tick period.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Build the runtime block table, in configuration order.
    pub fn block_table(&self) -> Result<BlockTable> {
        let specs = self.block.iter().map(BlockConfig::to_spec).collect();
        BlockTable::new(specs, self.config.capacity)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Text placed between two non-empty blocks.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Scheduler tick period, e.g. `"1s"` or `"500ms"`.
    #[serde(default = "default_tick")]
    pub tick: String,

    /// Bytes of output kept per block.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    #[serde(default)]
    pub publisher: PublisherKind,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_tick() -> String {
    "1s".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_lock_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOCK_FILE)
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            tick: default_tick(),
            capacity: default_capacity(),
            lock_file: default_lock_file(),
            publisher: PublisherKind::default(),
        }
    }
}

/// One `[[block]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockConfig {
    /// Program run to refresh the block.
    pub command: String,

    /// Program run with the button number when the block is clicked.
    #[serde(default)]
    pub click: Option<String>,

    /// Refresh cadence in ticks: `< 0` never, `0` at startup only,
    /// `n > 0` every n ticks.
    #[serde(default)]
    pub interval: i32,

    /// Realtime signal offset that refreshes this block; `0` for none.
    #[serde(default)]
    pub signal: Slot,
}

impl BlockConfig {
    pub fn to_spec(&self) -> BlockSpec {
        BlockSpec {
            update_command: self.command.clone(),
            click_command: self.click.clone(),
            interval: self.interval,
            signal_slot: self.signal,
        }
    }
}
