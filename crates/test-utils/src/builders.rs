#![allow(dead_code)]

use statusblocks::block::Slot;
use statusblocks::config::{BlockConfig, ConfigFile, ConfigSection, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                block: Vec::new(),
            },
        }
    }

    pub fn with_block(mut self, block: BlockConfig) -> Self {
        self.config.block.push(block);
        self
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.config.config.delimiter = delimiter.to_string();
        self
    }

    pub fn with_tick(mut self, tick: &str) -> Self {
        self.config.config.tick = tick.to_string();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.config.capacity = capacity;
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `BlockConfig`.
pub struct BlockConfigBuilder {
    block: BlockConfig,
}

impl BlockConfigBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            block: BlockConfig {
                command: command.to_string(),
                click: None,
                interval: 0,
                signal: 0,
            },
        }
    }

    pub fn interval(mut self, interval: i32) -> Self {
        self.block.interval = interval;
        self
    }

    pub fn signal(mut self, slot: Slot) -> Self {
        self.block.signal = slot;
        self
    }

    pub fn click(mut self, command: &str) -> Self {
        self.block.click = Some(command.to_string());
        self
    }

    pub fn build(self) -> BlockConfig {
        self.block
    }
}
