// src/config/validate.rs

use std::collections::HashMap;

use crate::block::Slot;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, StatusBlocksError};
use crate::signals::listener::max_slot;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::StatusBlocksError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let tick = parse_tick(&raw.config.tick)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.block, tick))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_blocks(cfg)?;
    validate_global_config(cfg)?;
    validate_blocks(cfg)?;
    validate_signal_slots(cfg, max_slot())?;
    Ok(())
}

fn ensure_has_blocks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.block.is_empty() {
        return Err(StatusBlocksError::ConfigError(
            "config must contain at least one [[block]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.capacity == 0 {
        return Err(StatusBlocksError::ConfigError(
            "[config].capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    parse_tick(&cfg.config.tick)?;
    Ok(())
}

fn parse_tick(tick: &str) -> Result<std::time::Duration> {
    let period = parse_duration(tick)
        .map_err(|e| StatusBlocksError::ConfigError(format!("[config].tick: {e}")))?;
    if period.is_zero() {
        return Err(StatusBlocksError::ConfigError(
            "[config].tick must be greater than zero".to_string(),
        ));
    }
    Ok(period)
}

fn validate_blocks(cfg: &RawConfigFile) -> Result<()> {
    for (i, block) in cfg.block.iter().enumerate() {
        if block.command.trim().is_empty() {
            return Err(StatusBlocksError::ConfigError(format!(
                "block #{} has an empty `command`",
                i + 1
            )));
        }
        if let Some(click) = &block.click {
            if click.trim().is_empty() {
                return Err(StatusBlocksError::ConfigError(format!(
                    "block #{} ('{}') has an empty `click`",
                    i + 1,
                    block.command
                )));
            }
            // Clicks are addressed by slot; without one they can never arrive.
            if block.signal == 0 {
                return Err(StatusBlocksError::ConfigError(format!(
                    "block #{} ('{}') has a `click` command but no `signal`",
                    i + 1,
                    block.command
                )));
            }
        }
    }
    Ok(())
}

fn validate_signal_slots(cfg: &RawConfigFile, max: Slot) -> Result<()> {
    let mut seen: HashMap<Slot, &str> = HashMap::new();
    for block in cfg.block.iter().filter(|b| b.signal != 0) {
        if block.signal > max {
            return Err(StatusBlocksError::ConfigError(format!(
                "block '{}' uses signal {} but only 1..={} are available",
                block.command, block.signal, max
            )));
        }
        if let Some(other) = seen.insert(block.signal, &block.command) {
            return Err(StatusBlocksError::ConfigError(format!(
                "signal {} is used by both '{}' and '{}'",
                block.signal, other, block.command
            )));
        }
    }
    Ok(())
}
