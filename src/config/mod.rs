// src/config/mod.rs

//! Configuration loading and validation for statusblocks.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the block table before the engine starts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config_path};
pub use model::{BlockConfig, ConfigFile, ConfigSection, RawConfigFile};
pub use validate::validate_config;
