// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running block commands, using
//! `tokio::process::Command`.
//!
//! - [`command`] builds the child processes (arguments, stdio, signal mask,
//!   session).
//! - [`runner`] runs an update command with a bounded stdout read, and
//!   starts click commands fire-and-forget.
//! - [`backend`] provides the `BlockExecutor` trait and the concrete
//!   `ProcessExecutor` used in production, which tests replace with a fake.

pub mod backend;
pub mod command;
pub mod runner;

pub use backend::{BlockExecutor, ProcessExecutor};
pub use runner::UpdateOutput;
