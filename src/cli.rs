// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::PublisherKind;

/// Command-line arguments for `statusblocks`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "statusblocks",
    version,
    about = "Run small status commands on a timer or on signals and publish the combined status line.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `STATUSBLOCKS_CONFIG`, then `statusblocks.toml` in the
    /// current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Where to publish the status line; overrides `[config].publisher`.
    #[arg(long, value_enum, value_name = "KIND")]
    pub publisher: Option<PublisherKind>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STATUSBLOCKS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the block table, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = CliArgs::try_parse_from([
            "statusblocks",
            "--config",
            "bar.toml",
            "--publisher",
            "stdout",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.config.as_deref(), Some("bar.toml"));
        assert_eq!(args.publisher, Some(PublisherKind::Stdout));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }

    #[test]
    fn defaults_are_empty() {
        let args = CliArgs::try_parse_from(["statusblocks"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.publisher.is_none());
        assert!(!args.dry_run);
    }
}
