// src/lib.rs

pub mod block;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod lock;
pub mod logging;
pub mod publish;
pub mod signals;
pub mod types;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::block::BlockTable;
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate, resolve_config_path};
use crate::engine::{Assembler, CoreRuntime, Runtime};
use crate::errors::Result;
use crate::exec::ProcessExecutor;
use crate::lock::InstanceLock;
use crate::publish::{StatusPublisher, open_publisher};
use crate::signals::{Stimulus, StimulusSet, spawn_listener};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the status publisher
/// - the single-instance lock
/// - stimulus signal blocking and the listener thread
/// - the async runtime driving the engine
///
/// The tokio runtime is built here, after the stimulus signals are blocked,
/// so that every runtime thread inherits the blocked mask.
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = resolve_config_path(args.config.as_deref());
    let cfg = load_and_validate(&config_path)?;
    info!(config = %config_path.display(), blocks = cfg.block.len(), "configuration loaded");

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let table = cfg.block_table()?;
    let publisher = open_publisher(args.publisher.unwrap_or(cfg.config.publisher))?;
    let mut lock = InstanceLock::acquire(&cfg.config.lock_file)?;

    let stimuli = StimulusSet::new()?;
    stimuli.block()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = rt.block_on(serve(&cfg, table, publisher, stimuli));

    lock.release();
    result
}

/// Start the stimulus listener and run the engine until it stops.
async fn serve(
    cfg: &ConfigFile,
    table: BlockTable,
    publisher: Box<dyn StatusPublisher>,
    stimuli: StimulusSet,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Stimulus>(64);
    let _listener = spawn_listener(stimuli, tx)?;

    let core = CoreRuntime::new(table, Assembler::new(cfg.config.delimiter.clone()));
    let runtime = Runtime::new(core, rx, ProcessExecutor::new(), publisher, cfg.tick());
    runtime.run().await
}

/// Simple dry-run output: print the block table.
fn print_dry_run(cfg: &ConfigFile) {
    println!("statusblocks dry-run");
    println!("  config.delimiter = {:?}", cfg.config.delimiter);
    println!("  config.tick = {:?}", cfg.tick());
    println!("  config.capacity = {}", cfg.config.capacity);
    println!("  config.lock_file = {}", cfg.config.lock_file.display());
    println!("  config.publisher = {:?}", cfg.config.publisher);
    println!();

    println!("blocks ({}):", cfg.block.len());
    for (i, block) in cfg.block.iter().enumerate() {
        println!("  {}. {}", i + 1, block.command);
        match block.interval {
            n if n < 0 => println!("      interval: never"),
            0 => println!("      interval: startup only"),
            n => println!("      interval: every {n} ticks"),
        }
        if block.signal != 0 {
            println!("      signal: SIGRTMIN+{}", block.signal);
        }
        if let Some(ref click) = block.click {
            println!("      click: {click}");
        }
    }

    debug!("dry-run complete (no execution)");
}
