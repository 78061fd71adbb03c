// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state (tick counter, block captures)
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - the tick timer and the stimulus channel
//! - running commands through the executor and feeding output back
//! - publishing assembled lines
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels or processes.

use tracing::{debug, info};

use crate::block::{Block, BlockTable};
use crate::engine::assembler::{Assembler, StatusLine};
use crate::engine::{BlockRun, ClickRun, CoreCommand, CoreStep, RuntimeEvent};
use crate::exec::UpdateOutput;
use crate::signals::{Action, resolve};

/// Pure core runtime state.
///
/// This owns:
/// - the block table (identity plus current/previous captures)
/// - the assembler
/// - the tick counter
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRuntime {
    table: BlockTable,
    assembler: Assembler,
    next_tick: u64,
}

impl CoreRuntime {
    pub fn new(table: BlockTable, assembler: Assembler) -> Self {
        Self {
            table,
            assembler,
            next_tick: 0,
        }
    }

    pub fn table(&self) -> &BlockTable {
        &self.table
    }

    /// Number of ticks handled so far (the warm-up included).
    pub fn ticks_handled(&self) -> u64 {
        self.next_tick
    }

    /// Handle a single runtime event, returning the commands for the IO
    /// shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Tick => self.on_tick(),
            RuntimeEvent::Stimulus(stimulus) => match resolve(&self.table, stimulus) {
                Action::Terminate { signal } => {
                    info!(signal, "termination requested");
                    CoreStep {
                        commands: vec![CoreCommand::Exit { signal }],
                        keep_running: false,
                    }
                }
                Action::Update { index, arg } => {
                    debug!(block = index, ?arg, "signal-triggered update");
                    let runs: Vec<BlockRun> = self
                        .table
                        .get(index)
                        .map(|block| block_run(index, block, arg))
                        .into_iter()
                        .collect();
                    CoreStep {
                        commands: vec![CoreCommand::Refresh(runs)],
                        keep_running: true,
                    }
                }
                Action::Click { index, button } => self.on_click(index, button),
                Action::Ignore => CoreStep {
                    commands: Vec::new(),
                    keep_running: true,
                },
            },
        }
    }

    /// Store the result of an update run for block `index`.
    ///
    /// A command that could not be started, or that closed its output
    /// without writing anything, leaves the block as it was.
    pub fn record_output(&mut self, index: usize, output: UpdateOutput) {
        let Some(block) = self.table.get_mut(index) else {
            return;
        };
        match output {
            UpdateOutput::Captured(bytes) if !bytes.is_empty() => block.record_output(&bytes),
            UpdateOutput::Captured(_) => {
                debug!(block = index, "update produced no output; keeping previous output");
            }
            UpdateOutput::NotStarted => {
                debug!(block = index, "keeping previous output for block");
            }
        }
    }

    /// Assemble the status line if any block changed since the last call.
    pub fn assemble(&mut self) -> Option<StatusLine> {
        self.assembler.try_assemble(&mut self.table)
    }

    fn on_tick(&mut self) -> CoreStep {
        let tick = self.next_tick;
        self.next_tick += 1;

        let runs = if tick == 0 {
            // Warm-up: everything that may ever auto-run, runs once now.
            self.runs_where(|b| b.runs_at_startup())
        } else {
            self.runs_where(|b| b.is_due(tick))
        };

        debug!(tick, due = runs.len(), "tick");
        CoreStep {
            commands: vec![CoreCommand::Refresh(runs)],
            keep_running: true,
        }
    }

    fn on_click(&self, index: usize, button: u8) -> CoreStep {
        let mut commands = Vec::new();
        if let Some(block) = self.table.get(index) {
            if let Some(program) = block.click_command() {
                commands.push(CoreCommand::Click(ClickRun {
                    index,
                    slot: block.signal_slot(),
                    program: program.to_string(),
                    button,
                }));
            }
        }
        CoreStep {
            commands,
            keep_running: true,
        }
    }

    fn runs_where(&self, due: impl Fn(&Block) -> bool) -> Vec<BlockRun> {
        self.table
            .iter()
            .enumerate()
            .filter(|&(_, block)| due(block))
            .map(|(index, block)| block_run(index, block, None))
            .collect()
    }
}

fn block_run(index: usize, block: &Block, arg: Option<i32>) -> BlockRun {
    BlockRun {
        index,
        program: block.update_command().to_string(),
        arg,
        capacity: block.current().capacity(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockSpec, Slot};
    use crate::signals::Stimulus;

    fn core() -> CoreRuntime {
        let spec = |cmd: &str, interval: i32, slot: Slot, click: Option<&str>| BlockSpec {
            update_command: cmd.to_string(),
            click_command: click.map(str::to_string),
            interval,
            signal_slot: slot,
        };
        let table = BlockTable::new(
            vec![
                spec("cpu", 0, 0, None),
                spec("mem", 5, 3, Some("vol.sh")),
                spec("never", -1, 4, None),
                spec("clock", 2, 0, None),
            ],
            50,
        )
        .unwrap();
        CoreRuntime::new(table, Assembler::new("|"))
    }

    fn refreshed(step: &CoreStep) -> Vec<&str> {
        match step.commands.as_slice() {
            [CoreCommand::Refresh(runs)] => runs.iter().map(|r| r.program.as_str()).collect(),
            other => panic!("expected a single Refresh, got {other:?}"),
        }
    }

    #[test]
    fn warm_up_runs_every_non_negative_interval() {
        let mut core = core();
        let step = core.step(RuntimeEvent::Tick);
        assert_eq!(refreshed(&step), vec!["cpu", "mem", "clock"]);
        assert!(step.keep_running);
    }

    #[test]
    fn later_ticks_run_only_due_blocks() {
        let mut core = core();
        core.step(RuntimeEvent::Tick);

        let mut schedule = Vec::new();
        for _ in 1..=10 {
            let step = core.step(RuntimeEvent::Tick);
            schedule.push(refreshed(&step).join(","));
        }
        assert_eq!(
            schedule,
            vec!["", "clock", "", "clock", "mem", "clock", "", "clock", "", "mem,clock"]
        );
        assert_eq!(core.ticks_handled(), 11);
    }

    #[test]
    fn update_stimulus_refreshes_one_block_with_payload() {
        let mut core = core();
        let step = core.step(RuntimeEvent::Stimulus(Stimulus::Update {
            slot: 4,
            payload: Some(9),
        }));
        assert_eq!(
            step.commands,
            vec![CoreCommand::Refresh(vec![BlockRun {
                index: 2,
                program: "never".to_string(),
                arg: Some(9),
                capacity: 50,
            }])]
        );
    }

    #[test]
    fn click_stimulus_dispatches_click_command_only() {
        let mut core = core();
        let step = core.step(RuntimeEvent::Stimulus(Stimulus::Click {
            value: (3 << 8) | 2,
        }));
        assert_eq!(
            step.commands,
            vec![CoreCommand::Click(ClickRun {
                index: 1,
                slot: 3,
                program: "vol.sh".to_string(),
                button: 2,
            })]
        );
    }

    #[test]
    fn terminate_stops_the_loop() {
        let mut core = core();
        let step = core.step(RuntimeEvent::Stimulus(Stimulus::Terminate(libc::SIGINT)));
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::Exit { signal: libc::SIGINT }]);
    }

    #[test]
    fn not_started_keeps_previous_output() {
        let mut core = core();
        core.record_output(0, UpdateOutput::Captured(b"CPU:10%\n".to_vec()));
        assert!(core.assemble().is_some());

        core.record_output(0, UpdateOutput::NotStarted);
        assert!(core.assemble().is_none());
        assert_eq!(core.table().get(0).unwrap().current().content(), b"CPU:10%");
    }

    #[test]
    fn silent_run_keeps_previous_output() {
        let mut core = core();
        core.record_output(0, UpdateOutput::Captured(b"BAT:90%\n".to_vec()));
        assert!(core.assemble().is_some());

        core.record_output(0, UpdateOutput::Captured(Vec::new()));
        assert!(core.assemble().is_none());
        assert_eq!(core.table().get(0).unwrap().current().content(), b"BAT:90%");

        // A bare newline is output, and does blank the block.
        core.record_output(0, UpdateOutput::Captured(b"\n".to_vec()));
        assert_eq!(core.assemble().unwrap().as_bytes(), b"");
    }

    #[test]
    fn second_assemble_without_new_output_is_a_no_op() {
        let mut core = core();
        core.record_output(1, UpdateOutput::Captured(b"MEM:50%".to_vec()));
        let line = core.assemble().unwrap();
        assert_eq!(line.as_bytes(), b"MEM:50%\x03");
        assert!(core.assemble().is_none());
    }
}
