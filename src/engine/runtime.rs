// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::BlockExecutor;
use crate::publish::StatusPublisher;
use crate::signals::Stimulus;

use super::core::CoreRuntime;
use super::{BlockRun, CoreCommand, RuntimeEvent};

/// Drives the core through ticks and stimuli, and delegates command
/// execution to a `BlockExecutor` and display to a `StatusPublisher`.
///
/// Each cycle has two phases:
/// 1. critical section: the tick's due blocks run, the line is assembled
///    and published. Stimuli are not read from the channel meanwhile, so
///    they wait in the queue.
/// 2. idle section: sleep for one tick period; stimuli arriving during the
///    sleep are serviced immediately without restarting the sleep.
pub struct Runtime<E: BlockExecutor> {
    core: CoreRuntime,
    stimuli: mpsc::Receiver<Stimulus>,
    executor: E,
    publisher: Box<dyn StatusPublisher>,
    tick: Duration,
    cleaned_up: bool,
}

impl<E: BlockExecutor> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl<E: BlockExecutor> Runtime<E> {
    pub fn new(
        core: CoreRuntime,
        stimuli: mpsc::Receiver<Stimulus>,
        executor: E,
        publisher: Box<dyn StatusPublisher>,
        tick: Duration,
    ) -> Self {
        Self {
            core,
            stimuli,
            executor,
            publisher,
            tick,
            cleaned_up: false,
        }
    }

    /// Run until a termination stimulus arrives or a fatal error occurs.
    ///
    /// Cleanup (clearing the published status) runs on both paths.
    pub async fn run(mut self) -> Result<()> {
        info!(tick = ?self.tick, blocks = self.core.table().len(), "statusblocks runtime started");

        let result = self.event_loop().await;
        self.cleanup().await;

        match &result {
            Ok(()) => info!("runtime exiting"),
            Err(e) => warn!(error = %e, "runtime stopped on error"),
        }
        result
    }

    async fn event_loop(&mut self) -> Result<()> {
        loop {
            let step = self.core.step(RuntimeEvent::Tick);
            self.execute(step.commands).await?;

            let sleep = tokio::time::sleep(self.tick);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    () = &mut sleep => break,
                    stimulus = self.stimuli.recv() => {
                        let Some(stimulus) = stimulus else {
                            return Err(anyhow!("stimulus channel closed").into());
                        };
                        debug!(?stimulus, "runtime received stimulus");

                        let step = self.core.step(RuntimeEvent::Stimulus(stimulus));
                        self.execute(step.commands).await?;
                        if !step.keep_running {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Execute commands from the core.
    async fn execute(&mut self, commands: Vec<CoreCommand>) -> Result<()> {
        for command in commands {
            match command {
                CoreCommand::Refresh(runs) => {
                    self.refresh(runs).await?;
                    self.publish_if_changed().await;
                }
                CoreCommand::Click(click) => {
                    if let Err(e) = self.executor.click(&click.program, click.button) {
                        warn!(
                            block = click.index,
                            slot = click.slot,
                            button = click.button,
                            error = %e,
                            "failed to start click command"
                        );
                    }
                }
                CoreCommand::Exit { signal } => {
                    info!(signal, "core issued Exit command");
                }
            }
        }
        Ok(())
    }

    async fn refresh(&mut self, runs: Vec<BlockRun>) -> Result<()> {
        for run in runs {
            let output = self
                .executor
                .update(&run.program, run.arg, run.capacity)
                .await?;
            self.core.record_output(run.index, output);
        }
        Ok(())
    }

    async fn publish_if_changed(&mut self) {
        let Some(line) = self.core.assemble() else {
            return;
        };
        debug!(status = %line, "publishing status line");
        if let Err(e) = self.publisher.publish(line.as_bytes()).await {
            warn!(error = %e, "failed to publish status line");
        }
    }

    async fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        if let Err(e) = self.publisher.clear().await {
            warn!(error = %e, "failed to clear status on shutdown");
        }
    }
}
