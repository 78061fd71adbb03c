use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use statusblocks::errors::{Result, StatusBlocksError};
use statusblocks::exec::{BlockExecutor, UpdateOutput};
use statusblocks::publish::StatusPublisher;

/// One call made against the fake executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecCall {
    Update { program: String, arg: Option<i32> },
    Click { program: String, button: u8 },
}

/// One scripted answer to an update.
#[derive(Debug, Clone)]
enum Reply {
    Output(Vec<u8>),
    NotStarted,
    Fail(String),
}

/// A fake executor that:
/// - records every update and click it is asked to run
/// - answers updates from a per-program script of replies; once a script
///   is exhausted its last output repeats
#[derive(Clone, Default)]
pub struct FakeExecutor {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    last: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<Mutex<Vec<ExecCall>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outputs `program` produces on successive runs.
    pub fn with_outputs(self, program: &str, outputs: &[&str]) -> Self {
        let replies = outputs.iter().map(|o| Reply::Output(o.as_bytes().to_vec()));
        self.push(program, replies)
    }

    /// Queue a run of `program` that reports it could not be executed.
    pub fn with_not_started(self, program: &str) -> Self {
        self.push(program, [Reply::NotStarted])
    }

    /// Queue a run of `program` that fails with a spawn error.
    pub fn with_failure(self, program: &str, message: &str) -> Self {
        self.push(program, [Reply::Fail(message.to_string())])
    }

    fn push(self, program: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        {
            let mut scripts = self.scripts.lock().unwrap();
            scripts.entry(program.to_string()).or_default().extend(replies);
        }
        self
    }

    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Programs updated so far, in order.
    pub fn updates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ExecCall::Update { program, .. } => Some(program),
                ExecCall::Click { .. } => None,
            })
            .collect()
    }

    fn next_reply(&self, program: &str) -> Reply {
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(program)
            .and_then(|s| s.pop_front());
        let mut last = self.last.lock().unwrap();
        match next {
            Some(Reply::Output(out)) => {
                last.insert(program.to_string(), out.clone());
                Reply::Output(out)
            }
            Some(other) => other,
            None => Reply::Output(last.get(program).cloned().unwrap_or_default()),
        }
    }
}

impl BlockExecutor for FakeExecutor {
    fn update(
        &mut self,
        program: &str,
        arg: Option<i32>,
        capacity: usize,
    ) -> Pin<Box<dyn Future<Output = Result<UpdateOutput>> + Send + '_>> {
        self.calls.lock().unwrap().push(ExecCall::Update {
            program: program.to_string(),
            arg,
        });
        let result = match self.next_reply(program) {
            Reply::Output(mut out) => {
                out.truncate(capacity);
                Ok(UpdateOutput::Captured(out))
            }
            Reply::NotStarted => Ok(UpdateOutput::NotStarted),
            Reply::Fail(message) => Err(StatusBlocksError::Spawn {
                command: program.to_string(),
                source: std::io::Error::other(message),
            }),
        };

        Box::pin(async move { result })
    }

    fn click(&mut self, program: &str, button: u8) -> Result<()> {
        self.calls.lock().unwrap().push(ExecCall::Click {
            program: program.to_string(),
            button,
        });
        Ok(())
    }
}

/// A publisher that keeps every published line.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    lines: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Vec<u8>> {
        self.lines.lock().unwrap().clone()
    }

    /// Published lines as lossy strings, for readable assertions.
    pub fn lines_lossy(&self) -> Vec<String> {
        self.lines()
            .iter()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }
}

impl StatusPublisher for RecordingPublisher {
    fn publish<'a>(
        &'a mut self,
        line: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        self.lines.lock().unwrap().push(line.to_vec());
        Box::pin(async { Ok(()) })
    }
}
