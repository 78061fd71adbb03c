//! Shared helpers for the statusblocks integration tests: config builders,
//! a scripted executor and a recording publisher, plus tracing and timeout
//! glue.

pub mod builders;
pub mod fake_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Install a per-test tracing subscriber once per test binary.
///
/// Runtime and executor logs stay captured unless a test fails or the run
/// uses `--nocapture`; `RUST_LOG=statusblocks=debug` shows every tick and
/// stimulus.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Await `f`, failing the test after 5 seconds.
///
/// Meant for runs whose stimuli are queued up front (ending in a
/// terminate) and for real child processes. Under a paused clock the
/// timeout is advanced like any other timer, so paused-clock runtime tests
/// drive time with `sleep` instead.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
