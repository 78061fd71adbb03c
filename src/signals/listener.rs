// src/signals/listener.rs

//! OS signal plumbing for stimuli.
//!
//! All stimulus signals (SIGHUP, SIGINT, SIGTERM and every realtime signal)
//! are blocked in the process mask before any other thread exists, so every
//! thread inherits the block and no default disposition ever runs. A single
//! listener thread then collects them with `sigwaitinfo`. Realtime signals
//! queue in the kernel with their payloads, so nothing sent while the
//! scheduler is busy is lost.

use std::io;
use std::mem::MaybeUninit;
use std::ptr;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::block::Slot;
use crate::signals::Stimulus;

/// `si_code` of a signal sent with `sigqueue(3)`.
const SI_QUEUE: libc::c_int = -1;

const TERMINATION_SIGNALS: [libc::c_int; 3] = [libc::SIGHUP, libc::SIGINT, libc::SIGTERM];

/// Highest slot addressable through `SIGRTMIN + slot`.
pub fn max_slot() -> Slot {
    let span = libc::SIGRTMAX() - libc::SIGRTMIN();
    Slot::try_from(span).unwrap_or(Slot::MAX)
}

/// The set of signals that are handled as stimuli.
#[derive(Clone, Copy)]
pub struct StimulusSet {
    set: libc::sigset_t,
}

impl std::fmt::Debug for StimulusSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StimulusSet")
            .field("rtmin", &libc::SIGRTMIN())
            .field("rtmax", &libc::SIGRTMAX())
            .finish()
    }
}

impl StimulusSet {
    pub fn new() -> io::Result<Self> {
        let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
        // SAFETY: sigemptyset initialises the set it is given.
        let mut set = unsafe {
            if libc::sigemptyset(raw.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }
            raw.assume_init()
        };

        let realtime = libc::SIGRTMIN()..=libc::SIGRTMAX();
        for signo in TERMINATION_SIGNALS.into_iter().chain(realtime) {
            // SAFETY: `set` is an initialised sigset_t.
            if unsafe { libc::sigaddset(&mut set, signo) } != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(Self { set })
    }

    /// Block the stimulus signals for the calling thread (and every thread
    /// it spawns afterwards).
    ///
    /// Must run before the async runtime starts its threads.
    pub fn block(&self) -> io::Result<()> {
        // SAFETY: valid set pointer; old mask is not requested.
        let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &self.set, ptr::null_mut()) };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        debug!("stimulus signals blocked in process mask");
        Ok(())
    }

    /// Wait for the next stimulus signal, retrying on `EINTR`.
    fn wait(&self) -> io::Result<(libc::c_int, Option<i32>)> {
        loop {
            let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
            // SAFETY: `self.set` is initialised; `info` is writable.
            let signo = unsafe { libc::sigwaitinfo(&self.set, info.as_mut_ptr()) };
            if signo == -1 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            // SAFETY: sigwaitinfo filled `info` on success.
            let info = unsafe { info.assume_init() };
            let payload = if info.si_code == SI_QUEUE {
                // SAFETY: si_value is valid for SI_QUEUE deliveries.
                Some(sival_int(unsafe { info.si_value() }))
            } else {
                None
            };
            return Ok((signo, payload));
        }
    }
}

/// Read the `sival_int` member of a `sigval` union.
fn sival_int(value: libc::sigval) -> i32 {
    let raw = value.sival_ptr as usize as u64;
    if cfg!(target_endian = "big") && std::mem::size_of::<usize>() == 8 {
        (raw >> 32) as u32 as i32
    } else {
        raw as u32 as i32
    }
}

/// Translate a raw delivery into a stimulus.
///
/// `SIGRTMIN` is the click channel; `SIGRTMIN + n` updates slot `n`.
/// A click without a queued value cannot be routed and yields `None`.
pub fn decode(
    signo: libc::c_int,
    payload: Option<i32>,
    rtmin: libc::c_int,
    rtmax: libc::c_int,
) -> Option<Stimulus> {
    if TERMINATION_SIGNALS.contains(&signo) {
        return Some(Stimulus::Terminate(signo));
    }
    if signo == rtmin {
        return payload.map(|value| Stimulus::Click { value });
    }
    if signo > rtmin && signo <= rtmax {
        let slot = Slot::try_from(signo - rtmin).ok()?;
        return Some(Stimulus::Update { slot, payload });
    }
    None
}

/// Start the listener thread forwarding stimuli to `tx`.
///
/// The thread exits once the receiving side is dropped.
pub fn spawn_listener(
    set: StimulusSet,
    tx: mpsc::Sender<Stimulus>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stimulus-listener".to_string())
        .spawn(move || listen(set, tx))
}

fn listen(set: StimulusSet, tx: mpsc::Sender<Stimulus>) {
    let (rtmin, rtmax) = (libc::SIGRTMIN(), libc::SIGRTMAX());
    info!(rtmin, rtmax, "stimulus listener started");

    loop {
        let (signo, payload) = match set.wait() {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, "sigwaitinfo failed; stimulus listener stopping");
                return;
            }
        };

        let Some(stimulus) = decode(signo, payload, rtmin, rtmax) else {
            debug!(signo, "signal without a route; ignoring");
            continue;
        };

        debug!(?stimulus, "stimulus received");
        if tx.blocking_send(stimulus).is_err() {
            debug!("stimulus channel closed; listener exiting");
            return;
        }
    }
}

/// Restore an empty signal mask in a freshly forked child.
///
/// Called between fork and exec, so it only uses async-signal-safe calls.
pub(crate) fn reset_child_mask() -> io::Result<()> {
    let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
    // SAFETY: sigemptyset initialises `raw`; sigprocmask reads it.
    unsafe {
        libc::sigemptyset(raw.as_mut_ptr());
        if libc::sigprocmask(libc::SIG_SETMASK, raw.as_ptr(), ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RTMIN: i32 = 34;
    const RTMAX: i32 = 64;

    #[test]
    fn termination_signals_decode_to_terminate() {
        for signo in TERMINATION_SIGNALS {
            assert_eq!(decode(signo, None, RTMIN, RTMAX), Some(Stimulus::Terminate(signo)));
        }
    }

    #[test]
    fn rtmin_is_the_click_channel() {
        assert_eq!(
            decode(RTMIN, Some((3 << 8) | 1), RTMIN, RTMAX),
            Some(Stimulus::Click { value: (3 << 8) | 1 })
        );
        assert_eq!(decode(RTMIN, None, RTMIN, RTMAX), None);
    }

    #[test]
    fn rtmin_plus_n_updates_slot_n() {
        assert_eq!(
            decode(RTMIN + 3, None, RTMIN, RTMAX),
            Some(Stimulus::Update { slot: 3, payload: None })
        );
        assert_eq!(
            decode(RTMAX, Some(-2), RTMIN, RTMAX),
            Some(Stimulus::Update { slot: 30, payload: Some(-2) })
        );
    }

    #[test]
    fn other_signals_have_no_route() {
        assert_eq!(decode(libc::SIGUSR1, None, RTMIN, RTMAX), None);
        assert_eq!(decode(RTMAX + 1, None, RTMIN, RTMAX), None);
    }

    #[test]
    fn max_slot_matches_realtime_range() {
        let expected = (libc::SIGRTMAX() - libc::SIGRTMIN()) as Slot;
        assert_eq!(max_slot(), expected);
        assert!(max_slot() >= 8);
    }

    #[test]
    fn sival_int_reads_the_int_member() {
        for value in [0x0302, -7, i32::MAX, i32::MIN] {
            let raw = value as u32 as u64;
            let raw = if cfg!(target_endian = "big") && std::mem::size_of::<usize>() == 8 {
                raw << 32
            } else {
                raw
            };
            let sigval = libc::sigval {
                sival_ptr: raw as usize as *mut libc::c_void,
            };
            assert_eq!(sival_int(sigval), value);
        }
    }
}
