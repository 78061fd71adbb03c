// src/exec/command.rs

//! Construction of the child processes for block commands.
//!
//! Block commands are executed directly (no shell), like `execv`: the
//! configured path is the program and at most one argument is passed.
//!
//! Every child starts with an empty signal mask, since the engine keeps its
//! stimulus signals blocked and the mask survives `exec`. Descriptors other
//! than stdio are close-on-exec in Rust, so children never hold on to the
//! engine's lock file or publisher connection.

use std::process::Stdio;

use tokio::process::Command;

use crate::signals::listener::reset_child_mask;

/// Command for a periodic or signal-triggered refresh.
///
/// Stdout is piped back to the engine; stderr is inherited so script
/// diagnostics end up next to the engine's own logs.
pub fn update_command(program: &str, arg: Option<i32>) -> Command {
    let mut cmd = Command::new(program);
    if let Some(value) = arg {
        cmd.arg(value.to_string());
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    // SAFETY: the closure only calls async-signal-safe functions.
    unsafe {
        cmd.pre_exec(reset_child_mask);
    }
    cmd
}

/// Command for a click handler, started in its own session.
pub fn click_command(program: &str, button: u8) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg(button.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());

    // SAFETY: the closure only calls async-signal-safe functions.
    unsafe {
        cmd.pre_exec(|| {
            reset_child_mask()?;
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_command_passes_trigger_value() {
        let cmd = update_command("/usr/bin/volume", Some(-3));
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "/usr/bin/volume");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec!["-3"]);
    }

    #[test]
    fn update_command_without_value_has_no_args() {
        let cmd = update_command("/usr/bin/date", None);
        assert_eq!(cmd.as_std().get_args().count(), 0);
    }

    #[test]
    fn click_command_passes_button_number() {
        let cmd = click_command("vol.sh", 2);
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args, vec!["2"]);
    }
}
