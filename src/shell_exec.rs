//! Subprocess execution with a hard deadline.
//!
//! Auxiliary commands (git, mostly) must never hang an analysis run. A command
//! that outlives its timeout is killed and reported as having produced no
//! output; that is not an error.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use wait_timeout::ChildExt;

/// Deadline for auxiliary commands.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a finished command produced.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Trimmed stdout; `None` when empty
    pub stdout: Option<String>,
    /// Trimmed stderr; `None` when empty
    pub stderr: Option<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `cmd` to completion or until `timeout` elapses.
///
/// Returns `Ok(None)` when the deadline passed and the child was killed.
/// Errors only when the command can't be spawned or waited on.
pub fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> std::io::Result<Option<CommandOutput>> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Drain both pipes on threads so a chatty child can't fill a pipe and stall
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            let stdout = join_output(stdout_reader);
            let stderr = join_output(stderr_reader);
            log::debug!("{program} exited with {status}");
            Ok(Some(CommandOutput {
                status,
                stdout,
                stderr,
            }))
        }
        Ok(None) => {
            log::warn!("{program} timed out after {timeout:?}; killed");
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold the pipes open; leave the readers detached
            Ok(None)
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(e)
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_output(reader: JoinHandle<Vec<u8>>) -> Option<String> {
    let bytes = reader.join().ok()?;
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    (!text.is_empty()).then_some(text)
}
