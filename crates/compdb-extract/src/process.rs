//! Running helper processes with an optional time limit.

use crate::error::{ExtractError, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Run `cmd` to completion and return its stdout.
///
/// `command_line` is only used in errors. With a `timeout` the child is
/// killed once the deadline passes. A non-zero exit is an error carrying
/// the trimmed stderr.
pub(crate) fn run_captured(
    cmd: &mut Command,
    command_line: &str,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let spawn_error = |source| ExtractError::Spawn {
        command: command_line.to_string(),
        source,
    };

    let (status, stdout, stderr) = match timeout {
        None => {
            let output = cmd.output().map_err(spawn_error)?;
            (output.status, output.stdout, output.stderr)
        }
        Some(timeout) => {
            let child = cmd.spawn().map_err(spawn_error)?;
            wait_with_timeout(command_line, child, timeout)?
        }
    };

    if !status.success() {
        return Err(ExtractError::CommandFailed {
            command: command_line.to_string(),
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }
    Ok(stdout)
}

fn wait_with_timeout(
    command_line: &str,
    mut child: Child,
    timeout: Duration,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    // Drain the pipes on their own threads so a chatty child cannot block
    // on a full pipe while we poll.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractError::Timeout {
                    command: command_line.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(Duration::from_millis(10)),
            Err(source) => {
                return Err(ExtractError::Spawn {
                    command: command_line.to_string(),
                    source,
                })
            }
        }
    };

    Ok((
        status,
        stdout.and_then(|h| h.join().ok()).unwrap_or_default(),
        stderr.and_then(|h| h.join().ok()).unwrap_or_default(),
    ))
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}
