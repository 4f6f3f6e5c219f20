//! Plain process execution with an optional timeout.
//!
//! Used for tools that are not driven through ffmpeg-sidecar (ffprobe). Both
//! pipes are drained on helper threads so a chatty child can never block on a
//! full pipe while the caller polls for exit.

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};

/// How often a running child is polled while a timeout is armed.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Logs a command line before it is executed.
pub fn log_command(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy()).collect();
    debug!("Executing command: {} {}", program, args.join(" "));
}

/// Runs `cmd` to completion, killing it if `timeout` elapses first.
///
/// A non-zero exit is an error carrying the child's stderr.
pub fn run_command_with_timeout(
    cmd: &mut Command,
    tool: &str,
    timeout: Option<Duration>,
) -> CoreResult<Output> {
    log_command(cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| command_start_error(tool, e))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CoreError::ExternalTool {
            tool: tool.to_string(),
            message: "stdout was not captured".to_string(),
        })?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| CoreError::ExternalTool {
            tool: tool.to_string(),
            message: "stderr was not captured".to_string(),
        })?;

    let stdout_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });
    let stderr_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        buf
    });

    let status = match timeout {
        None => child.wait().map_err(|e| command_wait_error(tool, e))?,
        Some(limit) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) if start.elapsed() >= limit => {
                        let _ = child.kill();
                        let _ = child.wait();
                        error!("{} timed out after {:.1}s, process killed", tool, limit.as_secs_f64());
                        return Err(CoreError::Timeout {
                            tool: tool.to_string(),
                            seconds: limit.as_secs_f64(),
                        });
                    }
                    Ok(None) => thread::sleep(POLL_INTERVAL),
                    Err(e) => return Err(command_wait_error(tool, e)),
                }
            }
        }
    };

    let output = Output {
        status,
        stdout: stdout_handle.join().unwrap_or_default(),
        stderr: stderr_handle.join().unwrap_or_default(),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("{} failed with {}: {}", tool, output.status, stderr.trim());
        return Err(command_failed_error(tool, output.status, stderr));
    }

    Ok(output)
}
