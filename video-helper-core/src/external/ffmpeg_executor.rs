// ============================================================================
// video-helper-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and waiting on FFmpeg
// processes. Every transcode stage (stream copy, filter/encode, image sequence
// assembly) goes through `run_ffmpeg`, which enforces the configured timeout
// and turns a non-zero exit into an error carrying ffmpeg's error lines.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::command::POLL_INTERVAL;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant};

// --- FFmpeg Execution Abstraction ---

/// How an ffmpeg process ended.
#[derive(Debug, Clone)]
pub struct ProcessExit {
    pub status: ExitStatus,
    /// Error and fatal lines ffmpeg printed while running
    pub errors: Vec<String>,
}

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Waits for the process to exit, killing it once `timeout` has elapsed.
    ///
    /// Diagnostics are relayed to the log at debug level, or trace when `quiet`.
    fn wait_with_timeout(
        &mut self,
        timeout: Option<Duration>,
        quiet: bool,
    ) -> CoreResult<ProcessExit>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn wait_with_timeout(
        &mut self,
        timeout: Option<Duration>,
        quiet: bool,
    ) -> CoreResult<ProcessExit> {
        let events = self.0.iter().map_err(|e| CoreError::ExternalTool {
            tool: "ffmpeg".to_string(),
            message: format!("failed to read process events: {e}"),
        })?;

        // stderr must keep draining while we poll for exit
        let drain = thread::spawn(move || {
            let mut errors = Vec::new();
            for event in events {
                match event {
                    FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg)
                    | FfmpegEvent::Error(msg) => {
                        log::debug!("ffmpeg: {msg}");
                        errors.push(msg);
                    }
                    FfmpegEvent::Log(_, msg) if quiet => log::trace!("ffmpeg: {msg}"),
                    FfmpegEvent::Log(_, msg) => log::debug!("ffmpeg: {msg}"),
                    _ => {}
                }
            }
            errors
        });

        let status = match timeout {
            None => self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))?,
            Some(limit) => {
                let start = Instant::now();
                loop {
                    match self.0.as_inner_mut().try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if start.elapsed() >= limit => {
                            let _ = self.0.kill();
                            let _ = self.0.wait();
                            let _ = drain.join();
                            log::error!("ffmpeg timed out after {:.1}s, process killed", limit.as_secs_f64());
                            return Err(CoreError::Timeout {
                                tool: "ffmpeg".to_string(),
                                seconds: limit.as_secs_f64(),
                            });
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(e) => return Err(command_wait_error("ffmpeg", e)),
                    }
                }
            }
        };

        let errors = drain.join().unwrap_or_default();
        Ok(ProcessExit { status, errors })
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

/// Spawns `cmd`, waits for it under the configured timeout and checks its exit.
///
/// `label` names the pipeline stage in logs and errors.
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    cmd: FfmpegCommand,
    label: &str,
    config: &CoreConfig,
) -> CoreResult<()> {
    log::debug!("Running {label} command: {cmd:?}");

    let exit = spawner
        .spawn(cmd)?
        .wait_with_timeout(config.timeout, config.quiet)?;

    if !exit.status.success() {
        log::error!("ffmpeg ({label}) failed: {}", exit.status);
        return Err(command_failed_error(
            format!("ffmpeg ({label})"),
            exit.status,
            exit.errors.join("\n"),
        ));
    }

    log::debug!("ffmpeg ({label}) completed");
    Ok(())
}
