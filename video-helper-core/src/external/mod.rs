// ============================================================================
// video-helper-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every interaction with the external command-line
// media tools. Each collaborator sits behind a trait so the probe adapter,
// frame iterator and transcode pipeline can be driven by mocks in tests.
//
// KEY COMPONENTS:
// - FfprobeExecutor: probe(path) -> raw stream list
// - FfmpegSpawner / FfmpegProcess: run a transcode command under a timeout
// - FrameSourceOpener / FrameSource: open(path, stabilize) -> read() / stop()
// - Dependency checking

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Plain process execution with timeout
pub mod command;

/// Contains ffmpeg argument building helpers
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Contains traits and implementations for decoded frame streams
pub mod frame_source;

/// Mock implementations of the external tool traits
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain, stream_copy_command};
pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, ProcessExit, SidecarProcess, SidecarSpawner, run_ffmpeg,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, ProbeReport, RawStream};
pub use frame_source::{
    FrameSource, FrameSourceOpener, SidecarFrameSource, SidecarFrameSourceOpener,
};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that a required external command is available and executable.
///
/// Runs the command with `-version` and discards its output.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::ExternalTool {
                tool: cmd_name.to_string(),
                message: "not found on PATH".to_string(),
            })
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(crate::error::command_start_error(cmd_name, e))
        }
    }
}

/// Checks both external tools named in `config`.
pub fn check_dependencies(config: &CoreConfig) -> CoreResult<()> {
    check_dependency(&config.ffprobe_bin)?;
    check_dependency(&config.ffmpeg_bin)
}
