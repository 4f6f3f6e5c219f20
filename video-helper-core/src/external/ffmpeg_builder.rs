//! FFmpeg command builder utilities
//!
//! This module provides a builder pattern for constructing FFmpeg commands
//! with the options shared by every stage of the library: the configured
//! binary, a hidden banner, and unconditional output overwrite.

use crate::config::CoreConfig;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::Path;

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
}

impl FfmpegCommandBuilder {
    /// Creates a builder for the ffmpeg binary named in `config`
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            cmd: FfmpegCommand::new_with_path(&config.ffmpeg_bin),
        }
    }

    /// Builds the `FFmpeg` command with the banner hidden and `-y` set
    #[must_use]
    pub fn build(mut self) -> FfmpegCommand {
        self.cmd.hide_banner();
        self.cmd.overwrite();
        self.cmd
    }
}

/// Builds a stream copy (remultiplex) command from `input` to `output`.
#[must_use]
pub fn stream_copy_command(config: &CoreConfig, input: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new(config).build();
    cmd.input(&*input.to_string_lossy());
    cmd.args(["-c:v", "copy", "-c:a", "copy"]);
    cmd.output(&*output.to_string_lossy());
    cmd
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom filter to the chain
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds an optional filter, skipping `None`
    #[must_use]
    pub fn add_optional(self, filter: Option<String>) -> Self {
        match filter {
            Some(f) => self.add_filter(f),
            None => self,
        }
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
