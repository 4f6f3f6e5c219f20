// ============================================================================
// video-helper-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Core Library
//
// Every failure surfaced by the library is a `CoreError`. Nothing is retried
// or swallowed: probe, range, transcode and dump errors propagate directly to
// the caller with the offending path and, where a number was compared, the
// expected and actual values.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced by the video-helper core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid media file {}: {reason}", path.display())]
    InvalidMedia { path: PathBuf, reason: String },

    #[error("Invalid frame range: {0}")]
    Range(String),

    #[error(
        "Conversion verification failed for {}: {property} expected {expected}, got {actual}",
        path.display()
    )]
    ConversionVerification {
        path: PathBuf,
        property: String,
        expected: String,
        actual: String,
    },

    #[error(
        "Frame {index} has shape {actual:?}, expected {expected:?} (height, width, channels)"
    )]
    InconsistentFrameShape {
        index: usize,
        expected: (u32, u32, u32),
        actual: (u32, u32, u32),
    },

    #[error("No frames to dump")]
    EmptyInput,

    #[error("{tool} timed out after {seconds:.1}s")]
    Timeout { tool: String, seconds: f64 },

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Failed to start {tool}: {source}")]
    CommandStart {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for video-helper core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error for an external command that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        tool: tool.into(),
        source,
    }
}

/// Builds the error for an external command that exited unsuccessfully.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl AsRef<str>,
) -> CoreError {
    let stderr = stderr.as_ref().trim();
    let message = if stderr.is_empty() {
        format!("exited with {status}")
    } else {
        format!("exited with {status}: {stderr}")
    };
    CoreError::ExternalTool {
        tool: tool.into(),
        message,
    }
}

/// Builds the error for a failure while waiting on an external command.
pub fn command_wait_error(tool: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::ExternalTool {
        tool: tool.into(),
        message: format!("failed while waiting for process: {source}"),
    }
}
