//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Convert a video through the verified transcode pipeline.
pub mod convert;

/// Extract a frame range as images or as a new video.
pub mod extract;

/// Print a video's descriptor.
pub mod probe;

/// Convert SRT subtitles to WebVTT.
pub mod srt2vtt;

/// Check whether a file is a usable video.
pub mod validate;
