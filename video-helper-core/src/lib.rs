//! Core library for probing, converting and extracting frames from videos
//! using ffmpeg and ffprobe.
//!
//! This crate normalizes probe output into a [`VideoDescriptor`], resolves
//! time/index windows into frame ranges, streams decoded frames lazily,
//! re-encodes videos through a verified multi-stage pipeline, assembles frames
//! back into videos, and converts SRT subtitles to WebVTT.
//!
//! Every external tool sits behind a trait in [`external`], so the whole
//! library can be driven by mock implementations in tests.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use video_helper_core::external::{CrateFfprobeExecutor, SidecarFrameSourceOpener};
//! use video_helper_core::{CoreConfig, RangeRequest, extract_frames_from};
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! config.validate().unwrap();
//!
//! let request = RangeRequest::new()
//!     .with_instants(Some(5.0), Some(10.0))
//!     .with_frame_step(5);
//! let frames = extract_frames_from(
//!     &CrateFfprobeExecutor::new(),
//!     &SidecarFrameSourceOpener,
//!     Path::new("/path/to/input.mp4"),
//!     &request,
//!     false,
//!     &config,
//! )
//! .unwrap();
//!
//! for frame in frames {
//!     let frame = frame.unwrap();
//!     println!("{:?}", frame.shape());
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod frames;
pub mod media;
pub mod subtitles;
pub mod temp_files;
pub mod transcode;
pub mod utils;

// Re-exports for public API
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use frames::{
    Frame, FrameRange, FrameStream, RangeRequest, extract_frames, extract_frames_from, resolve,
};
pub use media::{VideoDescriptor, is_valid_video_file, probe_video};
pub use subtitles::{SubtitleOutputs, srt_to_vtt};
pub use transcode::{TranscodeRequest, convert, dump_frames, try_dump_frames};
pub use temp_files::{create_temp_dir, create_temp_file_path};
pub use utils::format_timecode;
