//! Media information and probing module
//!
//! This module turns the probe tool's raw stream list into a `VideoDescriptor`
//! and answers the "is this a usable video" question for the other stages.

pub mod descriptor;
pub mod probe;

// Re-export commonly used types
pub use descriptor::{VideoDescriptor, parse_frame_rate};
pub use probe::{describe, is_valid_video_file, probe_video};
