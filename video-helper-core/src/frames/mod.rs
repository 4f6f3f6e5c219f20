//! Frame extraction: decoded frames, range resolution and the lazy stream.

pub mod extract;
pub mod frame;
pub mod range;

pub use extract::{FrameSelector, FrameStream, Selection, extract_frames, extract_frames_from};
pub use frame::{FRAME_CHANNELS, Frame};
pub use range::{FrameRange, RangeRequest, resolve};
