//! Subtitle conversion: SRT to WebVTT with a color stylesheet.

pub mod srt;

pub use srt::{
    SubtitleOutputs, convert_color_tags, extract_unique_colors, generate_cue_stylesheet, srt_to_vtt,
};
