//! Transcoding: conversion pipeline with verification, and frame dumping.

pub mod dump;
pub mod filter;
pub mod pipeline;
pub mod request;
pub mod verify;

pub use dump::{dump_frames, try_dump_frames};
pub use filter::{encode_args, scale_pad_filter};
pub use pipeline::{ConversionPipeline, PipelineState, after_validation, convert};
pub use request::TranscodeRequest;
pub use verify::{verify_output, verify_unchanged};
