// video-helper-cli/src/commands/extract.rs

use std::fs;
use std::path::Path;

use video_helper_core::external::{CrateFfprobeExecutor, FrameSource, SidecarFrameSourceOpener, SidecarSpawner};
use video_helper_core::frames::FrameStream;
use video_helper_core::{CoreConfig, extract_frames_from, try_dump_frames};

use crate::cli::ExtractArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::output::{print_info, print_success};

pub fn run_extract(args: &ExtractArgs, config: &CoreConfig) -> CliResult<()> {
    let frames = extract_frames_from(
        &CrateFfprobeExecutor::new(),
        &SidecarFrameSourceOpener,
        &args.input,
        &args.range_request(),
        args.stabilize,
        config,
    )?;
    let range = frames.range();
    log::info!(
        "Selected frames {}..={} every {} ({} expected)",
        range.start_index,
        range.end_index,
        range.step,
        range.expected_count()
    );

    if let Some(dir) = &args.frames_dir {
        let written = write_frames(frames, dir)?;
        print_success(&format!("Wrote {written} frames"));
        print_info("Directory", dir.display());
    } else if let Some(video) = &args.video {
        let output = try_dump_frames(&SidecarSpawner, frames, video, args.fps, config)?;
        print_success("Frames assembled");
        print_info("Output", output.display());
    }
    Ok(())
}

/// Writes every frame of the stream as `frame_<n>.png`, numbered from 0.
pub fn write_frames<S: FrameSource>(frames: FrameStream<S>, dir: &Path) -> CliResult<usize> {
    fs::create_dir_all(dir).cli_with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = 0;
    for frame in frames {
        let path = dir.join(format!("frame_{written:06}.png"));
        frame?.as_image().save(&path)?;
        written += 1;
    }
    Ok(written)
}
