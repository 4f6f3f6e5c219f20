//! Frames-to-video assembly.
//!
//! Frames are written as numbered PNG images into a scoped temporary folder,
//! assembled by ffmpeg into an H.264 movie at the requested rate, and the
//! movie is then placed at the output path (remultiplexed when the output
//! container differs from the working one).

use std::path::{Path, PathBuf};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, run_ffmpeg};
use crate::frames::Frame;
use crate::temp_files::create_temp_dir;
use crate::transcode::pipeline::promote;
use crate::utils::has_extension;

/// printf-style pattern of the intermediate images.
pub const FRAME_PATTERN: &str = "frame_%09d.png";

/// Name of the assembled movie inside the temporary folder.
pub const TEMP_MOVIE: &str = "temp_movie.mp4";

fn frame_file_name(index: usize) -> String {
    format!("frame_{index:09}.png")
}

/// Encoder options for frames of `width` x `height`.
///
/// 4:2:0 chroma needs even dimensions. Other sizes keep the encoder's own
/// choice of pixel format so the frame size survives the round trip.
fn encoder_args(width: u32, height: u32) -> Vec<&'static str> {
    let mut args = vec!["-c:v", "libx264"];
    if width % 2 == 0 && height % 2 == 0 {
        args.extend(["-pix_fmt", "yuv420p"]);
    } else {
        log::debug!("Frame size {width}x{height} is odd, leaving the pixel format to the encoder");
    }
    args
}

/// Assembles `frames` into a video at `fps` frames per second.
///
/// # Errors
///
/// `EmptyInput` when there are no frames, `InconsistentFrameShape` naming
/// the first frame whose shape differs from the first one, or the error of
/// the image writer or the external tool.
pub fn dump_frames<S, I>(
    spawner: &S,
    frames: I,
    output: &Path,
    fps: u32,
    config: &CoreConfig,
) -> CoreResult<PathBuf>
where
    S: FfmpegSpawner,
    I: IntoIterator<Item = Frame>,
{
    try_dump_frames(spawner, frames.into_iter().map(Ok), output, fps, config)
}

/// Same as [`dump_frames`], for a fallible sequence such as a `FrameStream`.
/// The first error in the sequence aborts the dump.
pub fn try_dump_frames<S, I>(
    spawner: &S,
    frames: I,
    output: &Path,
    fps: u32,
    config: &CoreConfig,
) -> CoreResult<PathBuf>
where
    S: FfmpegSpawner,
    I: IntoIterator<Item = CoreResult<Frame>>,
{
    if fps == 0 {
        return Err(CoreError::Config("dump frame rate must be positive".to_string()));
    }

    let temp_dir = create_temp_dir(config, "video_helper_dump_")?;
    let mut expected = None;
    let mut size = (0, 0);
    let mut count = 0usize;

    for (index, frame) in frames.into_iter().enumerate() {
        let frame = frame?;
        let shape = frame.shape();
        match expected {
            None => {
                expected = Some(shape);
                size = (frame.width(), frame.height());
            }
            Some(expected) if expected != shape => {
                return Err(CoreError::InconsistentFrameShape {
                    index,
                    expected,
                    actual: shape,
                });
            }
            Some(_) => {}
        }
        frame.as_image().save(temp_dir.path().join(frame_file_name(index)))?;
        count += 1;
    }

    if count == 0 {
        return Err(CoreError::EmptyInput);
    }
    log::info!("Wrote {count} frames, assembling at {fps} fps");

    let movie = temp_dir.path().join(TEMP_MOVIE);
    let pattern = temp_dir.path().join(FRAME_PATTERN);
    let mut cmd = FfmpegCommandBuilder::new(config).build();
    cmd.args(["-framerate", fps.to_string().as_str()]);
    cmd.input(&*pattern.to_string_lossy());
    cmd.args(encoder_args(size.0, size.1));
    cmd.output(&*movie.to_string_lossy());
    run_ffmpeg(spawner, cmd, "assemble frames", config)?;

    let stream_copy = !has_extension(output, "mp4");
    promote(spawner, config, &movie, output, stream_copy)?;

    log::info!("Frames dumped to {}", output.display());
    Ok(output.to_path_buf())
}
