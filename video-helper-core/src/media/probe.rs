// ============================================================================
// video-helper-core/src/media/probe.rs
// ============================================================================
//
// METADATA PROBE ADAPTER
//
// Runs the probe tool through an `FfprobeExecutor` and normalizes its raw
// stream list into a `VideoDescriptor`. Every call re-runs the probe; nothing
// is cached.

use std::path::Path;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, ProbeReport, RawStream};
use crate::media::descriptor::{VideoDescriptor, parse_frame_rate};

/// Probes `path` and returns its descriptor.
///
/// # Errors
///
/// - `NotFound` when the path does not exist
/// - `InvalidMedia` when the probe fails to run or its report does not
///   describe a usable video stream
pub fn probe_video<E: FfprobeExecutor>(
    executor: &E,
    path: &Path,
    config: &CoreConfig,
) -> CoreResult<VideoDescriptor> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }

    let report = executor.probe(path, config).map_err(|e| match e {
        // Timeouts keep their own variant so callers can tell them apart
        CoreError::Timeout { .. } => e,
        other => CoreError::InvalidMedia {
            path: path.to_path_buf(),
            reason: format!("probe failed: {other}"),
        },
    })?;

    let descriptor = describe(&report, path)?;
    log::debug!(
        "Probed {}: {}x{}, {:.3}s @ {:.3} fps, sound: {}",
        path.display(),
        descriptor.width,
        descriptor.height,
        descriptor.duration,
        descriptor.frame_rate,
        descriptor.has_sound
    );
    Ok(descriptor)
}

/// Normalizes a raw probe report. `path` is only used in error messages.
pub fn describe(report: &ProbeReport, path: &Path) -> CoreResult<VideoDescriptor> {
    let invalid = |reason: String| CoreError::InvalidMedia {
        path: path.to_path_buf(),
        reason,
    };

    let video = report
        .streams
        .iter()
        .find(|s| is_codec_type(s, "video"))
        .ok_or_else(|| invalid("no video stream found".to_string()))?;

    let width = positive_dimension(video.width).ok_or_else(|| invalid(format!("invalid width {:?}", video.width)))?;
    let height = positive_dimension(video.height).ok_or_else(|| invalid(format!("invalid height {:?}", video.height)))?;

    let rate_text = video
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| invalid("missing frame rate".to_string()))?;
    let frame_rate =
        parse_frame_rate(rate_text).ok_or_else(|| invalid(format!("malformed frame rate '{rate_text}'")))?;

    // Matroska and a few other containers only report the format duration
    let duration_text = video
        .duration
        .as_deref()
        .or(report.format_duration.as_deref())
        .ok_or_else(|| invalid("missing duration".to_string()))?;
    let duration = duration_text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| invalid(format!("invalid duration '{duration_text}'")))?;

    let has_sound = report.streams.iter().any(|s| is_codec_type(s, "audio"));

    Ok(VideoDescriptor {
        width,
        height,
        duration,
        frame_rate,
        has_sound,
    })
}

/// True when `path` exists and probes as a video.
pub fn is_valid_video_file<E: FfprobeExecutor>(executor: &E, path: &Path, config: &CoreConfig) -> bool {
    match probe_video(executor, path, config) {
        Ok(_) => {
            log::info!("{} is a valid video file", path.display());
            true
        }
        Err(e) => {
            log::info!("{} is not a valid video file: {e}", path.display());
            false
        }
    }
}

fn is_codec_type(stream: &RawStream, codec_type: &str) -> bool {
    stream.codec_type.as_deref() == Some(codec_type)
}

fn positive_dimension(value: Option<i64>) -> Option<u32> {
    value.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok())
}
