//! FFprobe integration for media analysis.
//!
//! ffprobe is run as an external process (so the configured timeout applies)
//! and its JSON report is deserialized with the `ffprobe` crate's schema. The
//! report is then reduced to the handful of stream fields the metadata
//! adapter needs.

use std::path::Path;
use std::process::Command;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::command::run_command_with_timeout;

/// One stream as reported by the probe tool, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStream {
    /// "video", "audio", "subtitle", ...
    pub codec_type: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Stream duration in seconds, as the textual value ffprobe prints
    pub duration: Option<String>,
    /// Rational frame rate such as "30000/1001"
    pub r_frame_rate: Option<String>,
}

/// Raw probe output: the stream list plus the container duration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub streams: Vec<RawStream>,
    pub format_duration: Option<String>,
}

/// Trait for running the external probe tool.
pub trait FfprobeExecutor {
    /// Probes `path` and returns its raw stream list.
    fn probe(&self, path: &Path, config: &CoreConfig) -> CoreResult<ProbeReport>;
}

/// Concrete implementation running the ffprobe binary.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, path: &Path, config: &CoreConfig) -> CoreResult<ProbeReport> {
        log::debug!("Running ffprobe on: {}", path.display());

        let mut cmd = Command::new(&config.ffprobe_bin);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]);
        cmd.arg(path);

        let output = run_command_with_timeout(&mut cmd, "ffprobe", config.timeout)?;
        parse_probe_json(&output.stdout)
    }
}

/// Parses ffprobe's JSON report into a `ProbeReport`.
pub fn parse_probe_json(json: &[u8]) -> CoreResult<ProbeReport> {
    let metadata: ffprobe::FfProbe = serde_json::from_slice(json)
        .map_err(|e| CoreError::JsonParse(format!("ffprobe output deserialization: {e}")))?;

    let streams = metadata
        .streams
        .iter()
        .map(|s| RawStream {
            codec_type: s.codec_type.clone(),
            width: s.width,
            height: s.height,
            duration: s.duration.clone(),
            r_frame_rate: Some(s.r_frame_rate.clone()).filter(|r| !r.is_empty()),
        })
        .collect();

    Ok(ProbeReport {
        streams,
        format_duration: metadata.format.duration.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_probe_json(b"{ not json").unwrap_err();
        assert!(matches!(err, CoreError::JsonParse(_)));
    }

    #[test]
    fn test_missing_binary_surfaces_start_error() {
        let config = CoreConfig {
            ffprobe_bin: "definitely-not-ffprobe-vh".to_string(),
            ..CoreConfig::default()
        };
        let err = CrateFfprobeExecutor::new()
            .probe(Path::new("whatever.mp4"), &config)
            .unwrap_err();
        assert!(matches!(err, CoreError::CommandStart { .. }));
    }
}
