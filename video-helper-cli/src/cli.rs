// video-helper-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use video_helper_core::config::{DEFAULT_DUMP_FPS, DEFAULT_FFMPEG_BIN, DEFAULT_FFPROBE_BIN};
use video_helper_core::{CoreConfig, RangeRequest, TranscodeRequest};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "video-helper: probe, convert and extract frames from videos",
    long_about = "Wraps ffmpeg/ffprobe to probe, validate and convert videos, extract frame \
                  ranges and convert SRT subtitles to WebVTT."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors, and silence ffmpeg diagnostics
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Kill any ffmpeg/ffprobe process running longer than this
    #[arg(long, global = true, value_name = "SECONDS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Directory for temporary working files (defaults to the system temp dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, global = true, value_name = "PATH", env = "VIDEO_HELPER_FFMPEG", default_value = DEFAULT_FFMPEG_BIN)]
    pub ffmpeg: String,

    /// ffprobe executable
    #[arg(long, global = true, value_name = "PATH", env = "VIDEO_HELPER_FFPROBE", default_value = DEFAULT_FFPROBE_BIN)]
    pub ffprobe: String,
}

impl Cli {
    /// Library configuration described by the global flags.
    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            ffmpeg_bin: self.ffmpeg.clone(),
            ffprobe_bin: self.ffprobe.clone(),
            ..CoreConfig::default()
        }
        .with_quiet(self.quiet)
        .with_timeout(self.timeout)
        .with_temp_dir(self.temp_dir.clone())
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("timeout must be a positive number of seconds".to_string());
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints the width, height, duration, frame rate and audio presence of a video
    Probe(ProbeArgs),
    /// Checks that a file exists and probes as a video (non-zero exit otherwise)
    Validate(ValidateArgs),
    /// Converts a video, optionally changing frame rate, size or dropping audio
    Convert(ConvertArgs),
    /// Extracts a frame range as PNG images or re-assembles it into a video
    Extract(ExtractArgs),
    /// Converts SRT subtitles to WebVTT plus a cue color stylesheet
    Srt2vtt(Srt2VttArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to probe
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// File to check
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Video file to convert
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (defaults to <INPUT stem>-converted.<INPUT ext> next to the input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Target frame rate
    #[arg(long, value_name = "FPS")]
    pub frame_rate: Option<f64>,

    /// Target width (odd values are reduced by one)
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Target height (odd values are reduced by one)
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Drop the audio stream
    #[arg(long)]
    pub without_sound: bool,
}

impl ConvertArgs {
    pub fn request(&self) -> TranscodeRequest {
        TranscodeRequest::new(self.frame_rate, self.width, self.height, self.without_sound)
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("destination").required(true).args(["frames_dir", "video"])))]
pub struct ExtractArgs {
    /// Video file to read frames from
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the selected frames as PNG images into this directory
    #[arg(long, value_name = "DIR")]
    pub frames_dir: Option<PathBuf>,

    /// Assemble the selected frames into this video
    #[arg(long, value_name = "OUTPUT")]
    pub video: Option<PathBuf>,

    /// Frame rate of the assembled video
    #[arg(long, value_name = "FPS", default_value_t = DEFAULT_DUMP_FPS)]
    pub fps: u32,

    /// First frame index of the window
    #[arg(long, value_name = "INDEX", allow_negative_numbers = true)]
    pub start_index: Option<i64>,

    /// Last frame index of the window (inclusive)
    #[arg(long, value_name = "INDEX", allow_negative_numbers = true)]
    pub end_index: Option<i64>,

    /// Window start in seconds (overrides --start-index)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub start_instant: Option<f64>,

    /// Window end in seconds (overrides --end-index)
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub end_instant: Option<f64>,

    /// Keep every Nth frame, counted from the window start
    #[arg(long, value_name = "N", default_value_t = 1, allow_negative_numbers = true)]
    pub frame_step: i64,

    /// Keep one frame per interval in seconds (overrides --frame-step)
    #[arg(long, value_name = "SECONDS")]
    pub frame_interval: Option<f64>,

    /// Stabilize the video while decoding
    #[arg(long)]
    pub stabilize: bool,
}

impl ExtractArgs {
    pub fn range_request(&self) -> RangeRequest {
        RangeRequest::new()
            .with_indices(self.start_index, self.end_index)
            .with_instants(self.start_instant, self.end_instant)
            .with_frame_step(self.frame_step)
            .with_frame_interval(self.frame_interval)
    }
}

#[derive(Args, Debug)]
pub struct Srt2VttArgs {
    /// SRT subtitle file
    #[arg(value_name = "SRT")]
    pub srt: PathBuf,

    /// WebVTT output (defaults to <SRT stem>.vtt)
    #[arg(long, value_name = "PATH")]
    pub vtt: Option<PathBuf>,

    /// Stylesheet output (defaults to <SRT stem>.css)
    #[arg(long, value_name = "PATH")]
    pub css: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_flags_build_range_request() {
        let cli = Cli::parse_from([
            "video-helper",
            "extract",
            "in.mp4",
            "--video",
            "out.mp4",
            "--start-instant",
            "5",
            "--end-instant",
            "10",
            "--frame-step",
            "5",
            "--stabilize",
        ]);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        let request = args.range_request();
        assert_eq!(request.start_instant, Some(5.0));
        assert_eq!(request.end_instant, Some(10.0));
        assert_eq!(request.frame_step, 5);
        assert!(args.stabilize);
        assert_eq!(args.fps, DEFAULT_DUMP_FPS);
    }

    #[test]
    fn test_global_flags_reach_config() {
        let cli = Cli::parse_from(["video-helper", "--timeout", "2.5", "-q", "probe", "in.mp4"]);
        let config = cli.core_config();
        assert!(config.quiet);
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_timeout_must_be_positive() {
        assert!(Cli::try_parse_from(["video-helper", "--timeout", "0", "probe", "in.mp4"]).is_err());
        assert!(Cli::try_parse_from(["video-helper", "--timeout", "soon", "probe", "in.mp4"]).is_err());
    }
}
