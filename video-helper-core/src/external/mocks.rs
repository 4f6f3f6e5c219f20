// video-helper-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::*;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::frames::Frame;
use ffmpeg_sidecar::command::FfmpegCommand;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::time::Duration;

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Error lines reported back from the wait.
    pub errors: Vec<String>,
    /// Exit status to return when waited on.
    pub exit_status: ExitStatus,
    /// When set, waiting reports a timeout instead of an exit.
    pub times_out: bool,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn wait_with_timeout(
        &mut self,
        timeout: Option<Duration>,
        _quiet: bool,
    ) -> CoreResult<ProcessExit> {
        if self.times_out {
            return Err(CoreError::Timeout {
                tool: "ffmpeg".to_string(),
                seconds: timeout.map(|t| t.as_secs_f64()).unwrap_or_default(),
            });
        }
        Ok(ProcessExit {
            status: self.exit_status,
            errors: self.errors.clone(),
        })
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// A call is matched against the first pending expectation whose pattern is a
/// substring of the space-joined argument list. When no expectation matches,
/// the fallback (if any) applies, otherwise the spawn panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    fallback_success: Rc<Cell<bool>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// A spawner where every command succeeds and creates its output file.
    pub fn always_succeeding() -> Self {
        let spawner = Self::new();
        spawner.fallback_success.set(true);
        spawner
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, create_dummy_output: bool) {
        let process = MockFfmpegProcess {
            errors: Vec::new(),
            exit_status: ExitStatus::from_raw(0),
            times_out: false,
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// The process exits with `exit_code` (raw wait status, shifted like a real exit).
    pub fn add_exit_error_expectation(&self, arg_pattern: &str, errors: Vec<String>, exit_code: i32) {
        let process = MockFfmpegProcess {
            errors,
            exit_status: ExitStatus::from_raw(exit_code << 8),
            times_out: false,
        };
        self.add_expectation(arg_pattern, Ok(process), true);
    }

    pub fn add_timeout_expectation(&self, arg_pattern: &str) {
        let process = MockFfmpegProcess {
            errors: Vec::new(),
            exit_status: ExitStatus::from_raw(9),
            times_out: true,
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    fn create_dummy_output(args: &[String]) {
        let Some(output_path_str) = args.last() else {
            log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
            return;
        };
        let output_path = PathBuf::from(output_path_str);
        if let Some(parent) = output_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("MockFfmpegSpawner failed to create parent dir {:?}: {}", parent, e);
            }
        }
        match std::fs::write(&output_path, b"mock media") {
            Ok(()) => log::info!("MockFfmpegSpawner created dummy output file: {:?}", output_path),
            Err(e) => log::error!("MockFfmpegSpawner failed to create dummy output file {:?}: {}", output_path, e),
        }
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd.get_args().map(|s| s.to_string_lossy().into_owned()).collect();
        self.received_calls.borrow_mut().push(args.clone());
        let joined = args.join(" ");

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| joined.contains(&exp.arg_pattern));

        if let Some(index) = found_index {
            let expectation = expectations.remove(index);
            log::info!("MockFfmpegSpawner: Matched expectation with pattern '{}'", expectation.arg_pattern);
            if expectation.create_dummy_output && expectation.result.is_ok() {
                Self::create_dummy_output(&args);
            }
            expectation.result
        } else if self.fallback_success.get() {
            Self::create_dummy_output(&args);
            Ok(MockFfmpegProcess {
                errors: Vec::new(),
                exit_status: ExitStatus::from_raw(0),
                times_out: false,
            })
        } else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        }
    }
}

/// Mock implementation of FfprobeExecutor keyed by input path.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    reports: Rc<RefCell<HashMap<PathBuf, ProbeReport>>>,
    failures: Rc<RefCell<HashMap<PathBuf, String>>>,
    fallback: Rc<RefCell<Option<ProbeReport>>>,
    probed: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the raw report returned for `path`.
    pub fn expect_report(&self, path: &Path, report: ProbeReport) {
        self.reports.borrow_mut().insert(path.to_path_buf(), report);
    }

    /// Registers a plain video (plus an audio stream when `has_sound`).
    pub fn expect_video(
        &self,
        path: &Path,
        width: i64,
        height: i64,
        duration: f64,
        r_frame_rate: &str,
        has_sound: bool,
    ) {
        self.expect_report(path, video_report(width, height, duration, r_frame_rate, has_sound));
    }

    /// Makes probing `path` fail as if ffprobe exited with an error.
    pub fn expect_failure(&self, path: &Path, message: &str) {
        self.failures
            .borrow_mut()
            .insert(path.to_path_buf(), message.to_string());
    }

    /// Registers the report returned for every path without its own
    /// expectation, such as the randomly named partial outputs.
    pub fn expect_any_video(&self, width: i64, height: i64, duration: f64, r_frame_rate: &str, has_sound: bool) {
        *self.fallback.borrow_mut() = Some(video_report(width, height, duration, r_frame_rate, has_sound));
    }

    pub fn call_count(&self) -> usize {
        self.probed.borrow().len()
    }

    /// Paths probed so far, in call order.
    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, path: &Path, _config: &CoreConfig) -> CoreResult<ProbeReport> {
        log::info!("MockFfprobeExecutor::probe called for: {}", path.display());
        self.probed.borrow_mut().push(path.to_path_buf());

        if let Some(message) = self.failures.borrow().get(path) {
            return Err(CoreError::ExternalTool {
                tool: "ffprobe".to_string(),
                message: message.clone(),
            });
        }
        let reports = self.reports.borrow();
        let fallback = self.fallback.borrow();
        match reports.get(path).or(fallback.as_ref()) {
            Some(report) => Ok(report.clone()),
            None => {
                log::error!("MockFfprobeExecutor: No expectation set for path: {}", path.display());
                Err(CoreError::ExternalTool {
                    tool: "ffprobe".to_string(),
                    message: format!("MockFfprobeExecutor: No expectation set for path {}", path.display()),
                })
            }
        }
    }
}

/// Builds the raw report of a video with an optional audio stream.
pub fn video_report(
    width: i64,
    height: i64,
    duration: f64,
    r_frame_rate: &str,
    has_sound: bool,
) -> ProbeReport {
    let mut streams = vec![RawStream {
        codec_type: Some("video".to_string()),
        width: Some(width),
        height: Some(height),
        duration: Some(duration.to_string()),
        r_frame_rate: Some(r_frame_rate.to_string()),
    }];
    if has_sound {
        streams.push(RawStream {
            codec_type: Some("audio".to_string()),
            duration: Some(duration.to_string()),
            r_frame_rate: Some("0/0".to_string()),
            ..RawStream::default()
        });
    }
    ProbeReport {
        streams,
        format_duration: Some(duration.to_string()),
    }
}

/// Shared counters observed by tests after a mock source is gone.
#[derive(Debug, Clone, Default)]
pub struct MockSourceStats {
    pub opened: Rc<Cell<usize>>,
    pub stopped: Rc<Cell<usize>>,
    pub reads: Rc<Cell<usize>>,
    pub last_stabilize: Rc<Cell<Option<bool>>>,
}

/// Opens `MockFrameSource`s producing `frame_count` frames of one size.
///
/// Frame `i` is filled with the color `[i % 256, (i / 256) % 256, 0]`, so
/// tests can tell which source frames were yielded.
#[derive(Debug, Clone)]
pub struct MockFrameSourceOpener {
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    /// Index of the read that fails, if any.
    pub fail_at: Option<usize>,
    /// Time each read blocks before its frame is ready.
    pub read_delay: Option<Duration>,
    pub stats: MockSourceStats,
}

impl MockFrameSourceOpener {
    pub fn new(frame_count: usize, width: u32, height: u32) -> Self {
        Self {
            frame_count,
            width,
            height,
            fail_at: None,
            read_delay: None,
            stats: MockSourceStats::default(),
        }
    }

    /// Makes every read block for `delay`, like a slow or stalled decoder.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn failing_at(mut self, read_index: usize) -> Self {
        self.fail_at = Some(read_index);
        self
    }
}

impl FrameSourceOpener for MockFrameSourceOpener {
    type Source = MockFrameSource;

    fn open(&self, path: &Path, stabilize: bool, _config: &CoreConfig) -> CoreResult<Self::Source> {
        log::info!("MockFrameSourceOpener::open called for: {}", path.display());
        self.stats.opened.set(self.stats.opened.get() + 1);
        self.stats.last_stabilize.set(Some(stabilize));
        Ok(MockFrameSource {
            next_index: 0,
            opener: self.clone(),
            stopped: false,
        })
    }
}

/// Frame source handing out synthetic frames.
pub struct MockFrameSource {
    next_index: usize,
    opener: MockFrameSourceOpener,
    stopped: bool,
}

/// Color of synthetic frame `index`.
pub fn mock_frame_color(index: usize) -> [u8; 3] {
    [(index % 256) as u8, ((index / 256) % 256) as u8, 0]
}

impl FrameSource for MockFrameSource {
    fn read(&mut self, timeout: Option<Duration>) -> CoreResult<Option<Frame>> {
        let stats = &self.opener.stats;
        stats.reads.set(stats.reads.get() + 1);

        if self.stopped {
            return Ok(None);
        }
        if let Some(delay) = self.opener.read_delay {
            match timeout {
                Some(limit) if delay > limit => {
                    std::thread::sleep(limit);
                    self.stop();
                    return Err(CoreError::Timeout {
                        tool: "mock frame source".to_string(),
                        seconds: limit.as_secs_f64(),
                    });
                }
                _ => std::thread::sleep(delay),
            }
        }
        if self.opener.fail_at == Some(self.next_index) {
            return Err(CoreError::ExternalTool {
                tool: "mock frame source".to_string(),
                message: format!("decode failure at frame {}", self.next_index),
            });
        }
        if self.next_index >= self.opener.frame_count {
            return Ok(None);
        }

        let frame = Frame::filled(
            self.opener.width,
            self.opener.height,
            mock_frame_color(self.next_index),
        );
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            let stopped = &self.opener.stats.stopped;
            stopped.set(stopped.get() + 1);
        }
    }
}

impl Drop for MockFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}
