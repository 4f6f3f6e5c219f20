// ============================================================================
// video-helper-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structure and Constants
//
// A `CoreConfig` value is passed explicitly to every entry point of the
// library (probe, extract, convert, dump). There is no process-wide verbosity
// or logging state: each call reads its settings from the config it is given.
//
// USAGE:
// Instances are created by consumers of the library (like video-helper-cli),
// optionally tuned with the `with_*` methods, and validated once before use.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Container used for the intermediate files of the transcode pipeline.
pub const DEFAULT_WORKING_CONTAINER: &str = "mp4";

/// Frame rate used by `dump_frames` when the caller does not pick one.
pub const DEFAULT_DUMP_FPS: u32 = 30;

/// Relative frame rate error tolerated by conversion verification (2%).
pub const FRAME_RATE_TOLERANCE: f64 = 0.02;

/// Default name of the ffmpeg executable.
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// Default name of the ffprobe executable.
pub const DEFAULT_FFPROBE_BIN: &str = "ffprobe";

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Settings shared by every operation of the library.
///
/// # Examples
///
/// ```rust
/// use video_helper_core::CoreConfig;
/// use std::time::Duration;
///
/// let config = CoreConfig::default()
///     .with_quiet(true)
///     .with_timeout(Some(Duration::from_secs(600)));
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// When true, ffmpeg diagnostics are relayed at trace level instead of debug
    pub quiet: bool,

    /// Upper bound on the runtime of each external process. `None` waits forever.
    pub timeout: Option<Duration>,

    /// Parent directory for temporary working files (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,

    /// Extension of the intermediate container used by the transcode pipeline
    pub working_container: String,

    /// ffmpeg executable name or path
    pub ffmpeg_bin: String,

    /// ffprobe executable name or path
    pub ffprobe_bin: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            quiet: false,
            timeout: None,
            temp_dir: None,
            working_container: DEFAULT_WORKING_CONTAINER.to_string(),
            ffmpeg_bin: DEFAULT_FFMPEG_BIN.to_string(),
            ffprobe_bin: DEFAULT_FFPROBE_BIN.to_string(),
        }
    }
}

impl CoreConfig {
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    #[must_use]
    pub fn with_working_container(mut self, container: impl Into<String>) -> Self {
        self.working_container = container.into();
        self
    }

    /// Checks the configuration for values no operation could work with.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(CoreError::Config("timeout must be greater than zero".to_string()));
            }
        }

        let container = self.working_container.trim_start_matches('.');
        if container.is_empty() || !container.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::Config(format!(
                "working container must be a plain file extension, got '{}'",
                self.working_container
            )));
        }

        if self.ffmpeg_bin.trim().is_empty() || self.ffprobe_bin.trim().is_empty() {
            return Err(CoreError::Config(
                "ffmpeg and ffprobe executables must be named".to_string(),
            ));
        }

        if let Some(dir) = &self.temp_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "temporary directory {} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Working container extension without a leading dot.
    pub fn working_extension(&self) -> &str {
        self.working_container.trim_start_matches('.')
    }
}
