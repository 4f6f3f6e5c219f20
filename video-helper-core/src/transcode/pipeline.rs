// ============================================================================
// video-helper-core/src/transcode/pipeline.rs
// ============================================================================
//
// TRANSCODE PIPELINE: Conversion State Machine
//
// A conversion walks a fixed sequence of states:
//
//   ValidateInput ──pure copy──> ShortCircuit ─────────────────┐
//        │                                                     v
//        └──> NormalizeContainer ──> FilterEncode ──> RestoreContainer ──> Verify ──> Done
//
// Each state is handled by `ConversionPipeline::advance`, which performs the
// stage's work and returns the next state. Working files live in a scoped
// temporary directory owned by the pipeline, so they are removed on every
// exit path. The result is written to a partial file next to the output,
// verified there, and renamed onto the output path only once verification
// passed. A failed verification removes the partial file and leaves whatever
// was at the output path untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, FfprobeExecutor, run_ffmpeg, stream_copy_command};
use crate::media::{VideoDescriptor, probe_video};
use crate::temp_files::{create_temp_dir, create_temp_file_path};
use crate::transcode::filter::encode_args;
use crate::transcode::request::TranscodeRequest;
use crate::transcode::verify::{verify_output, verify_unchanged};
use crate::utils::{has_extension, sibling_path};

/// States of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    /// Probe the input
    ValidateInput,
    /// Remultiplex the input straight to the output
    ShortCircuit,
    /// Bring the input into the working container
    NormalizeContainer,
    /// Apply frame rate, scaling and audio removal to the working file
    FilterEncode { working: PathBuf },
    /// Move the encoded file into the output's container as a partial file
    RestoreContainer { encoded: PathBuf },
    /// Probe the partial file, compare it with the request and place it
    Verify { partial: PathBuf },
    /// Terminal state carrying the verified output
    Done(PathBuf),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidateInput => "validate input",
            Self::ShortCircuit => "short circuit",
            Self::NormalizeContainer => "normalize container",
            Self::FilterEncode { .. } => "filter/encode",
            Self::RestoreContainer { .. } => "restore container",
            Self::Verify { .. } => "verify",
            Self::Done(_) => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// State that follows a successful input validation.
pub fn after_validation(request: &TranscodeRequest) -> PipelineState {
    if request.is_pure_copy() {
        PipelineState::ShortCircuit
    } else {
        PipelineState::NormalizeContainer
    }
}

/// One conversion in flight.
pub struct ConversionPipeline<'a, E: FfprobeExecutor, S: FfmpegSpawner> {
    executor: &'a E,
    spawner: &'a S,
    config: &'a CoreConfig,
    input: PathBuf,
    output: PathBuf,
    request: TranscodeRequest,
    input_descriptor: Option<VideoDescriptor>,
    work_dir: Option<TempDir>,
}

impl<'a, E: FfprobeExecutor, S: FfmpegSpawner> ConversionPipeline<'a, E, S> {
    pub fn new(
        executor: &'a E,
        spawner: &'a S,
        config: &'a CoreConfig,
        input: &Path,
        output: &Path,
        request: TranscodeRequest,
    ) -> Self {
        Self {
            executor,
            spawner,
            config,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            request,
            input_descriptor: None,
            work_dir: None,
        }
    }

    /// Drives the pipeline from `ValidateInput` to `Done`.
    pub fn run(mut self) -> CoreResult<PathBuf> {
        let mut state = PipelineState::ValidateInput;
        loop {
            if let PipelineState::Done(path) = state {
                return Ok(path);
            }
            log::info!("Conversion stage: {}", state.name());
            state = self.advance(state)?;
        }
    }

    /// Performs the work of `state` and returns the state that follows it.
    pub fn advance(&mut self, state: PipelineState) -> CoreResult<PipelineState> {
        match state {
            PipelineState::ValidateInput => {
                self.input_descriptor = Some(probe_video(self.executor, &self.input, self.config)?);
                Ok(after_validation(&self.request))
            }
            PipelineState::ShortCircuit => {
                let partial = write_partial(self.spawner, self.config, &self.input, &self.output, true)?;
                Ok(PipelineState::Verify { partial })
            }
            PipelineState::NormalizeContainer => {
                let working = self.working_file("normalized")?;
                if has_extension(&self.input, self.config.working_extension()) {
                    log::debug!("Input already in working container, copying");
                    fs::copy(&self.input, &working)?;
                } else {
                    let cmd = stream_copy_command(self.config, &self.input, &working);
                    run_ffmpeg(self.spawner, cmd, "normalize container", self.config)?;
                }
                Ok(PipelineState::FilterEncode { working })
            }
            PipelineState::FilterEncode { working } => {
                let encoded = self.working_file("encoded")?;
                let mut cmd = FfmpegCommandBuilder::new(self.config).build();
                cmd.input(&*working.to_string_lossy());
                cmd.args(encode_args(&self.request));
                cmd.output(&*encoded.to_string_lossy());
                run_ffmpeg(self.spawner, cmd, "filter/encode", self.config)?;
                Ok(PipelineState::RestoreContainer { encoded })
            }
            PipelineState::RestoreContainer { encoded } => {
                let stream_copy = !has_extension(&self.output, self.config.working_extension());
                let partial = write_partial(self.spawner, self.config, &encoded, &self.output, stream_copy)?;
                Ok(PipelineState::Verify { partial })
            }
            PipelineState::Verify { partial } => {
                let placed = self.verify(&partial).and_then(|()| place(&partial, &self.output));
                if let Err(e) = placed {
                    discard(&partial);
                    return Err(e);
                }
                log::info!("Video converted successfully: {}", self.output.display());
                Ok(PipelineState::Done(self.output.clone()))
            }
            PipelineState::Done(path) => Ok(PipelineState::Done(path)),
        }
    }

    /// Probes `partial` and checks it against the request, and against the
    /// input for a pure copy. Errors name the output path.
    fn verify(&self, partial: &Path) -> CoreResult<()> {
        let descriptor = probe_video(self.executor, partial, self.config)?;
        verify_output(&self.output, &descriptor, &self.request)?;
        if self.request.is_pure_copy() {
            if let Some(input) = &self.input_descriptor {
                verify_unchanged(&self.output, input, &descriptor)?;
            }
        }
        Ok(())
    }

    fn working_file(&mut self, name: &str) -> CoreResult<PathBuf> {
        if self.work_dir.is_none() {
            self.work_dir = Some(create_temp_dir(self.config, "video_helper_convert_")?);
        }
        let dir = self
            .work_dir
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| CoreError::Config("working directory unavailable".to_string()))?;
        Ok(dir.join(format!("{name}.{}", self.config.working_extension())))
    }
}

/// Converts `input` according to `request`.
///
/// The output defaults to `<folder>/<stem>-converted.<ext>` next to the input.
/// Returns the path of the verified output.
///
/// # Errors
///
/// `NotFound`/`InvalidMedia` for a bad input, the external tool's error for a
/// failed stage, `ConversionVerification` when the output does not match the
/// request, or `Timeout`.
pub fn convert<E: FfprobeExecutor, S: FfmpegSpawner>(
    executor: &E,
    spawner: &S,
    input: &Path,
    output: Option<&Path>,
    request: &TranscodeRequest,
    config: &CoreConfig,
) -> CoreResult<PathBuf> {
    request.validate()?;
    let output = match output {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => sibling_path(input, "-converted", None),
    };
    log::info!("Converting {} into {}", input.display(), output.display());

    ConversionPipeline::new(executor, spawner, config, input, &output, request.clone()).run()
}

/// Writes `source` to a partial file next to `output`, remultiplexing it
/// when `stream_copy` is set and copying it otherwise. Returns the partial
/// file, which keeps the output's extension so muxers and probes see the
/// right container.
pub(crate) fn write_partial<S: FfmpegSpawner>(
    spawner: &S,
    config: &CoreConfig,
    source: &Path,
    output: &Path,
    stream_copy: bool,
) -> CoreResult<PathBuf> {
    let output_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&output_dir)?;

    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.working_extension().to_string());
    let partial = create_temp_file_path(&output_dir, ".video_helper_partial", &ext);

    let written = if stream_copy {
        let cmd = stream_copy_command(config, source, &partial);
        run_ffmpeg(spawner, cmd, "restore container", config)
    } else {
        fs::copy(source, &partial).map(|_| ()).map_err(CoreError::from)
    };
    match written {
        Ok(()) => Ok(partial),
        Err(e) => {
            discard(&partial);
            Err(e)
        }
    }
}

/// Renames a complete partial file onto `output`.
fn place(partial: &Path, output: &Path) -> CoreResult<()> {
    fs::rename(partial, output)?;
    log::debug!("Placed {} at {}", partial.display(), output.display());
    Ok(())
}

/// Places `source` at `output` through a partial file.
pub(crate) fn promote<S: FfmpegSpawner>(
    spawner: &S,
    config: &CoreConfig,
    source: &Path,
    output: &Path,
    stream_copy: bool,
) -> CoreResult<()> {
    let partial = write_partial(spawner, config, source, output, stream_copy)?;
    place(&partial, output).inspect_err(|_| discard(&partial))
}

fn discard(partial: &Path) {
    if partial.exists() {
        if let Err(e) = fs::remove_file(partial) {
            log::warn!("Failed to remove partial output {}: {e}", partial.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_validation_branches() {
        assert_eq!(
            after_validation(&TranscodeRequest::default()),
            PipelineState::ShortCircuit
        );
        assert_eq!(
            after_validation(&TranscodeRequest::default().with_frame_rate(24.0)),
            PipelineState::NormalizeContainer
        );
    }

    #[test]
    fn test_state_names_and_terminal() {
        let verify = PipelineState::Verify {
            partial: PathBuf::from(".video_helper_partial_abc.mp4"),
        };
        assert_eq!(verify.name(), "verify");
        assert!(!verify.is_terminal());
        assert!(PipelineState::Done(PathBuf::from("out.mp4")).is_terminal());
    }
}
