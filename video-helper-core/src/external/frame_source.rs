// ============================================================================
// video-helper-core/src/external/frame_source.rs
// ============================================================================
//
// FRAME SOURCE: Live Decoded Frame Stream from an External Decoder
//
// A frame source is opened on a media file, hands out decoded RGB frames one
// blocking `read()` at a time, and is released with `stop()`. The concrete
// source runs ffmpeg with a `rawvideo`/`rgb24` pipe on stdout and reads it
// through ffmpeg-sidecar's event iterator.
//
// LIFECYCLE:
// - open: spawn the decoder (stabilization is passed through as a filter)
//   and a thread forwarding its events over a bounded channel
// - read: next frame, or `None` at end-of-stream; with a time limit the
//   channel is polled with `recv_timeout` and a decoder that misses the
//   deadline is killed
// - stop: kill and reap the decoder; idempotent, safe after any error
// Dropping a source stops it.

use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, sync_channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain};
use crate::frames::Frame;

/// Filter applied by the decoder when stabilization is requested.
pub const STABILIZE_FILTER: &str = "deshake";

const TOOL: &str = "ffmpeg (frame source)";

/// Decoded frames buffered between the decoder and the reader.
const EVENT_BUFFER: usize = 4;

/// A live stream of decoded frames.
pub trait FrameSource {
    /// Blocks until the next frame is decoded. `Ok(None)` marks end-of-stream.
    ///
    /// With a `timeout`, a source that cannot produce the next frame in time
    /// stops itself and returns `Timeout`.
    fn read(&mut self, timeout: Option<Duration>) -> CoreResult<Option<Frame>>;

    /// Releases the underlying decoder. Calling it more than once is a no-op.
    fn stop(&mut self);
}

/// Opens frame sources on media files.
pub trait FrameSourceOpener {
    type Source: FrameSource;

    fn open(&self, path: &Path, stabilize: bool, config: &CoreConfig) -> CoreResult<Self::Source>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Opens `SidecarFrameSource`s.
#[derive(Debug, Clone, Default)]
pub struct SidecarFrameSourceOpener;

impl FrameSourceOpener for SidecarFrameSourceOpener {
    type Source = SidecarFrameSource;

    fn open(&self, path: &Path, stabilize: bool, config: &CoreConfig) -> CoreResult<Self::Source> {
        let mut cmd = FfmpegCommandBuilder::new(config).build();
        cmd.input(&*path.to_string_lossy());

        let filters = VideoFilterChain::new()
            .add_optional(stabilize.then(|| STABILIZE_FILTER.to_string()))
            .build();
        if let Some(filters) = filters {
            cmd.args(["-vf", filters.as_str()]);
        }
        cmd.rawvideo();

        log::debug!("Opening frame source: {cmd:?}");

        let mut child = cmd.spawn().map_err(|e| command_start_error(TOOL, e))?;
        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::ExternalTool {
                    tool: TOOL.to_string(),
                    message: format!("failed to read process events: {e}"),
                });
            }
        };

        let (sender, receiver) = sync_channel(EVENT_BUFFER);
        let forwarder = thread::Builder::new()
            .name("frame-source-events".to_string())
            .spawn(move || {
                for event in events {
                    if sender.send(event).is_err() {
                        break;
                    }
                }
            });
        let forwarder = match forwarder {
            Ok(handle) => handle,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(command_start_error(TOOL, e));
            }
        };

        Ok(SidecarFrameSource {
            child: Some(child),
            events: Some(receiver),
            forwarder: Some(forwarder),
            errors: Vec::new(),
            quiet: config.quiet,
        })
    }
}

/// Frame source backed by an ffmpeg child writing `rgb24` frames to stdout.
pub struct SidecarFrameSource {
    child: Option<FfmpegChild>,
    events: Option<Receiver<FfmpegEvent>>,
    forwarder: Option<JoinHandle<()>>,
    errors: Vec<String>,
    quiet: bool,
}

impl SidecarFrameSource {
    /// Waits for the next event, `None` once the decoder's output is closed.
    fn next_event(&mut self, deadline: Option<Instant>, timeout: Option<Duration>) -> CoreResult<Option<FfmpegEvent>> {
        let Some(events) = self.events.as_ref() else {
            return Ok(None);
        };
        let Some(deadline) = deadline else {
            return Ok(events.recv().ok());
        };

        match events.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
            Err(RecvTimeoutError::Timeout) => {
                let seconds = timeout.unwrap_or_default().as_secs_f64();
                log::error!("{TOOL} produced no frame within {seconds:.1}s, stopping it");
                self.stop();
                Err(CoreError::Timeout {
                    tool: TOOL.to_string(),
                    seconds,
                })
            }
        }
    }

    /// Reaps the finished decoder and reports a failing exit.
    fn finish(&mut self) -> CoreResult<()> {
        self.events = None;
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| command_wait_error(TOOL, e))?;
        if status.success() {
            Ok(())
        } else {
            Err(command_failed_error(TOOL, status, self.errors.join("\n")))
        }
    }
}

impl FrameSource for SidecarFrameSource {
    fn read(&mut self, timeout: Option<Duration>) -> CoreResult<Option<Frame>> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.events.is_none() {
                return Ok(None);
            }

            match self.next_event(deadline, timeout)? {
                Some(FfmpegEvent::OutputFrame(frame)) => {
                    let (width, height) = (frame.width, frame.height);
                    return Frame::from_raw(width, height, frame.data)
                        .map(Some)
                        .ok_or_else(|| CoreError::ExternalTool {
                            tool: TOOL.to_string(),
                            message: format!(
                                "frame {} does not hold {width}x{height} rgb24 pixels",
                                frame.frame_num
                            ),
                        });
                }
                Some(FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg))
                | Some(FfmpegEvent::Error(msg)) => {
                    log::debug!("{TOOL}: {msg}");
                    self.errors.push(msg);
                }
                Some(FfmpegEvent::Log(_, msg)) if self.quiet => {
                    log::trace!("{TOOL}: {msg}");
                }
                Some(FfmpegEvent::Log(_, msg)) => log::debug!("{TOOL}: {msg}"),
                Some(_) => {}
                None => {
                    self.finish()?;
                    return Ok(None);
                }
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            log::debug!("Stopping frame source");
            let _ = child.kill();
            let _ = child.wait();
        }
        // The forwarder exits on its own once the killed decoder's output
        // closes or its next send hits the dropped channel
        self.events = None;
        self.forwarder = None;
    }
}

impl Drop for SidecarFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}
