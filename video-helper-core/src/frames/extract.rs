//! Lazy, pull-based frame extraction over a resolved range.
//!
//! [`FrameStream`] implements [`Iterator`] and reads the frame source on
//! demand: each call to [`next()`](Iterator::next) blocks on the source until
//! the next selected frame is decoded. Nothing is buffered.
//!
//! The source is released exactly once, whichever comes first: the window is
//! exhausted, the source reaches end-of-stream, an error is yielded, or the
//! stream is dropped. After an error the stream is fused.
//!
//! An optional time budget bounds the total time spent blocked on the source.
//! Each read is handed what is left of it, so a stalled decoder is stopped
//! and reported as `Timeout` instead of blocking the caller.
//!
//! Sampling phase is relative to the window start: with `start_index = 10`
//! and `step = 4` the frames 10, 14, 18, ... are yielded.

use std::iter::FusedIterator;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, FrameSource, FrameSourceOpener};
use crate::frames::Frame;
use crate::frames::range::{FrameRange, RangeRequest, resolve};
use crate::media::probe_video;

/// What to do with the decoded frame at a given counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Before the window or between samples
    Skip,
    /// Inside the window on a sampling boundary
    Yield,
    /// Past the window
    Done,
}

/// The pure selection rule applied to the running frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSelector {
    range: FrameRange,
}

impl FrameSelector {
    pub fn new(range: FrameRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    pub fn select(&self, counter: u64) -> Selection {
        let FrameRange {
            start_index,
            end_index,
            step,
        } = self.range;

        if counter > end_index {
            Selection::Done
        } else if counter < start_index {
            Selection::Skip
        } else if (counter - start_index) % step.max(1) == 0 {
            Selection::Yield
        } else {
            Selection::Skip
        }
    }
}

/// Lazy sequence of the frames selected from one frame source.
pub struct FrameStream<S: FrameSource> {
    source: Option<S>,
    selector: FrameSelector,
    counter: u64,
    /// Time spent blocked on the source, checked against `budget`
    decode_time: Duration,
    budget: Option<Duration>,
}

impl<S: FrameSource> FrameStream<S> {
    /// Wraps an already opened source. `budget` bounds the total time spent
    /// waiting on the source.
    pub fn new(source: S, range: FrameRange, budget: Option<Duration>) -> Self {
        Self {
            source: Some(source),
            selector: FrameSelector::new(range),
            counter: 0,
            decode_time: Duration::ZERO,
            budget,
        }
    }

    pub fn range(&self) -> FrameRange {
        self.selector.range()
    }

    /// Number of frames decoded so far, selected or not.
    pub fn frames_decoded(&self) -> u64 {
        self.counter
    }

    /// True once the source has been released.
    pub fn is_finished(&self) -> bool {
        self.source.is_none()
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            log::debug!("Releasing frame source after {} decoded frames", self.counter);
            source.stop();
        }
    }

    fn fail(&mut self, error: CoreError) -> Option<CoreResult<Frame>> {
        self.release();
        Some(Err(error))
    }

    fn timeout_error(budget: Duration) -> CoreError {
        log::error!("Frame source exceeded its {:.1}s budget", budget.as_secs_f64());
        CoreError::Timeout {
            tool: "ffmpeg (frame source)".to_string(),
            seconds: budget.as_secs_f64(),
        }
    }
}

impl<S: FrameSource> Iterator for FrameStream<S> {
    type Item = CoreResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.source.is_none() {
                return None;
            }

            if self.selector.select(self.counter) == Selection::Done {
                self.release();
                return None;
            }

            let remaining = match self.budget {
                Some(budget) if self.decode_time >= budget => {
                    return self.fail(Self::timeout_error(budget));
                }
                Some(budget) => Some(budget - self.decode_time),
                None => None,
            };

            let source = self.source.as_mut()?;
            let started = Instant::now();
            let read = source.read(remaining);
            self.decode_time += started.elapsed();

            let frame = match (read, self.budget) {
                (Ok(Some(frame)), _) => frame,
                (Ok(None), _) => {
                    self.release();
                    return None;
                }
                (Err(CoreError::Timeout { .. }), Some(budget)) => {
                    return self.fail(Self::timeout_error(budget));
                }
                (Err(e), _) => return self.fail(e),
            };

            let index = self.counter;
            self.counter += 1;

            if self.selector.select(index) == Selection::Yield {
                if index >= self.selector.range().end_index {
                    self.release();
                }
                return Some(Ok(frame));
            }
        }
    }
}

impl<S: FrameSource> FusedIterator for FrameStream<S> {}

impl<S: FrameSource> Drop for FrameStream<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens a fresh frame source on `path` and returns the lazy stream of frames
/// selected by `range`.
///
/// # Errors
///
/// `NotFound` when the path does not exist, or the opener's error.
pub fn extract_frames<O: FrameSourceOpener>(
    opener: &O,
    path: &Path,
    range: FrameRange,
    stabilize: bool,
    config: &CoreConfig,
) -> CoreResult<FrameStream<O::Source>> {
    if !path.exists() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }

    log::info!(
        "Extracting frames {}..={} every {} from {}{}",
        range.start_index,
        range.end_index,
        range.step,
        path.display(),
        if stabilize { " (stabilized)" } else { "" }
    );

    let source = opener.open(path, stabilize, config)?;
    Ok(FrameStream::new(source, range, config.timeout))
}

/// Probes `path`, resolves `request` against it and extracts the frames.
pub fn extract_frames_from<E: FfprobeExecutor, O: FrameSourceOpener>(
    executor: &E,
    opener: &O,
    path: &Path,
    request: &RangeRequest,
    stabilize: bool,
    config: &CoreConfig,
) -> CoreResult<FrameStream<O::Source>> {
    let descriptor = probe_video(executor, path, config)?;
    let range = resolve(&descriptor, request)?;
    extract_frames(opener, path, range, stabilize, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFrameSourceOpener, mock_frame_color};

    fn range(start_index: u64, end_index: u64, step: u64) -> FrameRange {
        FrameRange {
            start_index,
            end_index,
            step,
        }
    }

    fn stream(opener: &MockFrameSourceOpener, range: FrameRange) -> FrameStream<crate::external::mocks::MockFrameSource> {
        let source = opener
            .open(Path::new("clip.mp4"), false, &CoreConfig::default())
            .unwrap();
        FrameStream::new(source, range, None)
    }

    fn colors(frames: Vec<CoreResult<Frame>>) -> Vec<[u8; 3]> {
        frames.into_iter().map(|f| f.unwrap().pixel(0, 0)).collect()
    }

    #[test]
    fn test_selector_anchors_phase_at_start() {
        let selector = FrameSelector::new(range(10, 20, 4));
        assert_eq!(selector.select(9), Selection::Skip);
        assert_eq!(selector.select(10), Selection::Yield);
        assert_eq!(selector.select(12), Selection::Skip);
        assert_eq!(selector.select(14), Selection::Yield);
        assert_eq!(selector.select(18), Selection::Yield);
        assert_eq!(selector.select(20), Selection::Skip);
        assert_eq!(selector.select(21), Selection::Done);
    }

    #[test]
    fn test_stream_yields_sampled_window() {
        let opener = MockFrameSourceOpener::new(100, 4, 2);
        let frames: Vec<_> = stream(&opener, range(10, 20, 5)).collect();
        assert_eq!(
            colors(frames),
            vec![mock_frame_color(10), mock_frame_color(15), mock_frame_color(20)]
        );
        assert_eq!(opener.stats.stopped.get(), 1);
        // Stops right after the last frame of the window
        assert_eq!(opener.stats.reads.get(), 21);
    }

    #[test]
    fn test_single_frame_window_yields_first_frame() {
        let opener = MockFrameSourceOpener::new(100, 4, 2);
        let frames: Vec<_> = stream(&opener, range(0, 0, 1)).collect();
        assert_eq!(colors(frames), vec![mock_frame_color(0)]);
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_short_source_ends_early() {
        let opener = MockFrameSourceOpener::new(12, 4, 2);
        let frames: Vec<_> = stream(&opener, range(5, 300, 3)).collect();
        assert_eq!(
            colors(frames),
            vec![mock_frame_color(5), mock_frame_color(8), mock_frame_color(11)]
        );
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_empty_source_is_empty_sequence() {
        let opener = MockFrameSourceOpener::new(0, 4, 2);
        let mut frames = stream(&opener, range(0, 10, 1));
        assert!(frames.next().is_none());
        assert!(frames.is_finished());
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_abandoned_stream_releases_source() {
        let opener = MockFrameSourceOpener::new(100, 4, 2);
        {
            let mut frames = stream(&opener, range(0, 99, 1));
            assert!(frames.next().is_some());
            assert!(frames.next().is_some());
            assert_eq!(opener.stats.stopped.get(), 0);
        }
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_error_releases_and_fuses() {
        let opener = MockFrameSourceOpener::new(100, 4, 2).failing_at(3);
        let mut frames = stream(&opener, range(0, 99, 1));
        for _ in 0..3 {
            assert!(frames.next().unwrap().is_ok());
        }
        assert!(frames.next().unwrap().is_err());
        assert!(frames.next().is_none());
        assert_eq!(opener.stats.stopped.get(), 1);
        drop(frames);
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_stalled_source_times_out_without_waiting_for_it() {
        let opener = MockFrameSourceOpener::new(100, 4, 2).with_read_delay(Duration::from_secs(2));
        let source = opener
            .open(Path::new("clip.mp4"), false, &CoreConfig::default())
            .unwrap();
        let mut frames = FrameStream::new(source, range(0, 99, 1), Some(Duration::from_millis(100)));

        let started = Instant::now();
        let err = frames.next().unwrap().unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
        match err {
            CoreError::Timeout { seconds, .. } => assert!((seconds - 0.1).abs() < 1e-9),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(frames.next().is_none());
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_budget_covers_all_reads() {
        let opener = MockFrameSourceOpener::new(100, 4, 2).with_read_delay(Duration::from_millis(30));
        let source = opener
            .open(Path::new("clip.mp4"), false, &CoreConfig::default())
            .unwrap();
        let frames = FrameStream::new(source, range(0, 99, 1), Some(Duration::from_millis(100)));

        let results: Vec<_> = frames.collect();
        let last = results.last().unwrap();
        assert!(matches!(last, Err(CoreError::Timeout { .. })), "got {last:?}");
        let delivered = results.iter().filter(|r| r.is_ok()).count();
        assert!((1..=3).contains(&delivered), "delivered {delivered}");
        assert_eq!(opener.stats.stopped.get(), 1);
    }

    #[test]
    fn test_extract_missing_file_is_not_found() {
        let opener = MockFrameSourceOpener::new(10, 4, 2);
        let err = extract_frames(
            &opener,
            Path::new("/no/such/clip.mp4"),
            range(0, 1, 1),
            false,
            &CoreConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(opener.stats.opened.get(), 0);
    }
}
