// ============================================================================
// video-helper-core/src/frames/range.rs
// ============================================================================
//
// RANGE RESOLVER: Time/Index Parameters to an Absolute Frame Window
//
// Callers describe the window they want with frame indices, instants in
// seconds, or a mix of both per bound, and a sampling step given either as a
// literal frame count or as an interval in seconds. `resolve` converts all of
// that into a validated `FrameRange` against the probed descriptor.
//
// RULES:
// - An instant takes precedence over an index for the same bound and is
//   converted with floor(instant * frame_rate)
// - The default window is [0, total] with total = floor(duration * frame_rate)
// - frame_interval wins over frame_step; a step of 0 is clamped to 1

use crate::error::{CoreError, CoreResult};
use crate::media::VideoDescriptor;
use crate::utils::format_timecode;

/// Caller-supplied window and sampling parameters, all optional.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRequest {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    /// Seconds; overrides `start_index`
    pub start_instant: Option<f64>,
    /// Seconds; overrides `end_index`
    pub end_instant: Option<f64>,
    /// Literal sampling step in frames
    pub frame_step: i64,
    /// Sampling interval in seconds; overrides `frame_step`
    pub frame_interval: Option<f64>,
}

impl Default for RangeRequest {
    fn default() -> Self {
        Self {
            start_index: None,
            end_index: None,
            start_instant: None,
            end_instant: None,
            frame_step: 1,
            frame_interval: None,
        }
    }
}

impl RangeRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indices(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start_index = start;
        self.end_index = end;
        self
    }

    #[must_use]
    pub fn with_instants(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.start_instant = start;
        self.end_instant = end;
        self
    }

    #[must_use]
    pub fn with_frame_step(mut self, step: i64) -> Self {
        self.frame_step = step;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Option<f64>) -> Self {
        self.frame_interval = interval;
        self
    }
}

/// Resolved inclusive frame window `[start_index, end_index]` with a sampling
/// step anchored at `start_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start_index: u64,
    pub end_index: u64,
    pub step: u64,
}

impl FrameRange {
    /// Number of frames the window selects when the source decodes all of them.
    #[must_use]
    pub fn expected_count(&self) -> u64 {
        (self.end_index - self.start_index) / self.step + 1
    }
}

/// Resolves `request` against `descriptor`.
///
/// # Errors
///
/// `CoreError::Range` when a value is negative or not finite, or when the
/// window does not satisfy `0 <= start <= end <= total`.
pub fn resolve(descriptor: &VideoDescriptor, request: &RangeRequest) -> CoreResult<FrameRange> {
    let fps = descriptor.frame_rate;
    let total = descriptor.total_frames() as i64;

    let start = match request.start_instant {
        Some(instant) => instant_to_index("start_instant", instant, fps)?,
        None => request.start_index.unwrap_or(0),
    };
    let end = match request.end_instant {
        Some(instant) => instant_to_index("end_instant", instant, fps)?,
        None => request.end_index.unwrap_or(total),
    };

    if start < 0 || end < 0 || start > end || end > total {
        return Err(CoreError::Range(format!(
            "start frame {start} ({}) and end frame {end} ({}) must satisfy \
             0 <= start <= end <= {total} (video lasts {} at {fps:.3} fps)",
            index_timecode(start, fps),
            index_timecode(end, fps),
            format_timecode(descriptor.duration),
        )));
    }

    let step = match request.frame_interval {
        Some(interval) => instant_to_index("frame_interval", interval, fps)?,
        None if request.frame_step < 0 => {
            return Err(CoreError::Range(format!(
                "frame_step must not be negative, got {}",
                request.frame_step
            )));
        }
        None => request.frame_step,
    };
    let step = if step == 0 {
        log::warn!(
            "Sampling step resolves to 0 frames at {fps:.3} fps, using every frame instead"
        );
        1
    } else {
        step
    };

    let range = FrameRange {
        start_index: start as u64,
        end_index: end as u64,
        step: step as u64,
    };
    log::debug!("Resolved frame range: {range:?} (total {total})");
    Ok(range)
}

fn instant_to_index(name: &str, seconds: f64, fps: f64) -> CoreResult<i64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(CoreError::Range(format!(
            "{name} must be a non-negative number of seconds, got {seconds}"
        )));
    }
    Ok((seconds * fps).floor() as i64)
}

fn index_timecode(index: i64, fps: f64) -> String {
    format_timecode(index as f64 / fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_seconds_at_30() -> VideoDescriptor {
        VideoDescriptor {
            width: 320,
            height: 240,
            duration: 10.0,
            frame_rate: 30.0,
            has_sound: false,
        }
    }

    #[test]
    fn test_default_covers_whole_video() {
        let range = resolve(&ten_seconds_at_30(), &RangeRequest::default()).unwrap();
        assert_eq!(
            range,
            FrameRange {
                start_index: 0,
                end_index: 300,
                step: 1
            }
        );
    }

    #[test]
    fn test_instants_with_step() {
        let request = RangeRequest::new()
            .with_instants(Some(5.0), Some(10.0))
            .with_frame_step(5);
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.start_index, 150);
        assert_eq!(range.end_index, 300);
        assert_eq!(range.step, 5);
        assert_eq!(range.expected_count(), 31);
    }

    #[test]
    fn test_instant_takes_precedence_over_index() {
        let request = RangeRequest::new()
            .with_indices(Some(3), Some(200))
            .with_instants(Some(1.0), None);
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.start_index, 30);
        assert_eq!(range.end_index, 200);

        let request = RangeRequest::new()
            .with_indices(Some(3), Some(20))
            .with_instants(None, Some(2.0));
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.start_index, 3);
        assert_eq!(range.end_index, 60);
    }

    #[test]
    fn test_interval_wins_over_step() {
        let request = RangeRequest::new()
            .with_frame_step(7)
            .with_frame_interval(Some(0.5));
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.step, 15);
    }

    #[test]
    fn test_fine_interval_clamps_to_one() {
        let request = RangeRequest::new().with_frame_interval(Some(0.001));
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.step, 1);

        let request = RangeRequest::new().with_frame_step(0);
        assert_eq!(resolve(&ten_seconds_at_30(), &request).unwrap().step, 1);
    }

    #[test]
    fn test_single_frame_window() {
        let request = RangeRequest::new().with_indices(Some(0), Some(0));
        let range = resolve(&ten_seconds_at_30(), &request).unwrap();
        assert_eq!(range.expected_count(), 1);
    }

    #[test]
    fn test_end_past_total_reports_indices_and_bound() {
        let request = RangeRequest::new().with_indices(Some(10), Some(301));
        let err = resolve(&ten_seconds_at_30(), &request).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, CoreError::Range(_)));
        assert!(message.contains("start frame 10"), "{message}");
        assert!(message.contains("end frame 301"), "{message}");
        assert!(message.contains("<= 300"), "{message}");
        assert!(message.contains("00:00:10.033"), "{message}");
        assert!(message.contains("00:00:10.000"), "{message}");
    }

    #[test]
    fn test_inverted_and_negative_ranges_fail() {
        let inverted = RangeRequest::new().with_indices(Some(50), Some(40));
        assert!(matches!(
            resolve(&ten_seconds_at_30(), &inverted),
            Err(CoreError::Range(_))
        ));

        let negative_index = RangeRequest::new().with_indices(Some(-1), None);
        assert!(matches!(
            resolve(&ten_seconds_at_30(), &negative_index),
            Err(CoreError::Range(_))
        ));

        let negative_instant = RangeRequest::new().with_instants(Some(-0.5), None);
        assert!(matches!(
            resolve(&ten_seconds_at_30(), &negative_instant),
            Err(CoreError::Range(_))
        ));

        let negative_step = RangeRequest::new().with_frame_step(-2);
        assert!(matches!(
            resolve(&ten_seconds_at_30(), &negative_step),
            Err(CoreError::Range(_))
        ));
    }
}
