//! Canonical description of a video file.

use serde::Serialize;

/// Snapshot of a media file's properties at probe time.
///
/// A descriptor is created fresh by every probe and never mutated. The frame
/// count is derived on demand so it can never drift from duration and rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoDescriptor {
    pub width: u32,
    pub height: u32,
    /// Seconds
    pub duration: f64,
    /// Frames per second
    pub frame_rate: f64,
    pub has_sound: bool,
}

impl VideoDescriptor {
    /// `floor(duration * frame_rate)`.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        (self.duration * self.frame_rate).floor() as u64
    }
}

/// Parses a rational frame rate such as `"30000/1001"`, or a bare number.
///
/// Returns `None` for malformed text, a zero denominator, or a rate that is
/// not a positive finite number.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.parse().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.001);
    }

    #[test]
    fn test_parse_frame_rate_rejects_malformed() {
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("30/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
        assert_eq!(parse_frame_rate("30/x"), None);
        assert_eq!(parse_frame_rate(""), None);
        assert_eq!(parse_frame_rate("-30/1"), None);
    }

    #[test]
    fn test_total_frames_floors() {
        let descriptor = VideoDescriptor {
            width: 640,
            height: 360,
            duration: 10.0,
            frame_rate: 30.0,
            has_sound: false,
        };
        assert_eq!(descriptor.total_frames(), 300);

        let descriptor = VideoDescriptor {
            duration: 1.0,
            frame_rate: 30000.0 / 1001.0,
            ..descriptor
        };
        assert_eq!(descriptor.total_frames(), 29);
    }
}
