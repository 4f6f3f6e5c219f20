//! Post-conversion checks of the output descriptor against the request.

use std::path::Path;

use crate::config::FRAME_RATE_TOLERANCE;
use crate::error::{CoreError, CoreResult};
use crate::media::VideoDescriptor;
use crate::transcode::request::TranscodeRequest;

/// Checks `actual` (the probed output) against `request`.
///
/// Frame rate must be within 2% relative error, dimensions must match
/// exactly, audio must be gone when removal was asked for, and the duration
/// must be positive.
pub fn verify_output(path: &Path, actual: &VideoDescriptor, request: &TranscodeRequest) -> CoreResult<()> {
    let mismatch = |property: &str, expected: String, actual: String| {
        log::error!(
            "Verification of {} failed: {property} expected {expected}, got {actual}",
            path.display()
        );
        Err(CoreError::ConversionVerification {
            path: path.to_path_buf(),
            property: property.to_string(),
            expected,
            actual,
        })
    };

    if let Some(expected) = request.frame_rate() {
        let error = (actual.frame_rate - expected).abs() / expected;
        if error >= FRAME_RATE_TOLERANCE {
            return mismatch(
                "frame rate",
                format!("{expected}"),
                format!("{:.3} ({:.1}% off)", actual.frame_rate, error * 100.0),
            );
        }
    }

    if let Some(expected) = request.width() {
        if actual.width != expected {
            return mismatch("width", expected.to_string(), actual.width.to_string());
        }
    }

    if let Some(expected) = request.height() {
        if actual.height != expected {
            return mismatch("height", expected.to_string(), actual.height.to_string());
        }
    }

    if request.remove_audio() && actual.has_sound {
        return mismatch("audio", "none".to_string(), "audio stream present".to_string());
    }

    if actual.duration <= 0.0 {
        return mismatch("duration", "> 0".to_string(), actual.duration.to_string());
    }

    log::debug!("Verified {}", path.display());
    Ok(())
}

/// Checks that a pure copy kept the stream properties of `input`.
///
/// Width, height and audio presence must be identical, the frame rate must be
/// within the conversion tolerance.
pub fn verify_unchanged(path: &Path, input: &VideoDescriptor, actual: &VideoDescriptor) -> CoreResult<()> {
    let mismatch = |property: &str, expected: String, actual: String| {
        log::error!(
            "Stream copy {} changed {property}: expected {expected}, got {actual}",
            path.display()
        );
        Err(CoreError::ConversionVerification {
            path: path.to_path_buf(),
            property: property.to_string(),
            expected,
            actual,
        })
    };

    if actual.width != input.width {
        return mismatch("width", input.width.to_string(), actual.width.to_string());
    }
    if actual.height != input.height {
        return mismatch("height", input.height.to_string(), actual.height.to_string());
    }
    if input.frame_rate > 0.0 {
        let error = (actual.frame_rate - input.frame_rate).abs() / input.frame_rate;
        if error >= FRAME_RATE_TOLERANCE {
            return mismatch(
                "frame rate",
                format!("{:.3}", input.frame_rate),
                format!("{:.3}", actual.frame_rate),
            );
        }
    }
    if actual.has_sound != input.has_sound {
        let describe = |sound: bool| if sound { "audio stream present" } else { "none" }.to_string();
        return mismatch("audio", describe(input.has_sound), describe(actual.has_sound));
    }
    Ok(())
}
