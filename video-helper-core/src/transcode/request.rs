//! Caller-specified conversion target.

use crate::error::{CoreError, CoreResult};

/// What a conversion should change. Every field left unset keeps the input's
/// value; a request with nothing set is a pure stream copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeRequest {
    frame_rate: Option<f64>,
    width: Option<u32>,
    height: Option<u32>,
    remove_audio: bool,
}

impl TranscodeRequest {
    /// Builds a request. Odd dimensions are decremented to the next even
    /// value, as the encoder's chroma subsampling requires.
    #[must_use]
    pub fn new(
        frame_rate: Option<f64>,
        width: Option<u32>,
        height: Option<u32>,
        remove_audio: bool,
    ) -> Self {
        Self {
            frame_rate,
            width: width.map(force_even),
            height: height.map(force_even),
            remove_audio,
        }
    }

    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(force_even(width));
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(force_even(height));
        self
    }

    #[must_use]
    pub fn without_sound(mut self) -> Self {
        self.remove_audio = true;
        self
    }

    pub fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn remove_audio(&self) -> bool {
        self.remove_audio
    }

    /// True when nothing would change, so the input can be remultiplexed as is.
    pub fn is_pure_copy(&self) -> bool {
        self.frame_rate.is_none() && self.width.is_none() && self.height.is_none() && !self.remove_audio
    }

    /// Rejects targets no encoder could produce.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(rate) = self.frame_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(CoreError::Config(format!(
                    "target frame rate must be positive, got {rate}"
                )));
            }
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == Some(0) {
                return Err(CoreError::Config(format!(
                    "target {name} must be at least 2 pixels"
                )));
            }
        }
        Ok(())
    }
}

fn force_even(value: u32) -> u32 {
    value - value % 2
}
