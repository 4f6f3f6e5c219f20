//! Decoded RGB frame.

use image::{Rgb, RgbImage};

/// Number of channels in every frame (RGB order).
pub const FRAME_CHANNELS: u32 = 3;

/// A decoded image of `height x width x 3` RGB intensities in `[0, 255]`.
///
/// Frames are handed to the caller by value; nothing in the library keeps a
/// reference to a frame after yielding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Wraps packed `rgb24` bytes. Returns `None` when `data` is not exactly
    /// `width * height * 3` bytes long.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, data).map(Self::new)
    }

    /// A frame filled with a single color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channels(&self) -> u32 {
        FRAME_CHANNELS
    }

    /// `(height, width, channels)`, the array shape of the frame.
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.height(), self.width(), self.channels())
    }

    /// RGB value at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// Packed row-major RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_height_width_channels() {
        let frame = Frame::filled(640, 360, [10, 20, 30]);
        assert_eq!(frame.shape(), (360, 640, 3));
        assert_eq!(frame.pixel(639, 359), [10, 20, 30]);
        assert_eq!(frame.as_raw().len(), 640 * 360 * 3);
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(Frame::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(Frame::from_raw(2, 2, vec![0; 11]).is_none());
    }
}
