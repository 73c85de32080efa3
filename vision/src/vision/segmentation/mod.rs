pub mod morphology;

use image::{GrayImage, Luma, RgbImage};
use serde::Deserialize;

use crate::preprocess::preprocess_frame;
use morphology::clean_mask;

/// Inclusive HSV range a pixel has to fall into on every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: &[u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }

    /// A band with a lower bound above its upper bound on any channel can
    /// never match.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.lower[i] > self.upper[i])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
    pub blur_kernel: u32,
    pub morph_kernel: u32,
}

impl SegmentationConfig {
    pub fn band(&self) -> ColorBand {
        ColorBand::new(self.lower, self.upper)
    }
}

impl Default for SegmentationConfig {
    // Orange ball under indoor light
    fn default() -> Self {
        Self {
            lower: [0, 144, 77],
            upper: [119, 255, 255],
            blur_kernel: 11,
            morph_kernel: 11,
        }
    }
}

/// Marks every HSV pixel inside the band with 255, everything else with 0.
pub fn threshold(hsv: &RgbImage, band: &ColorBand) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        if band.contains(&hsv.get_pixel(x, y).0) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

pub fn segment(frame: &RgbImage, band: &ColorBand, blur_kernel: u32, morph_kernel: u32) -> GrayImage {
    let hsv = preprocess_frame(frame, blur_kernel);
    let mask = threshold(&hsv, band);
    clean_mask(&mask, morph_kernel)
}
