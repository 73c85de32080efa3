mod preprocess;
mod vision;
mod utils;

use anyhow::{bail, Ok};
use image::{GrayImage, RgbImage};
use serde::Deserialize;

pub use preprocess::{blur_sigma, preprocess_frame};
pub use utils::{rgb_image_to_hsv, rgb_to_hsv};
pub use vision::blobs::{
    blob::{contour_area, Blob, BoundingBox, Target},
    extract_blobs, select, SelectionConfig,
};
pub use vision::segmentation::{morphology::clean_mask, segment, threshold, ColorBand, SegmentationConfig};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub segmentation: SegmentationConfig,
    pub selection: SelectionConfig,
}

/// Finds the single colored target in a frame: segmentation followed by blob
/// selection.
pub struct TargetDetector {
    band: ColorBand,
    config: DetectorConfig,
}

impl TargetDetector {
    pub fn new(config: DetectorConfig) -> anyhow::Result<Self> {
        let band = config.segmentation.band();
        if band.is_empty() {
            bail!("Color band is empty: lower {:?} is above upper {:?}", band.lower, band.upper);
        }
        if config.segmentation.morph_kernel / 2 > u8::MAX as u32 {
            bail!("Morphology kernel of {} is too large", config.segmentation.morph_kernel);
        }
        if !config.selection.min_area.is_finite() || config.selection.min_area < 0.0 {
            bail!("Minimum blob area must be a non-negative number, got {}", config.selection.min_area);
        }

        Ok(Self { band, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn segment(&self, frame: &RgbImage) -> GrayImage {
        let seg = &self.config.segmentation;
        segment(frame, &self.band, seg.blur_kernel, seg.morph_kernel)
    }

    pub fn process_frame(&self, frame: &RgbImage) -> Option<Target> {
        let mask = self.segment(frame);
        select(&mask, self.config.selection.min_area)
    }
}
