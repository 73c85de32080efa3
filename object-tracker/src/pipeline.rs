use actuator::{commands::MappedCommand, mapping::CoordinateMapper};
use image::RgbImage;
use vision::{Target, TargetDetector};

use crate::{config::Config, error::TrackerError};

/// A target found in a frame together with the command it maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub target: Target,
    pub command: MappedCommand,
}

/// The per-frame computation: segmentation, blob selection and coordinate
/// mapping. No I/O.
pub struct Pipeline {
    detector: TargetDetector,
    mapper: CoordinateMapper,
}

impl Pipeline {
    pub fn new(detector: TargetDetector, mapper: CoordinateMapper) -> Self {
        Self { detector, mapper }
    }

    pub fn from_config(config: &Config) -> Result<Pipeline, TrackerError> {
        config.validate()?;
        let detector = TargetDetector::new(config.detector_config())
            .map_err(|e| TrackerError::Config(e.to_string()))?;

        Ok(Pipeline::new(detector, config.mapper()))
    }

    pub fn process(&self, frame: &RgbImage) -> Option<Detection> {
        let target = self.detector.process_frame(frame)?;
        let command = self.mapper.map(&target.centroid);

        Some(Detection { target, command })
    }
}
