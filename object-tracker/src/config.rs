use std::{fs, path::Path, time::Duration};

use actuator::{
    mapping::{AxisRange, CoordinateMapper, Rounding},
    SerialSettings,
};
use serde::Deserialize;
use vision::{DetectorConfig, SegmentationConfig, SelectionConfig};

use crate::error::TrackerError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialSettings,
    pub camera: CameraConfig,
    pub segmentation: SegmentationConfig,
    pub selection: SelectionConfig,
    pub mapping: MappingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: i32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub fourcc: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 1280,
            height: 720,
            fps: 30,
            fourcc: "MJPG".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub rounding: Rounding,
    pub horizontal: AxisRange,
    pub vertical: AxisRange,
}

impl Default for MappingConfig {
    // Eye mechanism: pan is mirrored relative to the image, tilt is not
    fn default() -> Self {
        Self {
            rounding: Rounding::Truncate,
            horizontal: AxisRange::new(24.0, -24.0),
            vertical: AxisRange::new(-34.0, 34.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub window_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_name: "Tracking y Serial".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, TrackerError> {
        let text = fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Config::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Config, TrackerError> {
        toml::from_str(text).map_err(|e| TrackerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        let band = self.segmentation.band();
        if band.is_empty() {
            return Err(TrackerError::Config(format!(
                "Color band lower bound {:?} exceeds upper bound {:?}",
                band.lower, band.upper
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(TrackerError::Config(format!(
                "Camera resolution {}x{} is empty",
                self.camera.width, self.camera.height
            )));
        }
        if self.camera.fps == 0 {
            return Err(TrackerError::Config("Camera frame rate must be positive".to_string()));
        }
        if self.serial.baud_rate == 0 {
            return Err(TrackerError::Config("Baud rate must be positive".to_string()));
        }

        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            segmentation: self.segmentation.clone(),
            selection: self.selection.clone(),
        }
    }

    /// Maps pixel coordinates of the configured camera resolution.
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::for_frame(
            self.camera.width,
            self.camera.height,
            self.mapping.horizontal,
            self.mapping.vertical,
            self.mapping.rounding,
        )
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.camera.fps.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_bench_setup() {
        let config = Config::default();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.timeout_ms, 50);
        assert_eq!((config.camera.width, config.camera.height, config.camera.fps), (1280, 720, 30));
        assert_eq!(config.segmentation.lower, [0, 144, 77]);
        assert_eq!(config.segmentation.upper, [119, 255, 255]);
        assert_eq!(config.selection.min_area, 4000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.mapping.rounding, Rounding::Truncate);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let config = Config::parse(
            r#"
            [serial]
            port = "/dev/ttyACM0"
            settle_ms = 0

            [segmentation]
            lower = [100, 150, 50]
            upper = [140, 255, 255]

            [mapping]
            rounding = "nearest"

            [mapping.horizontal]
            out_low = -90
            out_high = 90
            invert = true
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.settle_ms, 0);
        assert_eq!(config.segmentation.lower, [100, 150, 50]);
        assert_eq!(config.segmentation.blur_kernel, 11);
        assert_eq!(config.mapping.rounding, Rounding::Nearest);
        assert!(config.mapping.horizontal.invert);
        assert_eq!(config.mapping.vertical, AxisRange::new(-34.0, 34.0));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        config.segmentation.lower = [130, 0, 0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.fps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.camera.height = 0;
        assert!(config.validate().is_err());

        assert!(Config::parse("[camera]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn mapper_uses_camera_resolution() {
        let mapper = Config::default().mapper();
        assert_eq!(mapper.map_axis_x(1280), -24);
        assert_eq!(mapper.map_axis_y(720), 34);
    }

    #[test]
    fn budget_follows_frame_rate() {
        assert_eq!(Config::default().frame_budget(), Duration::from_secs_f64(1.0 / 30.0));
    }
}
