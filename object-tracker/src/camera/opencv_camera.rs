use anyhow::{anyhow, bail, Ok};
use image::RgbImage;
use opencv::{
    core::Mat,
    imgproc::{cvt_color_def, COLOR_BGR2RGB},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};

use super::FrameSource;
use crate::config::CameraConfig;

/// V4L2 webcam.
pub struct OpenCvCamera {
    capture: VideoCapture,
    frame: Mat,
}

impl OpenCvCamera {
    pub fn open(config: &CameraConfig) -> anyhow::Result<Self> {
        let mut capture = VideoCapture::new(config.index, videoio::CAP_V4L2)?;
        if !capture.is_opened()? {
            bail!("Could not open camera {}", config.index);
        }

        let fourcc: Vec<char> = config.fourcc.chars().collect();
        let [a, b, c, d] = fourcc.as_slice() else {
            bail!("FOURCC {:?} must be four characters", config.fourcc);
        };
        capture.set(videoio::CAP_PROP_FOURCC, VideoWriter::fourcc(*a, *b, *c, *d)? as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.height as f64)?;
        capture.set(videoio::CAP_PROP_FPS, config.fps as f64)?;

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        if (width, height) != (config.width, config.height) {
            log::warn!("Camera negotiated {width}x{height} instead of {}x{}", config.width, config.height);
        }
        log::info!("Camera {} streaming {width}x{height} @ {} fps", config.index, config.fps);

        Ok(Self { capture, frame: Mat::default() })
    }
}

impl FrameSource for OpenCvCamera {
    fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>> {
        if !self.capture.read(&mut self.frame)? || self.frame.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        cvt_color_def(&self.frame, &mut rgb, COLOR_BGR2RGB)?;
        let size = rgb.size()?;
        let frame = RgbImage::from_raw(size.width as u32, size.height as u32, rgb.data_bytes()?.to_vec())
            .ok_or(anyhow!("Camera frame of {}x{} has an unexpected layout", size.width, size.height))?;

        Ok(Some(frame))
    }

    fn release(&mut self) {
        if let Err(e) = self.capture.release() {
            log::warn!("Failed to release camera: {e}");
        }
    }
}
