use anyhow::Ok;
use image::RgbImage;
use opencv::{
    core::{Mat, Point, Scalar, Vec3b},
    highgui,
    imgproc::{put_text, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

use super::{annotate, Preview};
use crate::pipeline::Detection;

/// highgui window; `q` asks the tracker to stop.
pub struct OpenCvWindow {
    name: String,
}

impl OpenCvWindow {
    pub fn open(name: &str) -> anyhow::Result<Self> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self { name: name.to_string() })
    }
}

fn to_bgr_mat(frame: &RgbImage) -> anyhow::Result<Mat> {
    let pixels: Vec<Vec3b> = frame.pixels().map(|p| Vec3b::from([p[2], p[1], p[0]])).collect();
    let mat = Mat::new_rows_cols_with_data(frame.height() as i32, frame.width() as i32, pixels.as_slice())?.clone_pointee();
    Ok(mat)
}

impl Preview for OpenCvWindow {
    fn present(&mut self, frame: &RgbImage, detection: Option<&Detection>) -> anyhow::Result<()> {
        let mut mat = to_bgr_mat(&annotate(frame, detection))?;

        if let Some(detection) = detection {
            let bbox = detection.target.bounding_box();
            let text = format!("Enviando ESP32: X:{} Y:{}", detection.command.x, detection.command.y);
            put_text(
                &mut mat,
                &text,
                Point::new(bbox.x, bbox.y - 10),
                FONT_HERSHEY_SIMPLEX,
                0.6,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                false,
            )?;
        }

        highgui::imshow(&self.name, &mat)?;
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        matches!(highgui::wait_key(1), std::result::Result::Ok(key) if key & 0xFF == 'q' as i32)
    }

    fn release(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            log::warn!("Failed to close window {}: {e}", self.name);
        }
    }
}
