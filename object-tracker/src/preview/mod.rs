#[cfg(feature = "opencv")]
pub mod window;

use std::{fs, path::PathBuf};

use anyhow::{Context, Ok};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut},
    rect::Rect,
};

use crate::pipeline::Detection;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: i32 = 2;
const CENTROID_RADIUS: i32 = 5;

/// Operator feedback. Never consulted for control decisions, apart from
/// offering a way to ask for a stop.
pub trait Preview {
    fn present(&mut self, frame: &RgbImage, detection: Option<&Detection>) -> anyhow::Result<()>;

    fn quit_requested(&mut self) -> bool {
        false
    }

    fn release(&mut self) {}
}

/// Copy of `frame` with the target's bounding box and centroid drawn on it.
pub fn annotate(frame: &RgbImage, detection: Option<&Detection>) -> RgbImage {
    let mut annotated = frame.clone();
    let Some(detection) = detection else {
        return annotated;
    };

    let bbox = detection.target.bounding_box();
    for grow in 0..BOX_THICKNESS {
        let rect = Rect::at(bbox.x - grow, bbox.y - grow)
            .of_size((bbox.width + 2 * grow) as u32, (bbox.height + 2 * grow) as u32);
        draw_hollow_rect_mut(&mut annotated, rect, BOX_COLOR);
    }

    let centroid = detection.target.centroid;
    draw_filled_circle_mut(&mut annotated, (centroid.x, centroid.y), CENTROID_RADIUS, CENTROID_COLOR);

    annotated
}

/// Writes every annotated frame to a directory as numbered PNGs.
pub struct ImageDump {
    dir: PathBuf,
    index: u64,
}

impl ImageDump {
    pub fn create(dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self { dir, index: 0 })
    }
}

impl Preview for ImageDump {
    fn present(&mut self, frame: &RgbImage, detection: Option<&Detection>) -> anyhow::Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.index));
        self.index += 1;
        annotate(frame, detection).save(&path)?;

        Ok(())
    }
}
