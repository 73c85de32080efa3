use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Ok};
use image::RgbImage;

use super::FrameSource;

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays the images of a directory in file name order, one per frame.
pub struct ImageSequence {
    pending: VecDeque<PathBuf>,
    expected_size: (u32, u32),
    warned_size: bool,
}

impl ImageSequence {
    pub fn open(dir: &Path, expected_size: (u32, u32)) -> anyhow::Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        if paths.is_empty() {
            bail!("No images found in {}", dir.display());
        }
        paths.sort();

        log::info!("Replaying {} frames from {}", paths.len(), dir.display());
        Ok(Self {
            pending: paths.into(),
            expected_size,
            warned_size: false,
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequence {
    fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let frame = image::open(&path)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgb8();

        if frame.dimensions() != self.expected_size && !self.warned_size {
            log::warn!(
                "{} is {}x{}, mapping assumes {}x{}",
                path.display(),
                frame.width(),
                frame.height(),
                self.expected_size.0,
                self.expected_size.1
            );
            self.warned_size = true;
        }

        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.pending.clear();
    }
}
