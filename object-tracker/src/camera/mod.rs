pub mod image_sequence;
#[cfg(feature = "opencv")]
pub mod opencv_camera;

use image::RgbImage;

/// Where frames come from. `Ok(None)` marks the end of the stream.
pub trait FrameSource {
    fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>>;

    fn release(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
