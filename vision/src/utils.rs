use image::{Rgb, RgbImage};
use palette::{FromColor, Hsv, Srgb};


/// Converts one RGB pixel to 8-bit HSV.
///
/// Hue is halved into `0..180` so it fits a byte, saturation and value span
/// `0..=255`. This is the same encoding OpenCV produces for `COLOR_BGR2HSV`
/// on 8-bit images, so color bands tuned against OpenCV carry over as is.
pub fn rgb_to_hsv(pixel: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0;
    let hsv: Hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());

    [
        ((hsv.hue.into_positive_degrees() / 2.0).round() as u16 % 180) as u8,
        (hsv.saturation * 255.0).round() as u8,
        (hsv.value * 255.0).round() as u8,
    ]
}

// HSV triples are stored in an Rgb container, channel 0 is hue
pub fn rgb_image_to_hsv(img: &RgbImage) -> RgbImage {
    let mut hsv = img.clone();
    for pixel in hsv.pixels_mut() {
        *pixel = Rgb(rgb_to_hsv(pixel));
    }
    hsv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_land_on_opencv_hues() {
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 255])), [120, 255, 255]);
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(&Rgb([255, 255, 255])), [0, 0, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([90, 90, 90])), [0, 0, 90]);
    }

    #[test]
    fn orange_is_low_hue() {
        let [h, s, v] = rgb_to_hsv(&Rgb([255, 128, 0]));
        assert_eq!(h, 15);
        assert_eq!(s, 255);
        assert_eq!(v, 255);
    }

    #[test]
    fn mixed_color_matches_opencv_output() {
        // cv2.cvtColor(np.uint8([[[30, 200, 10]]]), cv2.COLOR_BGR2HSV)
        assert_eq!(rgb_to_hsv(&Rgb([10, 200, 30])), [63, 242, 200]);
    }

    #[test]
    fn magenta_wraps_below_180() {
        let [h, _, _] = rgb_to_hsv(&Rgb([255, 0, 1]));
        assert!(h < 180);
    }

    #[test]
    fn image_conversion_is_per_pixel() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));

        let hsv = rgb_image_to_hsv(&img);
        assert_eq!(hsv.get_pixel(0, 0).0, [0, 255, 255]);
        assert_eq!(hsv.get_pixel(1, 0).0, [120, 255, 255]);
    }
}
