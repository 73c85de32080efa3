use image::RgbImage;
use imageproc::filter::separable_filter_equal;

use crate::utils::rgb_image_to_hsv;


/// Sigma OpenCV derives for a Gaussian kernel of `kernel_size` when it is
/// given a sigma of zero.
pub fn blur_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian with exactly `kernel_size` taps (even sizes are
/// bumped to the next odd one).
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let size = kernel_size | 1;
    let sigma = blur_sigma(size);
    let center = (size / 2) as f32;

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Blurs the frame to suppress sensor noise and converts it to HSV.
/// A kernel size of 0 or 1 skips the blur.
pub fn preprocess_frame(frame: &RgbImage, blur_kernel: u32) -> RgbImage {
    if blur_kernel <= 1 {
        return rgb_image_to_hsv(frame);
    }

    let blurred = separable_filter_equal(frame, &gaussian_kernel(blur_kernel));
    rgb_image_to_hsv(&blurred)
}
