use image::GrayImage;
use imageproc::{
    distance_transform::Norm,
    morphology::{close, open},
};

/// Closing then opening with a square structuring element of side
/// `kernel_size`. Closing fills gaps inside the target, opening removes specks
/// smaller than the element. Even sizes behave like the next odd size.
pub fn clean_mask(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    if kernel_size <= 1 {
        return mask.clone();
    }

    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    let closed = close(mask, Norm::LInf, radius);
    open(&closed, Norm::LInf, radius)
}

#[cfg(test)]
mod tests {
    use image::Luma;

    use super::*;

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn small_specks_are_removed() {
        let mut mask = GrayImage::new(80, 80);
        fill(&mut mask, 10, 10, 3, 3);
        fill(&mut mask, 60, 20, 5, 5);

        let cleaned = clean_mask(&mask, 11);
        assert_eq!(count(&cleaned), 0);
    }

    #[test]
    fn large_rectangle_survives_unchanged() {
        let mut mask = GrayImage::new(120, 100);
        fill(&mut mask, 20, 30, 60, 40);

        let cleaned = clean_mask(&mask, 11);
        assert_eq!(cleaned, mask);
    }

    #[test]
    fn narrow_gap_is_closed() {
        let mut mask = GrayImage::new(140, 100);
        fill(&mut mask, 20, 30, 40, 40);
        fill(&mut mask, 64, 30, 40, 40);

        let cleaned = clean_mask(&mask, 11);
        assert_eq!(cleaned.get_pixel(62, 50).0, [255]);
        assert_eq!(count(&cleaned), 84 * 40);
    }

    #[test]
    fn kernel_of_one_is_identity() {
        let mut mask = GrayImage::new(20, 20);
        fill(&mut mask, 4, 4, 2, 2);

        assert_eq!(clean_mask(&mask, 1), mask);
    }
}
