pub mod blob;
pub mod filter;

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use serde::Deserialize;

use blob::{Blob, Target};
use filter::{largest_blob, meets_min_area};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub min_area: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { min_area: 4000.0 }
    }
}

/// Outer boundaries of the mask's foreground regions, in scan order. Holes,
/// and anything inside a hole, are left out.
pub fn extract_blobs(mask: &GrayImage) -> Vec<Blob> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
        .filter_map(|contour| Blob::from_contour(&contour.points))
        .collect()
}

pub fn select(mask: &GrayImage, min_area: f64) -> Option<Target> {
    let blobs = extract_blobs(mask);
    let candidates = blobs.len();
    let largest = largest_blob(blobs)?;

    if !meets_min_area(&largest, min_area) {
        log::trace!("Largest of {candidates} blobs too small ({} < {min_area})", largest.area);
        return None;
    }

    Some(Target::new(largest))
}

#[cfg(test)]
mod tests {
    use image::Luma;
    use nalgebra::Vector2;

    use super::*;
    use blob::BoundingBox;

    fn fill(mask: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn empty_mask_has_no_target() {
        let mask = GrayImage::new(64, 64);
        assert!(extract_blobs(&mask).is_empty());
        assert!(select(&mask, 0.0).is_none());
    }

    #[test]
    fn single_region_is_bounded_exactly() {
        let mut mask = GrayImage::new(320, 240);
        fill(&mut mask, 40, 30, 100, 50);

        let target = select(&mask, 4000.0).unwrap();
        assert_eq!(*target.bounding_box(), BoundingBox::new(40, 30, 100, 50));
        assert_eq!(target.centroid, Vector2::new(90, 55));
        assert_eq!(target.area(), 99.0 * 49.0);
    }

    #[test]
    fn regions_below_min_area_are_rejected() {
        let mut mask = GrayImage::new(320, 240);
        fill(&mut mask, 10, 10, 30, 30);
        fill(&mut mask, 100, 100, 40, 40);

        assert!(select(&mask, 4000.0).is_none());
        assert!(select(&mask, 1000.0).is_some());
    }

    #[test]
    fn largest_region_wins() {
        let mut mask = GrayImage::new(320, 240);
        fill(&mut mask, 10, 10, 30, 30);
        fill(&mut mask, 150, 100, 80, 60);
        fill(&mut mask, 60, 150, 50, 50);

        let target = select(&mask, 100.0).unwrap();
        assert_eq!(*target.bounding_box(), BoundingBox::new(150, 100, 80, 60));
    }

    #[test]
    fn equal_regions_resolve_to_first_in_scan_order() {
        let mut mask = GrayImage::new(320, 240);
        fill(&mut mask, 200, 120, 40, 40);
        fill(&mut mask, 20, 20, 40, 40);

        let target = select(&mask, 100.0).unwrap();
        assert_eq!(target.bounding_box().min(), Vector2::new(20, 20));
    }

    #[test]
    fn holes_do_not_count_as_blobs() {
        let mut mask = GrayImage::new(200, 200);
        fill(&mut mask, 20, 20, 120, 120);
        for y in 50..110 {
            for x in 50..110 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        // island inside the hole
        fill(&mut mask, 70, 70, 20, 20);

        let blobs = extract_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].bounding_box, BoundingBox::new(20, 20, 120, 120));
    }

    #[test]
    fn region_touching_the_frame_edge() {
        let mut mask = GrayImage::new(100, 100);
        fill(&mut mask, 0, 0, 30, 100);

        let target = select(&mask, 100.0).unwrap();
        assert_eq!(*target.bounding_box(), BoundingBox::new(0, 0, 30, 100));
    }
}
