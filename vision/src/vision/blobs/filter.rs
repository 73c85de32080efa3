use super::blob::Blob;


/// Largest blob by area. On equal areas the earliest one wins, which for
/// contour extraction is the first found in row-major scan order.
#[inline(always)]
pub fn largest_blob(blobs: Vec<Blob>) -> Option<Blob> {
    blobs.into_iter().fold(None, |best, blob| match best {
        Some(b) if b.area >= blob.area => Some(b),
        _ => Some(blob),
    })
}

#[inline(always)]
pub fn meets_min_area(blob: &Blob, min_area: f64) -> bool {
    blob.area >= min_area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::blobs::blob::BoundingBox;

    fn blob(area: f64, x: i32) -> Blob {
        Blob {
            area,
            bounding_box: BoundingBox::new(x, 0, 1, 1),
        }
    }

    #[test]
    fn picks_strictly_largest() {
        let best = largest_blob(vec![blob(10.0, 0), blob(30.0, 1), blob(20.0, 2)]).unwrap();
        assert_eq!(best.bounding_box.x, 1);
    }

    #[test]
    fn ties_go_to_first() {
        let best = largest_blob(vec![blob(30.0, 0), blob(30.0, 1)]).unwrap();
        assert_eq!(best.bounding_box.x, 0);
    }

    #[test]
    fn nothing_to_pick_from() {
        assert!(largest_blob(Vec::new()).is_none());
    }

    #[test]
    fn min_area_is_inclusive() {
        assert!(meets_min_area(&blob(4000.0, 0), 4000.0));
        assert!(!meets_min_area(&blob(3999.5, 0), 4000.0));
    }
}
