use imageproc::point::Point;
use itertools::{Itertools, MinMaxResult};
use nalgebra::Vector2;

/// Axis-aligned box in pixel coordinates. `width`/`height` count pixels, so a
/// single pixel has a 1x1 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_points(points: &[Point<i32>]) -> Option<BoundingBox> {
        let (min_x, max_x) = min_max(points.iter().map(|p| p.x))?;
        let (min_y, max_y) = min_max(points.iter().map(|p| p.y))?;

        Some(BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    pub fn min(&self) -> Vector2<i32> {
        Vector2::new(self.x, self.y)
    }

    // Exclusive corner
    pub fn max(&self) -> Vector2<i32> {
        Vector2::new(self.x + self.width, self.y + self.height)
    }

    /// Center of the box, rounded down.
    pub fn center(&self) -> Vector2<i32> {
        Vector2::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

fn min_max(values: impl Iterator<Item = i32>) -> Option<(i32, i32)> {
    match values.minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    /// Area enclosed by the outer boundary, measured through the boundary
    /// pixel centres.
    pub area: f64,
    pub bounding_box: BoundingBox,
}

impl Blob {
    pub fn from_contour(points: &[Point<i32>]) -> Option<Blob> {
        let bounding_box = BoundingBox::from_points(points)?;

        Some(Blob {
            area: contour_area(points),
            bounding_box,
        })
    }
}

/// Shoelace area of the closed polygon through `points`.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice_area.abs() as f64 / 2.0
}

/// The single blob chosen for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub blob: Blob,
    pub centroid: Vector2<i32>,
}

impl Target {
    pub fn new(blob: Blob) -> Self {
        let centroid = blob.bounding_box.center();
        Self { blob, centroid }
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.blob.bounding_box
    }

    pub fn area(&self) -> f64 {
        self.blob.area
    }
}
