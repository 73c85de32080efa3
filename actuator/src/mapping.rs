use nalgebra::Vector2;
use serde::Deserialize;

use crate::commands::MappedCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Toward zero, what the microcontroller firmware was tuned against.
    #[default]
    Truncate,
    Nearest,
}

impl Rounding {
    fn apply(self, value: f64) -> i32 {
        match self {
            Rounding::Truncate => value.trunc() as i32,
            Rounding::Nearest => value.round() as i32,
        }
    }
}

/// Output range of one axis. `out_low` is what the left/top edge of the frame
/// maps to, `out_high` the right/bottom edge; either may be the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisRange {
    pub out_low: f64,
    pub out_high: f64,
    #[serde(default)]
    pub invert: bool,
}

impl AxisRange {
    pub fn new(out_low: f64, out_high: f64) -> Self {
        Self { out_low, out_high, invert: false }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Bounds with `invert` applied.
    pub fn bounds(&self) -> (f64, f64) {
        if self.invert {
            (self.out_high, self.out_low)
        } else {
            (self.out_low, self.out_high)
        }
    }
}

/// Linear map from a pixel axis `[0, domain_max]` onto an [`AxisRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapping {
    pub domain_max: f64,
    pub range: AxisRange,
}

impl AxisMapping {
    pub fn new(domain_max: u32, range: AxisRange) -> Self {
        Self { domain_max: domain_max as f64, range }
    }

    /// Interpolated value before rounding. Inputs outside the domain clamp to
    /// the nearest bound.
    pub fn interpolate(&self, coordinate: f64) -> f64 {
        let (low, high) = self.range.bounds();
        if self.domain_max <= 0.0 || coordinate <= 0.0 {
            return low;
        }
        if coordinate >= self.domain_max {
            return high;
        }

        low + coordinate * (high - low) / self.domain_max
    }
}

#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    horizontal: AxisMapping,
    vertical: AxisMapping,
    rounding: Rounding,
}

impl CoordinateMapper {
    pub fn new(horizontal: AxisMapping, vertical: AxisMapping, rounding: Rounding) -> Self {
        Self { horizontal, vertical, rounding }
    }

    /// Mapper for a `width` x `height` frame.
    pub fn for_frame(width: u32, height: u32, horizontal: AxisRange, vertical: AxisRange, rounding: Rounding) -> Self {
        Self::new(AxisMapping::new(width, horizontal), AxisMapping::new(height, vertical), rounding)
    }

    pub fn map_axis_x(&self, x: i32) -> i32 {
        self.rounding.apply(self.horizontal.interpolate(x as f64))
    }

    pub fn map_axis_y(&self, y: i32) -> i32 {
        self.rounding.apply(self.vertical.interpolate(y as f64))
    }

    pub fn map(&self, centroid: &Vector2<i32>) -> MappedCommand {
        MappedCommand::new(self.map_axis_x(centroid.x), self.map_axis_y(centroid.y))
    }
}
