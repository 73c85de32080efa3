use std::{thread::sleep, time::Duration};

use actuator::mapping::CoordinateMapper;
use anyhow::Ok;
use image::{Rgb, RgbImage};
use nalgebra::Vector2;
use object_tracker::camera::FrameSource;
use rand::Rng;

const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);
const TARGET_COLOR: Rgb<u8> = Rgb([255, 128, 0]);

/// Solid patch in the target color bouncing around the frame.
pub struct SimTarget {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub size: Vector2<u32>,
    pub visible: bool,
}

impl SimTarget {
    pub fn random(frame_size: Vector2<u32>, rng: &mut impl Rng) -> Self {
        let size = Vector2::new(120, 80);
        Self {
            pos: Vector2::new(
                rng.gen_range(0.0..(frame_size.x - size.x) as f64),
                rng.gen_range(0.0..(frame_size.y - size.y) as f64),
            ),
            vel: Vector2::new(rng.gen_range(-12.0..12.0), rng.gen_range(-8.0..8.0)),
            size,
            visible: true,
        }
    }

    pub fn step(&mut self, frame_size: Vector2<u32>) {
        let max = Vector2::new((frame_size.x - self.size.x) as f64, (frame_size.y - self.size.y) as f64);
        self.pos += self.vel;

        if self.pos.x < 0.0 || self.pos.x > max.x {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.clamp(0.0, max.x);
        }
        if self.pos.y < 0.0 || self.pos.y > max.y {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.clamp(0.0, max.y);
        }
    }

    /// Centroid the tracker should find: center of the patch's box.
    pub fn centroid(&self) -> Vector2<i32> {
        let x = self.pos.x as i32;
        let y = self.pos.y as i32;
        Vector2::new(x + self.size.x as i32 / 2, y + self.size.y as i32 / 2)
    }

    pub fn render(&self, frame_size: Vector2<u32>) -> RgbImage {
        let mut frame = RgbImage::from_pixel(frame_size.x, frame_size.y, BACKGROUND);
        if !self.visible {
            return frame;
        }

        let x0 = self.pos.x as u32;
        let y0 = self.pos.y as u32;
        for y in y0..(y0 + self.size.y).min(frame_size.y) {
            for x in x0..(x0 + self.size.x).min(frame_size.x) {
                frame.put_pixel(x, y, TARGET_COLOR);
            }
        }

        frame
    }
}

/// Frame source rendering a [`SimTarget`] for a fixed number of frames. The
/// target hides now and then so the no-target path gets exercised too.
pub struct SimulatedSource<R: Rng> {
    target: SimTarget,
    frame_size: Vector2<u32>,
    remaining: u64,
    pace: Option<Duration>,
    mapper: CoordinateMapper,
    rng: R,
}

impl<R: Rng> SimulatedSource<R> {
    pub fn new(frame_size: Vector2<u32>, frames: u64, pace: Option<Duration>, mapper: CoordinateMapper, mut rng: R) -> Self {
        Self {
            target: SimTarget::random(frame_size, &mut rng),
            frame_size,
            remaining: frames,
            pace,
            mapper,
            rng,
        }
    }
}

impl<R: Rng> FrameSource for SimulatedSource<R> {
    fn read_frame(&mut self) -> anyhow::Result<Option<RgbImage>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        if let Some(pace) = self.pace {
            sleep(pace);
        }

        self.target.step(self.frame_size);
        if self.rng.gen_bool(0.02) {
            self.target.visible = !self.target.visible;
        }

        if self.target.visible {
            let c = self.target.centroid();
            log::debug!("Simulated target at ({}, {}), expecting {}", c.x, c.y, self.mapper.map(&c));
        } else {
            log::debug!("Simulated target hidden");
        }

        Ok(Some(self.target.render(self.frame_size)))
    }
}
