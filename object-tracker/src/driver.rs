use std::{
    io::Write,
    time::{Duration, Instant},
};

use actuator::{error::ChannelOpenFault, ActuatorLink};
use image::RgbImage;

use crate::{
    camera::FrameSource,
    error::TrackerError,
    pipeline::{Detection, Pipeline},
    preview::Preview,
    signal::StopSignal,
};

const THROUGHPUT_LOG_INTERVAL: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct FrameReport {
    pub detection: Option<Detection>,
    pub sent: bool,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum Step {
    /// Frame handled, keep going.
    Continue(FrameReport),
    /// Frame handled, then a stop was requested.
    Stop(FrameReport),
    StreamEnded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub targets: u64,
    pub sent: u64,
    pub dropped: u64,
}

/// Owns the video source and the actuator link for the whole run and drives
/// one frame at a time through the pipeline. Both resources are released on
/// shutdown, or on drop if the run never got that far.
pub struct Driver<S: FrameSource, C: Write> {
    state: DriverState,
    pipeline: Pipeline,
    source: S,
    link: ActuatorLink<C>,
    stop: Box<dyn StopSignal>,
    preview: Option<Box<dyn Preview>>,
    frame_budget: Option<Duration>,
    summary: RunSummary,
    started: Instant,
}

impl<S: FrameSource, C: Write> Driver<S, C> {
    /// Opens the actuator link, then the video source. A source that fails to
    /// open releases the already open link before the fault is returned.
    pub fn initialize(
        pipeline: Pipeline,
        open_link: impl FnOnce() -> Result<ActuatorLink<C>, ChannelOpenFault>,
        open_source: impl FnOnce() -> anyhow::Result<S>,
        stop: impl StopSignal + 'static,
    ) -> Result<Self, TrackerError> {
        log::debug!("Driver state: {:?}", DriverState::Initializing);

        log::info!("Connecting to actuator");
        let mut link = open_link()?;

        log::info!("Opening video source");
        let source = match open_source() {
            Ok(source) => source,
            Err(e) => {
                link.close();
                return Err(TrackerError::Acquisition(format!("{e:#}")));
            }
        };

        Ok(Driver::new(pipeline, source, link, stop))
    }

    /// Driver over resources that are already open.
    pub fn new(pipeline: Pipeline, source: S, link: ActuatorLink<C>, stop: impl StopSignal + 'static) -> Self {
        log::debug!("Driver state: {:?}", DriverState::Running);
        Self {
            state: DriverState::Running,
            pipeline,
            source,
            link,
            stop: Box::new(stop),
            preview: None,
            frame_budget: None,
            summary: RunSummary::default(),
            started: Instant::now(),
        }
    }

    pub fn with_preview(mut self, preview: Box<dyn Preview>) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Frames slower than `budget` are logged.
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = Some(budget);
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn frame_budget(&self) -> Option<Duration> {
        self.frame_budget
    }

    pub fn link(&self) -> &ActuatorLink<C> {
        &self.link
    }

    /// Runs until the stream ends or a stop is requested, then shuts down.
    pub fn run(mut self) -> RunSummary {
        log::info!("Starting main loop");
        self.started = Instant::now();

        loop {
            match self.step() {
                Step::Continue(_) => {}
                Step::Stop(_) | Step::StreamEnded => break,
            }
        }

        self.shutdown();
        self.summary
    }

    /// One iteration: acquire, process, send, preview, poll for stop.
    pub fn step(&mut self) -> Step {
        if self.state != DriverState::Running {
            return Step::StreamEnded;
        }

        let frame = match self.source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("Video stream ended after {} frames", self.summary.frames);
                self.enter(DriverState::ShuttingDown);
                return Step::StreamEnded;
            }
            Err(e) => {
                log::warn!("Failed to read frame, treating it as end of stream: {e:#}");
                self.enter(DriverState::ShuttingDown);
                return Step::StreamEnded;
            }
        };

        let report = self.process_frame(&frame);

        let preview_quit = self.preview.as_mut().map(|p| p.quit_requested()).unwrap_or(false);
        if self.stop.should_stop() || preview_quit {
            log::info!("Stop requested");
            self.enter(DriverState::ShuttingDown);
            return Step::Stop(report);
        }

        Step::Continue(report)
    }

    fn process_frame(&mut self, frame: &RgbImage) -> FrameReport {
        let frame_start = Instant::now();
        self.summary.frames += 1;

        let detection = self.pipeline.process(frame);
        let mut sent = false;
        if let Some(detection) = &detection {
            self.summary.targets += 1;
            let c = detection.target.centroid;
            log::debug!(
                "Target of area {} at ({}, {}) -> {}",
                detection.target.area(),
                c.x,
                c.y,
                detection.command
            );

            match self.link.send(&detection.command) {
                Ok(()) => {
                    self.summary.sent += 1;
                    sent = true;
                }
                Err(e) => {
                    self.summary.dropped += 1;
                    log::error!("Failed to send command to actuator: {e}");
                }
            }
        }

        // The overlay only shows commands that actually went out
        if let Some(preview) = self.preview.as_mut() {
            if let Err(e) = preview.present(frame, detection.as_ref().filter(|_| sent)) {
                log::warn!("Failed to update preview: {e:#}");
            }
        }

        let elapsed = frame_start.elapsed();
        if let Some(budget) = self.frame_budget {
            if elapsed > budget {
                log::debug!("Frame {} took {elapsed:?}, over the {budget:?} budget", self.summary.frames);
            }
        }
        if self.summary.frames % THROUGHPUT_LOG_INTERVAL == 0 {
            let fps = self.summary.frames as f64 / self.started.elapsed().as_secs_f64().max(f64::EPSILON);
            log::info!("{} frames, {:.1} fps, {} commands sent", self.summary.frames, fps, self.summary.sent);
        }

        FrameReport { detection, sent, elapsed }
    }

    fn enter(&mut self, state: DriverState) {
        log::debug!("Driver state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Releases the video source, closes the link and the preview.
    pub fn shutdown(&mut self) {
        if self.state == DriverState::Terminated {
            return;
        }
        self.enter(DriverState::ShuttingDown);

        self.source.release();
        self.link.close();
        if let Some(preview) = self.preview.as_mut() {
            preview.release();
        }

        log::info!(
            "Processed {} frames: {} targets, {} commands sent, {} dropped",
            self.summary.frames,
            self.summary.targets,
            self.summary.sent,
            self.summary.dropped
        );
        self.enter(DriverState::Terminated);
    }
}

impl<S: FrameSource, C: Write> Drop for Driver<S, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
