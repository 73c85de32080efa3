use std::path::PathBuf;

use actuator::ActuatorLink;
use clap::Parser;
use object_tracker::{
    camera::{image_sequence::ImageSequence, FrameSource},
    preview::{ImageDump, Preview},
    signal::InterruptFlag,
    Config, Driver, Pipeline,
};

/// Follows a colored object with the camera and streams its position to the
/// actuator over serial.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// TOML configuration, defaults are used for anything it leaves out
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port, overrides the configuration
    #[arg(long)]
    port: Option<String>,

    /// Replay the images in this directory instead of using the camera
    #[arg(long)]
    frames: Option<PathBuf>,

    /// No preview window
    #[arg(long)]
    headless: bool,

    /// Write annotated frames to this directory
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if args.headless {
        config.display.enabled = false;
    }

    let pipeline = Pipeline::from_config(&config)?;
    let interrupt = InterruptFlag::new();
    interrupt.listen_for_ctrl_c()?;

    let driver = Driver::initialize(
        pipeline,
        || ActuatorLink::open(&config.serial),
        || open_source(&args, &config),
        interrupt,
    )?
    .with_frame_budget(config.frame_budget());

    let driver = match open_preview(&args, &config)? {
        Some(preview) => driver.with_preview(preview),
        None => driver,
    };

    log::info!("Tracking, press Ctrl-C{} to stop", if config.display.enabled { " or 'q'" } else { "" });
    let summary = driver.run();
    log::info!("Done: {} of {} frames produced a command", summary.sent, summary.frames);

    Ok(())
}

fn open_source(args: &Args, config: &Config) -> anyhow::Result<Box<dyn FrameSource>> {
    if let Some(dir) = &args.frames {
        let size = (config.camera.width, config.camera.height);
        return Ok(Box::new(ImageSequence::open(dir, size)?));
    }
    open_camera(config)
}

#[cfg(feature = "opencv")]
fn open_camera(config: &Config) -> anyhow::Result<Box<dyn FrameSource>> {
    use object_tracker::camera::opencv_camera::OpenCvCamera;

    Ok(Box::new(OpenCvCamera::open(&config.camera)?))
}

#[cfg(not(feature = "opencv"))]
fn open_camera(_config: &Config) -> anyhow::Result<Box<dyn FrameSource>> {
    anyhow::bail!("Built without camera support, use --frames to replay recorded images");
}

fn open_preview(args: &Args, config: &Config) -> anyhow::Result<Option<Box<dyn Preview>>> {
    if let Some(dir) = &args.dump {
        return Ok(Some(Box::new(ImageDump::create(dir.clone())?)));
    }
    if !config.display.enabled {
        return Ok(None);
    }
    Ok(open_window(config))
}

#[cfg(feature = "opencv")]
fn open_window(config: &Config) -> Option<Box<dyn Preview>> {
    use object_tracker::preview::window::OpenCvWindow;

    match OpenCvWindow::open(&config.display.window_name) {
        Ok(window) => Some(Box::new(window)),
        Err(e) => {
            log::warn!("No preview window, continuing headless: {e}");
            None
        }
    }
}

#[cfg(not(feature = "opencv"))]
fn open_window(_config: &Config) -> Option<Box<dyn Preview>> {
    log::warn!("Built without window support, continuing headless");
    None
}

fn setup_logging() {
    simple_log::quick!();
}
