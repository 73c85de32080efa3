use std::io::{self, Write};

use actuator::ActuatorLink;
use anyhow::anyhow;
use clap::Parser;
use nalgebra::Vector2;
use object_tracker::{signal::InterruptFlag, Config, Driver, Pipeline, RunSummary};
use rand::{thread_rng, Rng};
use simulated_target::SimulatedSource;

mod simulated_target;

/// Runs the tracker against a synthetic moving target.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Number of frames to render
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Serial port to send commands to, stdout when left out
    #[arg(long)]
    port: Option<String>,

    /// Pace frames at the configured camera frame rate
    #[arg(long)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(LogTarget::for_port(args.port.as_deref()))?;

    let mut config = simulator_config();
    let pace = args.realtime.then(|| config.frame_budget());
    let frame_size = Vector2::new(config.camera.width, config.camera.height);
    let source = SimulatedSource::new(frame_size, args.frames, pace, config.mapper(), thread_rng());

    let interrupt = InterruptFlag::new();
    interrupt.listen_for_ctrl_c()?;

    let summary = match &args.port {
        Some(port) => {
            config.serial.port = port.clone();
            log::info!("Connecting to actuator on {port}");
            let link = ActuatorLink::open(&config.serial)?;
            run(&config, source, link, interrupt)?
        }
        None => {
            let link = ActuatorLink::new("stdout", io::stdout());
            run(&config, source, link, interrupt)?
        }
    };

    log::info!(
        "Simulation done: {} frames, {} targets, {} commands sent, {} dropped",
        summary.frames,
        summary.targets,
        summary.sent,
        summary.dropped
    );

    Ok(())
}

fn simulator_config() -> Config {
    let mut config = Config::default();
    config.camera.width = 640;
    config.camera.height = 480;
    config.selection.min_area = 2000.0;
    config
}

fn build_driver<R: Rng, C: Write>(
    config: &Config,
    source: SimulatedSource<R>,
    link: ActuatorLink<C>,
    interrupt: InterruptFlag,
) -> anyhow::Result<Driver<SimulatedSource<R>, C>> {
    let pipeline = Pipeline::from_config(config)?;
    Ok(Driver::new(pipeline, source, link, interrupt).with_frame_budget(config.frame_budget()))
}

fn run<R: Rng, C: Write>(
    config: &Config,
    source: SimulatedSource<R>,
    link: ActuatorLink<C>,
    interrupt: InterruptFlag,
) -> anyhow::Result<RunSummary> {
    let driver = build_driver(config, source, link, interrupt)?;
    if let Some(budget) = driver.frame_budget() {
        log::info!("Simulating with a {budget:?} frame budget");
    }
    Ok(driver.run())
}

const LOG_FILE: &str = "./log/simulator.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Console,
    File,
}

impl LogTarget {
    // Without a port stdout carries the command stream
    fn for_port(port: Option<&str>) -> Self {
        match port {
            Some(_) => LogTarget::Console,
            None => LogTarget::File,
        }
    }
}

fn setup_logging(target: LogTarget) -> anyhow::Result<()> {
    if target == LogTarget::Console {
        simple_log::quick!();
        return Ok(());
    }

    simple_log::file(LOG_FILE, "debug", 100, 10).map_err(|e| anyhow!("Failed to set up logging to {LOG_FILE}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn logs_stay_off_stdout_when_commands_use_it() {
        assert_eq!(LogTarget::for_port(None), LogTarget::File);
        assert_eq!(LogTarget::for_port(Some("/dev/ttyUSB0")), LogTarget::Console);
    }

    #[test]
    fn driver_uses_the_camera_frame_budget() {
        let config = simulator_config();
        let frame_size = Vector2::new(config.camera.width, config.camera.height);
        let source = SimulatedSource::new(frame_size, 1, None, config.mapper(), StdRng::seed_from_u64(3));
        let link = ActuatorLink::new("mem", Vec::new());

        let driver = build_driver(&config, source, link, InterruptFlag::new()).unwrap();
        assert_eq!(driver.frame_budget(), Some(config.frame_budget()));
        assert_eq!(driver.run().frames, 1);
    }
}
