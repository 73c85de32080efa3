use actuator::error::ChannelOpenFault;
use thiserror::Error;

/// Faults that stop the tracker before the main loop starts.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    ChannelOpen(#[from] ChannelOpenFault),

    #[error("Video source unavailable: {0}")]
    Acquisition(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
