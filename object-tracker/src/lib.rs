pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod signal;

pub use config::Config;
pub use driver::{Driver, DriverState, RunSummary, Step};
pub use error::TrackerError;
pub use pipeline::{Detection, Pipeline};
