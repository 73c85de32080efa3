use std::io;

use thiserror::Error;

/// Writing one command failed. The command is lost, the link stays usable.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Write to {port} timed out")]
    Timeout { port: String },

    #[error("Actuator on {port} disconnected: {source}")]
    Disconnected { port: String, source: io::Error },

    #[error("I/O error writing to {port}: {source}")]
    Io { port: String, source: io::Error },

    #[error("Link to {port} is already closed")]
    Closed { port: String },
}

impl TransportError {
    pub fn from_io(port: &str, err: io::Error) -> Self {
        let port = port.to_string();
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout { port },
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::WriteZero => TransportError::Disconnected { port, source: err },
            _ => TransportError::Io { port, source: err },
        }
    }
}

/// The serial channel could not be opened. Fatal at startup.
#[derive(Error, Debug)]
#[error("Failed to open serial port {port} at {baud_rate} baud: {source}")]
pub struct ChannelOpenFault {
    pub port: String,
    pub baud_rate: u32,
    #[source]
    pub source: serialport::Error,
}
