use std::{io::Write, thread::sleep, time::Duration};

use serde::Deserialize;
use serialport::SerialPort;

use commands::MappedCommand;
use error::{ChannelOpenFault, TransportError};

pub mod commands;
pub mod error;
pub mod mapping;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound on a single write.
    pub timeout_ms: u64,
    /// Pause after opening. Boards like the ESP32 reset when the port opens
    /// and drop anything sent before they are back up.
    pub settle_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            timeout_ms: 50,
            settle_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u64,
    pub dropped: u64,
}

/// Write-only command link to the microcontroller. Every command is one
/// `"<x>,<y>\n"` line, with no acknowledgement and no retries.
pub struct ActuatorLink<C: Write> {
    port: String,
    channel: C,
    stats: LinkStats,
    closed: bool,
}

impl ActuatorLink<Box<dyn SerialPort>> {
    pub fn open(settings: &SerialSettings) -> Result<Self, ChannelOpenFault> {
        let channel = serialport::new(&settings.port, settings.baud_rate)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .open()
            .map_err(|source| ChannelOpenFault {
                port: settings.port.clone(),
                baud_rate: settings.baud_rate,
                source,
            })?;

        if settings.settle_ms > 0 {
            log::debug!("Waiting {} ms for the actuator to come up", settings.settle_ms);
            sleep(Duration::from_millis(settings.settle_ms));
        }
        log::info!("Connected to actuator on {} at {} baud", settings.port, settings.baud_rate);

        Ok(ActuatorLink::new(&settings.port, channel))
    }
}

impl<C: Write> ActuatorLink<C> {
    pub fn new(port: &str, channel: C) -> Self {
        Self {
            port: port.to_string(),
            channel,
            stats: LinkStats::default(),
            closed: false,
        }
    }

    pub fn send(&mut self, command: &MappedCommand) -> Result<(), TransportError> {
        if self.closed {
            self.stats.dropped += 1;
            return Err(TransportError::Closed { port: self.port.clone() });
        }

        // One buffer per line, so a failed write never leaves a fragment ahead
        // of the next command
        match self.channel.write_all(command.encode().as_bytes()) {
            Ok(()) => {
                self.stats.sent += 1;
                Ok(())
            }
            Err(e) => {
                self.stats.dropped += 1;
                Err(TransportError::from_io(&self.port, e))
            }
        }
    }

    /// Flushes what is still buffered and refuses further commands. The
    /// underlying handle is released when the link is dropped.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.channel.flush() {
            log::warn!("Failed to flush {} on close: {e}", self.port);
        }
        self.closed = true;
        log::info!("Closed actuator link on {} ({} sent, {} dropped)", self.port, self.stats.sent, self.stats.dropped);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct BrokenChannel {
        kind: io::ErrorKind,
    }

    impl Write for BrokenChannel {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.kind))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sends_one_line_per_command() {
        let mut link = ActuatorLink::new("mem", Vec::new());
        link.send(&MappedCommand::new(3, -4)).unwrap();
        link.send(&MappedCommand::new(-24, 34)).unwrap();

        assert_eq!(link.channel().as_slice(), b"3,-4\n-24,34\n");
        assert_eq!(link.stats(), LinkStats { sent: 2, dropped: 0 });
    }

    #[test]
    fn write_failure_is_reported_not_raised() {
        let mut link = ActuatorLink::new("/dev/ttyUSB0", BrokenChannel { kind: io::ErrorKind::TimedOut });

        let err = link.send(&MappedCommand::new(1, 2)).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));

        // still usable afterwards
        let err = link.send(&MappedCommand::new(1, 2)).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(link.stats(), LinkStats { sent: 0, dropped: 2 });
    }

    /// Accepts a fixed number of `write` calls, then times out.
    struct FlakyChannel {
        wire: Vec<u8>,
        calls: usize,
        accepted: usize,
    }

    impl Write for FlakyChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls > self.accepted {
                return Err(io::Error::from(io::ErrorKind::TimedOut));
            }
            self.wire.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn line_goes_out_in_a_single_write() {
        let mut link = ActuatorLink::new("mem", FlakyChannel { wire: Vec::new(), calls: 0, accepted: usize::MAX });
        link.send(&MappedCommand::new(12, -34)).unwrap();

        assert_eq!(link.channel().calls, 1);
        assert_eq!(link.channel().wire, b"12,-34\n");
    }

    #[test]
    fn failed_write_leaves_no_fragment_on_the_wire() {
        let mut link = ActuatorLink::new("mem", FlakyChannel { wire: Vec::new(), calls: 0, accepted: 1 });
        link.send(&MappedCommand::new(12, -34)).unwrap();

        let err = link.send(&MappedCommand::new(7, 1)).unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(link.channel().wire, b"12,-34\n");
        assert_eq!(link.stats(), LinkStats { sent: 1, dropped: 1 });
    }

    #[test]
    fn closed_link_drops_commands() {
        let mut link = ActuatorLink::new("mem", Vec::new());
        link.close();
        assert!(link.is_closed());

        let err = link.send(&MappedCommand::new(1, 2)).unwrap_err();
        assert!(matches!(err, TransportError::Closed { .. }));
        assert!(link.channel().is_empty());
    }

    #[test]
    fn missing_port_is_a_channel_fault() {
        let settings = SerialSettings {
            port: "/dev/does-not-exist-tracker".to_string(),
            settle_ms: 0,
            ..SerialSettings::default()
        };

        let fault = ActuatorLink::open(&settings).err().unwrap();
        assert_eq!(fault.port, "/dev/does-not-exist-tracker");
        assert_eq!(fault.baud_rate, 115200);
    }
}
