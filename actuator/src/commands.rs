use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail};

/// Target position in actuator units, one value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedCommand {
    pub x: i32,
    pub y: i32,
}

impl MappedCommand {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Wire form: `"<x>,<y>\n"`.
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for MappedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for MappedCommand {
    type Err = anyhow::Error;

    // Accepts a line with or without its newline
    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let (x, y) = line
            .split_once(',')
            .ok_or(anyhow!("Command line {line:?} has no comma"))?;
        if y.contains(',') {
            bail!("Command line {line:?} has more than two values");
        }

        Ok(MappedCommand::new(x.parse()?, y.parse()?))
    }
}
