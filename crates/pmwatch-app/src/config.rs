use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use pmwatch_core::{AcquisitionConfig, SerialConfig};
use pmwatch_decode::{ChecksumPolicy, FRAME_LEN};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub serial: SerialSection,
    pub http: HttpSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSection {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    pub baud_rate: u32,
    pub chunk_size: usize,
    pub read_timeout_ms: u64,
    pub cycle_delay_ms: u64,
    pub checksum: ChecksumPolicy,
}

impl Default for SerialSection {
    fn default() -> Self {
        let acq = AcquisitionConfig::default();
        Self {
            port: String::new(),
            baud_rate: SerialConfig::default().baud_rate,
            chunk_size: acq.chunk_size,
            read_timeout_ms: acq.read_timeout.as_millis() as u64,
            cycle_delay_ms: acq.cycle_delay.as_millis() as u64,
            checksum: acq.checksum,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub addr: SocketAddr,
    /// How long startup waits for the serial link before giving up.
    pub startup_timeout_ms: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            startup_timeout_ms: 10_000,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port_name: self.serial.port.clone(),
            baud_rate: self.serial.baud_rate,
            ..Default::default()
        }
    }

    pub fn acquisition_config(&self) -> AcquisitionConfig {
        AcquisitionConfig {
            chunk_size: self.serial.chunk_size.max(FRAME_LEN),
            read_timeout: Duration::from_millis(self.serial.read_timeout_ms),
            cycle_delay: Duration::from_millis(self.serial.cycle_delay_ms),
            checksum: self.serial.checksum,
        }
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.http.startup_timeout_ms)
    }
}
