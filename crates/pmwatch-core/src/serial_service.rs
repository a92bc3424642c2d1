use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::time::Duration;

use crate::error::{Error, Result};

/// A port as shown by `--list-ports`.
#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: &'static str,
    /// USB vendor/product id, when the port is a USB adapter.
    pub usb_id: Option<(u16, u16)>,
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (port_type, usb_id, product) = match info.port_type {
            SerialPortType::UsbPort(usb) => ("USB", Some((usb.vid, usb.pid)), usb.product),
            SerialPortType::PciPort => ("PCI", None, None),
            SerialPortType::BluetoothPort => ("Bluetooth", None, None),
            SerialPortType::Unknown => ("Unknown", None, None),
        };
        Self {
            port_name: info.port_name,
            port_type,
            usb_id,
            product,
        }
    }
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.port_name, self.port_type)?;
        if let Some((vid, pid)) = self.usb_id {
            write!(f, " {vid:04X}:{pid:04X}")?;
        }
        if let Some(product) = &self.product {
            write!(f, " {product}")?;
        }
        Ok(())
    }
}

/// Line settings for the sensor UART. The sensor talks 9600 8N1 without flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub parity: serialport::Parity,
    pub stop_bits: serialport::StopBits,
    pub flow_control: serialport::FlowControl,
    /// Per-read timeout handed to the driver.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: 9_600,
            data_bits: serialport::DataBits::Eight,
            parity: serialport::Parity::None,
            stop_bits: serialport::StopBits::One,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Something the acquisition loop can (re)open to get a byte stream.
pub trait ByteSource: Send {
    type Port: std::io::Read + Send;

    fn open(&mut self) -> Result<Self::Port>;

    /// Name used in log lines.
    fn describe(&self) -> String;
}

pub struct SerialService;

impl SerialService {
    pub fn list_ports() -> Vec<PortInfo> {
        serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(PortInfo::from)
            .collect()
    }

    pub fn open(cfg: &SerialConfig) -> Result<Box<dyn SerialPort>> {
        serialport::new(&cfg.port_name, cfg.baud_rate)
            .data_bits(cfg.data_bits)
            .parity(cfg.parity)
            .stop_bits(cfg.stop_bits)
            .flow_control(cfg.flow_control)
            .timeout(cfg.timeout)
            .open()
            .map_err(|source| Error::Open {
                port: cfg.port_name.clone(),
                source,
            })
    }
}

impl ByteSource for SerialConfig {
    type Port = Box<dyn SerialPort>;

    fn open(&mut self) -> Result<Self::Port> {
        SerialService::open(self)
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.port_name, self.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn usb_adapter_listing() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyUSB0".into(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x1A86,
                pid: 0x7523,
                serial_number: None,
                manufacturer: None,
                product: Some("USB Serial".into()),
            }),
        };
        let port = PortInfo::from(info);
        assert_eq!(port.usb_id, Some((0x1A86, 0x7523)));
        assert_eq!(port.to_string(), "/dev/ttyUSB0 [USB] 1A86:7523 USB Serial");
    }

    #[test]
    fn plain_port_listing() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyS0".into(),
            port_type: SerialPortType::Unknown,
        };
        assert_eq!(PortInfo::from(info).to_string(), "/dev/ttyS0 [Unknown]");
    }
}
