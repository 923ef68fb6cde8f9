use std::collections::BTreeMap;

use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialPortInfo,
    SerialPortType, SerialStream, StopBits,
};
use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Serial device most PI30 boards are wired to on a Raspberry Pi header.
pub const DEFAULT_PORT: &str = "/dev/ttyAMA0";

/// PI30 firmware talks at a fixed 2400 baud; there is no negotiation.
pub const DEFAULT_BAUD_RATE: u32 = 2400;

/// Serial line settings.
///
/// Defaults match the inverter's fixed line discipline: 2400 baud, 8 data
/// bits, no parity, one stop bit, no flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub path: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Discard whatever the driver buffered before the port was opened.
    pub clear_on_open: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            clear_on_open: true,
        }
    }
}

impl SerialConfig {
    /// Settings for `path` with every other field at its default.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// Open the serial device described by `config`.
///
/// Must be called from within a tokio runtime; the returned stream is
/// registered with the runtime's reactor.
pub fn open(config: &SerialConfig) -> Result<SerialStream> {
    let stream = tokio_serial::new(&config.path, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .map_err(|source| TransportError::Open {
            path: config.path.clone(),
            source,
        })?;

    if config.clear_on_open {
        stream
            .clear(ClearBuffer::All)
            .map_err(TransportError::Configure)?;
        debug!(path = %config.path, "cleared serial buffers");
    }

    info!(path = %config.path, baud = config.baud_rate, "opened serial port");
    Ok(stream)
}

/// Information about an available serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g. `/dev/ttyUSB0`).
    pub name: String,
    /// USB vendor ID, for USB adapters.
    pub vid: Option<u16>,
    /// USB product ID, for USB adapters.
    pub pid: Option<u16>,
    /// Product string reported by the adapter.
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (vid, pid, product) = match info.port_type {
            SerialPortType::UsbPort(usb) => (Some(usb.vid), Some(usb.pid), usb.product),
            _ => (None, None, None),
        };
        Self {
            name: info.port_name,
            vid,
            pid,
            product,
        }
    }
}

/// List serial ports visible to the OS, sorted by name with duplicates removed.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = tokio_serial::available_ports().map_err(TransportError::Enumerate)?;
    Ok(dedup_sorted(ports.into_iter().map(PortInfo::from)))
}

fn dedup_sorted(ports: impl IntoIterator<Item = PortInfo>) -> Vec<PortInfo> {
    let mut by_name = BTreeMap::new();
    for port in ports {
        by_name.entry(port.name.clone()).or_insert(port);
    }
    by_name.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str) -> PortInfo {
        PortInfo {
            name: name.to_string(),
            vid: None,
            pid: None,
            product: None,
        }
    }

    #[test]
    fn default_config_matches_inverter_line() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.path, "/dev/ttyAMA0");
        assert_eq!(cfg.baud_rate, 2400);
        assert!(cfg.clear_on_open);
    }

    #[test]
    fn builder_overrides_path_and_baud() {
        let cfg = SerialConfig::new("/dev/ttyUSB0").with_baud_rate(9600);
        assert_eq!(cfg.path, "/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 9600);
    }

    #[test]
    fn port_listing_is_sorted_and_unique() {
        let ports = dedup_sorted(vec![
            port("/dev/ttyUSB1"),
            port("/dev/ttyAMA0"),
            port("/dev/ttyUSB1"),
            port("/dev/ttyUSB0"),
        ]);
        let names: Vec<&str> = ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["/dev/ttyAMA0", "/dev/ttyUSB0", "/dev/ttyUSB1"]);
    }

    #[tokio::test]
    async fn open_missing_device_reports_path() {
        let cfg = SerialConfig::new("/dev/pi30-test-does-not-exist");
        let err = open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::Open { ref path, .. } if path == &cfg.path));
        assert!(err.to_string().contains("/dev/pi30-test-does-not-exist"));
    }
}
