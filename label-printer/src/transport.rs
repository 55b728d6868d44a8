//! Transport adapters for sending EZPL labels
//!
//! Supports:
//! - Serial printers (USB-serial adapter, raw EZPL)
//! - Simulated printing (log only, for dry runs)

use crate::encoding::encode_ascii;
use crate::error::{PrintError, PrintResult};
use crate::ezpl::LabelCommand;
use enum_dispatch::enum_dispatch;
use parking_lot::Mutex;
use serialport::SerialPort;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Acknowledgement for a delivered label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Bytes handed to the device (or that would have been)
    pub bytes: usize,
    pub simulated: bool,
}

/// Trait for label transports
#[enum_dispatch]
pub trait LabelTransport {
    /// Send one rendered label
    fn deliver(&self, label: &LabelCommand) -> PrintResult<Delivery>;
}

/// Transport chosen once per process
#[enum_dispatch(LabelTransport)]
#[derive(Debug)]
pub enum Transport {
    Simulated(SimulatedPrinter),
    Serial(SerialPrinter),
}

impl Transport {
    pub fn is_simulated(&self) -> bool {
        matches!(self, Transport::Simulated(_))
    }
}

/// Simulated printer
///
/// Logs each label and, unless built with [`logging_only`], keeps a copy
/// for inspection. Never fails.
///
/// [`logging_only`]: SimulatedPrinter::logging_only
#[derive(Debug)]
pub struct SimulatedPrinter {
    delivered: Mutex<Vec<LabelCommand>>,
    keep: bool,
}

impl Default for SimulatedPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPrinter {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            keep: true,
        }
    }

    /// Log labels without keeping them, for long dry runs
    pub fn logging_only() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            keep: false,
        }
    }

    /// Labels kept so far, in order
    pub fn delivered(&self) -> Vec<LabelCommand> {
        self.delivered.lock().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().len()
    }
}

impl LabelTransport for SimulatedPrinter {
    fn deliver(&self, label: &LabelCommand) -> PrintResult<Delivery> {
        info!(
            "\n==== SIMULATED EZPL ====\n{}\n========================",
            label
        );
        if self.keep {
            self.delivered.lock().push(label.clone());
        }
        Ok(Delivery {
            bytes: label.len(),
            simulated: true,
        })
    }
}

/// Serial link settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`
    pub device: String,
    pub baud_rate: u32,
    /// Read/write timeout on the port
    pub timeout: Duration,
    /// Pause after each successful write so the printer buffer can drain
    pub post_send_delay: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
            post_send_delay: Duration::from_millis(50),
        }
    }
}

/// Serial printer
///
/// The port is opened for each label and closed when the handle drops,
/// on success and on every error path.
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    settings: SerialSettings,
}

impl SerialPrinter {
    pub fn new(settings: SerialSettings) -> PrintResult<Self> {
        if settings.device.trim().is_empty() {
            return Err(PrintError::InvalidConfig("Empty device path".to_string()));
        }
        if settings.baud_rate == 0 {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid baud rate for {}: 0",
                settings.device
            )));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn open(&self) -> PrintResult<Box<dyn SerialPort>> {
        serialport::new(self.settings.device.as_str(), self.settings.baud_rate)
            .timeout(self.settings.timeout)
            .open()
            .map_err(|e| PrintError::Connection(format!("{}: {}", self.settings.device, e)))
    }

    fn write_label(&self, data: &[u8]) -> PrintResult<()> {
        let mut port = self.open()?;
        debug!("Port open, sending {} bytes", data.len());

        port.write_all(data)
            .map_err(|e| self.io_error("Write failed", e))?;
        port.flush().map_err(|e| self.io_error("Flush failed", e))?;
        Ok(())
    }

    fn io_error(&self, what: &str, e: io::Error) -> PrintError {
        if e.kind() == io::ErrorKind::TimedOut {
            return PrintError::Timeout(format!("{}: {}", self.settings.device, what));
        }
        PrintError::Io(io::Error::new(e.kind(), format!("{}: {}", what, e)))
    }
}

impl LabelTransport for SerialPrinter {
    #[instrument(skip(self, label), fields(device = %self.settings.device, data_len = label.len()))]
    fn deliver(&self, label: &LabelCommand) -> PrintResult<Delivery> {
        let data = encode_ascii(label.as_str())?;
        self.write_label(&data)?;

        std::thread::sleep(self.settings.post_send_delay);

        Ok(Delivery {
            bytes: data.len(),
            simulated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ezpl::LabelRenderer;

    #[test]
    fn test_simulated_records_labels() {
        let printer = SimulatedPrinter::new();
        let label = LabelRenderer::default().render("EPC1", "QR1");

        let ack = printer.deliver(&label).unwrap();
        assert!(ack.simulated);
        assert_eq!(ack.bytes, label.len());
        assert_eq!(printer.delivered(), vec![label]);
    }

    #[test]
    fn test_logging_only_keeps_nothing() {
        let printer = SimulatedPrinter::logging_only();
        let renderer = LabelRenderer::default();

        for i in 0..1000 {
            let label = renderer.render(&format!("EPC{}", i), "QR");
            let ack = printer.deliver(&label).unwrap();
            assert!(ack.simulated);
            assert_eq!(ack.bytes, label.len());
        }
        assert_eq!(printer.delivered_count(), 0);
        assert!(printer.delivered().is_empty());
    }

    #[test]
    fn test_transport_dispatches_to_simulated() {
        let transport: Transport = SimulatedPrinter::new().into();
        assert!(transport.is_simulated());

        let label = LabelRenderer::default().render("EPC1", "QR1");
        assert!(transport.deliver(&label).is_ok());
    }

    #[test]
    fn test_serial_rejects_bad_config() {
        let empty = SerialSettings {
            device: " ".to_string(),
            ..SerialSettings::default()
        };
        assert!(matches!(
            SerialPrinter::new(empty),
            Err(PrintError::InvalidConfig(_))
        ));

        let zero_baud = SerialSettings {
            baud_rate: 0,
            ..SerialSettings::default()
        };
        assert!(SerialPrinter::new(zero_baud).is_err());
    }

    #[test]
    fn test_serial_missing_device_is_connection_error() {
        let printer = SerialPrinter::new(SerialSettings {
            device: "/dev/does-not-exist-label-printer".to_string(),
            post_send_delay: Duration::ZERO,
            ..SerialSettings::default()
        })
        .unwrap();

        let label = LabelRenderer::default().render("EPC1", "QR1");
        let err = printer.deliver(&label).unwrap_err();
        assert!(matches!(err, PrintError::Connection(_)));
    }

    #[test]
    fn test_serial_rejects_non_ascii_before_opening() {
        let printer = SerialPrinter::new(SerialSettings {
            device: "/dev/does-not-exist-label-printer".to_string(),
            ..SerialSettings::default()
        })
        .unwrap();

        let label = LabelRenderer::default().render("EPC1", "qr/ü");
        assert!(matches!(
            printer.deliver(&label),
            Err(PrintError::Encoding(_))
        ));
    }
}
