use label_printer::{
    LabelLayout, LabelRenderer, PrintResult, SerialPrinter, SerialSettings, SimulatedPrinter,
    Transport,
};
use std::path::PathBuf;
use std::time::Duration;

use crate::validator::{FieldLayout, RowValidator};

/// Batch printing configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (or a `.env` file):
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | LABEL_INPUT_FILE | input/labels.csv | Full dataset to split |
/// | LABEL_OUTPUT_DIR | output | Chunk files and progress ledger |
/// | LABEL_ROWS_PER_FILE | 1000 | Rows per chunk file |
/// | LABEL_SIMULATE | false | Log labels instead of printing |
/// | LABEL_DEVICE | /dev/ttyUSB0 | Serial device path |
/// | LABEL_BAUD_RATE | 9600 | Serial baud rate |
/// | LABEL_TIMEOUT_MS | 1000 | Serial read/write timeout |
/// | LABEL_POST_SEND_DELAY_MS | 50 | Pause after each label |
/// | LABEL_GAP_MM | 10.0 | Gap between labels |
/// | LABEL_LOG_DIR | logs | Log file directory |
///
/// # Example
///
/// ```ignore
/// LABEL_SIMULATE=true LABEL_DEVICE=/dev/ttyUSB1 label-batch print --chunk 3
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub rows_per_file: usize,
    /// Dry run: labels go to the log only
    pub simulate: bool,
    pub device: String,
    pub baud_rate: u32,
    pub timeout_ms: u64,
    pub post_send_delay_ms: u64,
    pub layout: LabelLayout,
    pub fields: FieldLayout,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("input/labels.csv"),
            output_dir: PathBuf::from("output"),
            rows_per_file: 1000,
            simulate: false,
            device: "/dev/ttyUSB0".into(),
            baud_rate: 9600,
            timeout_ms: 1000,
            post_send_delay_ms: 50,
            layout: LabelLayout::default(),
            fields: FieldLayout::default(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input_file: env_or("LABEL_INPUT_FILE", defaults.input_file),
            output_dir: env_or("LABEL_OUTPUT_DIR", defaults.output_dir),
            rows_per_file: env_or("LABEL_ROWS_PER_FILE", defaults.rows_per_file),
            simulate: env_or("LABEL_SIMULATE", defaults.simulate),
            device: env_or("LABEL_DEVICE", defaults.device),
            baud_rate: env_or("LABEL_BAUD_RATE", defaults.baud_rate),
            timeout_ms: env_or("LABEL_TIMEOUT_MS", defaults.timeout_ms),
            post_send_delay_ms: env_or("LABEL_POST_SEND_DELAY_MS", defaults.post_send_delay_ms),
            layout: LabelLayout {
                gap_mm: env_or("LABEL_GAP_MM", defaults.layout.gap_mm),
                ..defaults.layout
            },
            fields: defaults.fields,
            log_dir: env_or("LABEL_LOG_DIR", defaults.log_dir),
        }
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
            post_send_delay: Duration::from_millis(self.post_send_delay_ms),
        }
    }

    pub fn renderer(&self) -> LabelRenderer {
        LabelRenderer::new(self.layout.clone())
    }

    pub fn validator(&self) -> RowValidator {
        RowValidator::new(self.fields.clone())
    }

    /// Build the transport for this process
    ///
    /// Decided once; every row of every batch goes through the same one.
    pub fn transport(&self) -> PrintResult<Transport> {
        if self.simulate {
            return Ok(SimulatedPrinter::logging_only().into());
        }
        Ok(SerialPrinter::new(self.serial_settings())?.into())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use label_printer::LabelTransport;

    #[test]
    fn test_defaults_match_printer_setup() {
        let config = Config::default();
        let serial = config.serial_settings();
        assert_eq!(serial.device, "/dev/ttyUSB0");
        assert_eq!(serial.baud_rate, 9600);
        assert_eq!(serial.post_send_delay, Duration::from_millis(50));
        assert_eq!(config.rows_per_file, 1000);
    }

    #[test]
    fn test_simulate_builds_simulated_transport() {
        let config = Config {
            simulate: true,
            ..Config::default()
        };
        assert!(config.transport().unwrap().is_simulated());

        let config = Config {
            simulate: false,
            ..Config::default()
        };
        assert!(!config.transport().unwrap().is_simulated());
    }

    #[test]
    fn test_simulated_run_does_not_keep_labels() {
        let config = Config {
            simulate: true,
            ..Config::default()
        };
        let label = config.renderer().render("EPC1", "QR1");
        match config.transport().unwrap() {
            Transport::Simulated(printer) => {
                printer.deliver(&label).unwrap();
                assert_eq!(printer.delivered_count(), 0);
            }
            Transport::Serial(_) => panic!("expected simulated transport"),
        }
    }

    #[test]
    fn test_serial_transport_rejects_empty_device() {
        let config = Config {
            device: String::new(),
            ..Config::default()
        };
        assert!(config.transport().is_err());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        // SAFETY: variable name is unique to this test
        unsafe { std::env::set_var("LABEL_TEST_ENV_OR_GARBAGE", "not-a-number") };
        assert_eq!(env_or("LABEL_TEST_ENV_OR_GARBAGE", 7usize), 7);
        unsafe { std::env::set_var("LABEL_TEST_ENV_OR_GARBAGE", " 42 ") };
        assert_eq!(env_or("LABEL_TEST_ENV_OR_GARBAGE", 7usize), 42);
    }
}
