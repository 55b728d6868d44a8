//! # label-printer
//!
//! EZPL label printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - EZPL label command rendering
//! - ASCII wire encoding
//! - Serial printing (e.g. `/dev/ttyUSB0` at 9600 baud)
//! - Simulated printing for dry runs
//!
//! Business logic (WHAT to print) stays in application code:
//! - Row validation and batch ranges → label-batch
//!
//! ## Example
//!
//! ```ignore
//! use label_printer::{LabelRenderer, LabelTransport, SerialPrinter, SerialSettings};
//!
//! let renderer = LabelRenderer::default();
//! let epc = "00000001749121047830A347";
//! let label = renderer.render(epc, &format!("thuocsi.vn/qr/{}", epc));
//!
//! let printer = SerialPrinter::new(SerialSettings::default())?;
//! printer.deliver(&label)?;
//! ```

mod encoding;
mod error;
mod ezpl;
mod transport;

// Re-exports
pub use encoding::{encode_ascii, first_non_ascii};
pub use error::{PrintError, PrintResult};
pub use ezpl::{LabelCommand, LabelLayout, LabelRenderer};
pub use transport::{
    Delivery, LabelTransport, SerialPrinter, SerialSettings, SimulatedPrinter, Transport,
};
