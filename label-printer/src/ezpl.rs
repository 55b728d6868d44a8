//! EZPL label command renderer
//!
//! Renders one RFID + QR label per (identifier, payload) pair. The command
//! skeleton is fixed; only the page setup values in [`LabelLayout`] and the
//! two data lines vary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page setup for a label
///
/// The default matches the 24mm RFID stock the printer is loaded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout {
    /// Label height in mm (`^Q` first argument)
    pub height_mm: f32,
    /// Gap between labels in mm (`^Q` second argument)
    pub gap_mm: f32,
    /// Label width in mm (`^W`)
    pub width_mm: u32,
    /// Copies per label (`^C`)
    pub copies: u32,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            height_mm: 16.0,
            gap_mm: 10.0,
            width_mm: 24,
            copies: 1,
        }
    }
}

/// A rendered label command block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelCommand {
    text: String,
}

impl LabelCommand {
    /// Command text as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Command bytes (UTF-8; the transport enforces ASCII)
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for LabelCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// EZPL command builder
///
/// Every directive sits on its own line, terminated by `\n`.
struct EzplBuilder {
    buf: String,
}

impl EzplBuilder {
    fn new() -> Self {
        // Blank first line: the printer ignores it, the stock template has it
        Self {
            buf: String::from("\n"),
        }
    }

    fn line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self.buf.push('\n');
        self
    }

    fn build(self) -> LabelCommand {
        LabelCommand { text: self.buf }
    }
}

/// Label renderer
///
/// Pure and deterministic: the same inputs always yield the same bytes.
#[derive(Debug, Clone, Default)]
pub struct LabelRenderer {
    layout: LabelLayout,
}

impl LabelRenderer {
    pub fn new(layout: LabelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LabelLayout {
        &self.layout
    }

    /// Render a label for one item
    ///
    /// `identifier` is written to the RFID tag (EPC, hex), `payload` is
    /// encoded as the QR code.
    pub fn render(&self, identifier: &str, payload: &str) -> LabelCommand {
        let mut b = EzplBuilder::new();
        self.render_setup(&mut b);
        self.render_body(&mut b, identifier, payload);
        b.build()
    }

    fn render_setup(&self, b: &mut EzplBuilder) {
        let l = &self.layout;
        b.line("^AT")
            .line("^O0")
            .line("^D0")
            .line(&format!("^C{}", l.copies))
            .line("^P1")
            .line(&format!("^Q{:.1},{:.1}", l.height_mm, l.gap_mm))
            .line(&format!("^W{}", l.width_mm))
            .line("^L");
    }

    fn render_body(&self, b: &mut EzplBuilder, identifier: &str, payload: &str) {
        // RFID write: hex data, start block 2, 24 hex digits (96-bit EPC)
        b.line(&format!("RFW,H,2,24,1,{}", identifier));
        // QR code at (64,45), cell size 5, mode 2, ECC L, mask 3
        b.line("W64,45,5,2,L,3,3,38,0")
            .line(payload)
            .line("E");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPC: &str = "00000001749121047830A347";
    const QR: &str = "thuocsi.vn/qr/00000001749121047830A347";

    #[test]
    fn test_default_template_is_byte_exact() {
        let label = LabelRenderer::default().render(EPC, QR);
        let expected = "\n^AT\n^O0\n^D0\n^C1\n^P1\n^Q16.0,10.0\n^W24\n^L\n\
                        RFW,H,2,24,1,00000001749121047830A347\n\
                        W64,45,5,2,L,3,3,38,0\n\
                        thuocsi.vn/qr/00000001749121047830A347\n\
                        E\n";
        assert_eq!(label.as_str(), expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let r = LabelRenderer::default();
        assert_eq!(r.render(EPC, QR), r.render(EPC, QR));
        assert_ne!(r.render(EPC, QR), r.render("X", QR));
    }

    #[test]
    fn test_custom_layout() {
        let r = LabelRenderer::new(LabelLayout {
            gap_mm: 3.0,
            ..LabelLayout::default()
        });
        let label = r.render(EPC, QR);
        assert!(label.as_str().contains("^Q16.0,3.0\n"));
        assert!(label.as_str().ends_with("\nE\n"));
    }

    #[test]
    fn test_layout_deserializes_from_json() {
        let layout: LabelLayout = serde_json::from_str(
            r#"{"height_mm":16.0,"gap_mm":3.0,"width_mm":24,"copies":2}"#,
        )
        .unwrap();
        let label = LabelRenderer::new(layout).render("A", "B");
        assert!(label.as_str().contains("^C2\n"));
    }
}
