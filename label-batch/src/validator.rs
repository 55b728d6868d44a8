//! Row validation
//!
//! Decides whether a row can be printed. Nothing here is fatal: any row
//! that does not yield both fields becomes a [`Validation::Skip`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::Row;

/// Column positions of the two label fields (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// EPC written to the RFID tag, column B
    pub identifier_column: usize,
    /// QR content, column E
    pub payload_column: usize,
    /// Cell values that mean "no value"
    pub missing_markers: Vec<String>,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            identifier_column: 1,
            payload_column: 4,
            missing_markers: ["NaN", "nan", "None", "null"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Identifier or payload empty / marked missing
    MissingFields,
    /// Row has fewer columns than the layout needs
    ShortRow { columns: usize, required: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingFields => f.write_str("missing EPC or QR"),
            SkipReason::ShortRow { columns, required } => {
                write!(f, "row has {} columns, need {}", columns, required)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation<'a> {
    Usable { identifier: &'a str, payload: &'a str },
    Skip(SkipReason),
}

#[derive(Debug, Clone, Default)]
pub struct RowValidator {
    layout: FieldLayout,
}

impl RowValidator {
    pub fn new(layout: FieldLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn validate<'a>(&self, row: &'a Row) -> Validation<'a> {
        let required = self.layout.identifier_column.max(self.layout.payload_column) + 1;
        if row.len() < required {
            return Validation::Skip(SkipReason::ShortRow {
                columns: row.len(),
                required,
            });
        }

        match (
            self.field(row, self.layout.identifier_column),
            self.field(row, self.layout.payload_column),
        ) {
            (Some(identifier), Some(payload)) => Validation::Usable {
                identifier,
                payload,
            },
            _ => Validation::Skip(SkipReason::MissingFields),
        }
    }

    fn field<'a>(&self, row: &'a Row, column: usize) -> Option<&'a str> {
        let value = row.cell(column)?.trim();
        if value.is_empty() || self.layout.missing_markers.iter().any(|m| m == value) {
            return None;
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_usable_row() {
        let v = RowValidator::default();
        let r = row(&["1", "EPC1", "", "", "QR1"]);
        assert_eq!(
            v.validate(&r),
            Validation::Usable {
                identifier: "EPC1",
                payload: "QR1"
            }
        );
    }

    #[test]
    fn test_missing_payload_is_skipped() {
        let v = RowValidator::default();
        let r = row(&["2", "EPC2", "", "", ""]);
        let Validation::Skip(reason) = v.validate(&r) else {
            panic!("expected skip");
        };
        assert_eq!(reason.to_string(), "missing EPC or QR");
    }

    #[test]
    fn test_missing_marker_is_skipped() {
        let v = RowValidator::default();
        for marker in ["NaN", "nan", "None", "null", "   "] {
            let r = row(&["3", marker, "", "", "QR3"]);
            assert_eq!(v.validate(&r), Validation::Skip(SkipReason::MissingFields));
        }
    }

    #[test]
    fn test_short_row_is_skipped() {
        let v = RowValidator::default();
        let r = row(&["4", "EPC4"]);
        assert_eq!(
            v.validate(&r),
            Validation::Skip(SkipReason::ShortRow {
                columns: 2,
                required: 5
            })
        );
    }

    #[test]
    fn test_custom_columns() {
        let v = RowValidator::new(FieldLayout {
            identifier_column: 0,
            payload_column: 1,
            missing_markers: Vec::new(),
        });
        let r = row(&["EPC", "QR"]);
        assert!(matches!(v.validate(&r), Validation::Usable { .. }));
    }
}
