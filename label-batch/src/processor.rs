//! Batch range processor
//!
//! Prints one row range of a dataset: validate → render → deliver, row by
//! row, in file order. A bad row or a failed delivery is recorded and the
//! batch moves on; only an invalid range aborts the call.

use label_printer::{LabelRenderer, LabelTransport};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{error, info, instrument, warn};

use crate::dataset::DatasetSource;
use crate::error::{BatchError, BatchResult};
use crate::validator::{RowValidator, SkipReason, Validation};

/// 1-based row range, start inclusive, end exclusive
///
/// `(1, 11)` selects rows 1 through 10, like picking rows in a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> BatchResult<Self> {
        let range = Self { start, end };
        range.check()?;
        Ok(range)
    }

    /// Every row of a source with `len` rows
    pub fn all(len: usize) -> Self {
        Self {
            start: 1,
            end: len + 1,
        }
    }

    fn check(&self) -> BatchResult<()> {
        if self.start > self.end {
            return Err(BatchError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Fit the range to a source with `len` rows
    ///
    /// Row 0 does not exist and is read as row 1; `end` past the last row
    /// stops at the last row.
    pub fn clamp_to(&self, len: usize) -> Self {
        let end = self.end.min(len + 1);
        let start = self.start.max(1).min(end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row numbers covered by this range
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Printed { identifier: String },
    Skipped { reason: SkipReason },
    Failed { identifier: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// 1-based row number in the source
    pub row: usize,
    #[serde(flatten)]
    pub status: RowStatus,
}

/// Result of one [`BatchProcessor::process`] call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Range actually processed, after clamping
    pub range: RowRange,
    pub printed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    fn new(range: RowRange) -> Self {
        Self {
            range,
            printed: 0,
            skipped: 0,
            failed: 0,
            outcomes: Vec::with_capacity(range.len()),
        }
    }

    fn record(&mut self, row: usize, status: RowStatus) {
        match status {
            RowStatus::Printed { .. } => self.printed += 1,
            RowStatus::Skipped { .. } => self.skipped += 1,
            RowStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(RowOutcome { row, status });
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Row numbers whose delivery failed, for a targeted re-run
    pub fn failed_rows(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::Failed { .. }))
            .map(|o| o.row)
            .collect()
    }
}

/// Batch range processor
///
/// Stateless between calls: remembering which ranges were printed is the
/// caller's job (see [`ProgressLedger`](crate::ProgressLedger)).
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    validator: RowValidator,
    renderer: LabelRenderer,
}

impl BatchProcessor {
    pub fn new(validator: RowValidator, renderer: LabelRenderer) -> Self {
        Self {
            validator,
            renderer,
        }
    }

    /// Print `range` of `source` through `transport`
    ///
    /// Rows go out strictly in ascending order, one at a time. Calling this
    /// again with an overlapping range prints those labels again.
    #[instrument(skip_all, fields(start = range.start, end = range.end))]
    pub fn process<T>(
        &self,
        source: &DatasetSource,
        range: RowRange,
        transport: &T,
    ) -> BatchResult<BatchReport>
    where
        T: LabelTransport + ?Sized,
    {
        range.check()?;
        let range = range.clamp_to(source.len());
        let mut report = BatchReport::new(range);

        if range.is_empty() {
            info!("Nothing to print in rows {}..{}", range.start, range.end);
            return Ok(report);
        }

        info!(
            "📄 Processing rows {} to {} of {}",
            range.start,
            range.end - 1,
            source.len()
        );

        for (number, row) in range.rows().zip(&source.rows()[range.start - 1..range.end - 1]) {
            let (identifier, payload) = match self.validator.validate(row) {
                Validation::Usable {
                    identifier,
                    payload,
                } => (identifier, payload),
                Validation::Skip(reason) => {
                    warn!(row = number, %reason, "⚠️ Skipping row");
                    report.record(number, RowStatus::Skipped { reason });
                    continue;
                }
            };

            let label = self.renderer.render(identifier, payload);
            match transport.deliver(&label) {
                Ok(_) => {
                    info!(row = number, epc = identifier, "✅ Label sent");
                    report.record(
                        number,
                        RowStatus::Printed {
                            identifier: identifier.to_string(),
                        },
                    );
                }
                Err(e) => {
                    error!(
                        row = number,
                        epc = identifier,
                        error = %e,
                        "❌ Error sending label"
                    );
                    report.record(
                        number,
                        RowStatus::Failed {
                            identifier: identifier.to_string(),
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        info!(
            printed = report.printed,
            skipped = report.skipped,
            failed = report.failed,
            "Batch complete"
        );
        Ok(report)
    }
}
