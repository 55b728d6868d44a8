//! Progress ledger
//!
//! Remembers, per source file, the first row that has not been printed yet.
//! The processor never reads this; the CLI consults it for `--resume` and
//! updates it after each run.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::BatchResult;
use crate::processor::{BatchReport, RowRange};

pub const LEDGER_FILE_NAME: &str = "progress.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// First row not yet printed (1-based)
    pub next_row: usize,
    pub printed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub updated_at: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    path: PathBuf,
    entries: BTreeMap<String, LedgerEntry>,
}

impl ProgressLedger {
    /// Open the ledger at `path`; a missing file is an empty ledger
    pub fn load(path: impl Into<PathBuf>) -> BatchResult<Self> {
        let path = path.into();
        let entries: BTreeMap<String, LedgerEntry> = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "Progress ledger loaded");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the next run for `source` should start
    pub fn next_row(&self, source: &str) -> usize {
        self.entries.get(source).map_or(1, |e| e.next_row)
    }

    pub fn entry(&self, source: &str) -> Option<&LedgerEntry> {
        self.entries.get(source)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Turn CLI range options into a row range for `source`
    ///
    /// `resume` starts at the recorded cursor instead of `start`. Without
    /// `end` or `count` the range runs to the end of the source.
    pub fn resolve_range(&self, source: &str, request: &RangeRequest) -> BatchResult<RowRange> {
        let start = if request.resume {
            self.next_row(source)
        } else {
            request.start.unwrap_or(1)
        };
        let end = match (request.end, request.count) {
            (Some(end), _) => end,
            (None, Some(count)) => start.saturating_add(count),
            (None, None) => usize::MAX,
        };
        RowRange::new(start, end)
    }

    /// Record a finished run
    ///
    /// The cursor advances to the end of the run, or only up to the first
    /// row whose delivery failed. It never moves back: re-printing an
    /// earlier range leaves it alone. Counts accumulate across runs.
    pub fn record(&mut self, source: &str, report: &BatchReport) {
        let reached = report
            .failed_rows()
            .first()
            .copied()
            .unwrap_or(report.range.end);
        let now = Local::now();
        let entry = self
            .entries
            .entry(source.to_string())
            .or_insert_with(|| LedgerEntry {
                next_row: 1,
                printed: 0,
                skipped: 0,
                failed: 0,
                updated_at: now,
            });
        entry.next_row = entry.next_row.max(reached);
        entry.printed += report.printed;
        entry.skipped += report.skipped;
        entry.failed += report.failed;
        entry.updated_at = now;
    }

    /// Write the ledger, replacing the previous file atomically
    pub fn save(&self) -> BatchResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Row range options as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub count: Option<usize>,
    pub resume: bool,
}

/// Ledger key for a source file
///
/// Files under `output_dir` are keyed by their path relative to it, so
/// `--chunk 3` and `--source output/split_part_03.csv` share a cursor.
/// Anything else is keyed by its full (canonical when it exists) path, so
/// same-named files in different directories never share one.
pub fn source_key(path: &Path, output_dir: &Path) -> String {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let output_dir =
        std::fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    match path.strip_prefix(&output_dir) {
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
