//! Tabular dataset source
//!
//! A dataset is a header-less CSV file read into memory in one go. Row order
//! is significant: row numbers are 1-based positions in the file.

use std::io;
use std::path::Path;
use tracing::info;

use crate::error::{BatchError, BatchResult};

/// One dataset row: an ordered list of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell at a 0-based column, `None` when the row is too short
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable, indexable sequence of rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSource {
    rows: Vec<Row>,
}

impl DatasetSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Load a CSV file
    ///
    /// A missing path is [`BatchError::SourceMissing`]; anything the CSV
    /// reader rejects is [`BatchError::LoadFailure`].
    pub fn load(path: &Path) -> BatchResult<Self> {
        if !path.exists() {
            return Err(BatchError::SourceMissing(path.to_path_buf()));
        }

        info!("Loading dataset: {}", path.display());
        let file = std::fs::File::open(path)?;
        let source = Self::from_reader(file).map_err(|source| BatchError::LoadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Total rows loaded: {}", source.len());

        Ok(source)
    }

    /// Parse header-less CSV from any reader
    ///
    /// Rows may have different widths; cells are trimmed.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().collect::<Row>()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row by 1-based row number
    pub fn row(&self, number: usize) -> Option<&Row> {
        number.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }
}
