//! Dataset chunker
//!
//! Splits a large dataset into fixed-size chunk files so that printing can
//! be done a few hundred labels at a time, across sessions.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::DatasetSource;
use crate::error::{BatchError, BatchResult};

/// Contiguous slice of a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based sequence number
    pub number: usize,
    /// Row number of the first row in the original dataset
    pub first_row: usize,
    /// Rows of this chunk, numbered from 1 again
    pub source: DatasetSource,
}

impl Chunk {
    /// Row number in the original dataset of the last row
    pub fn last_row(&self) -> usize {
        self.first_row + self.source.len().saturating_sub(1)
    }
}

/// File name for a chunk, e.g. `split_part_07.csv`
pub fn chunk_file_name(number: usize) -> String {
    format!("split_part_{:02}.csv", number)
}

/// Split `source` into chunks of `chunk_size` rows
///
/// The last chunk may be shorter. An empty source yields no chunks.
pub fn split(source: &DatasetSource, chunk_size: usize) -> BatchResult<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(BatchError::InvalidChunkSize(chunk_size));
    }

    Ok(source
        .rows()
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, rows)| Chunk {
            number: i + 1,
            first_row: i * chunk_size + 1,
            source: DatasetSource::new(rows.to_vec()),
        })
        .collect())
}

/// Write chunks as CSV files under `output_dir`
///
/// Each line is the original row number followed by every original column.
/// Returns the written paths in chunk order.
pub fn write_chunks(chunks: &[Chunk], output_dir: &Path) -> BatchResult<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut paths = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let path = output_dir.join(chunk_file_name(chunk.number));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        for (offset, row) in chunk.source.rows().iter().enumerate() {
            let index = (chunk.first_row + offset).to_string();
            writer.write_record(
                std::iter::once(index.as_str()).chain(row.cells().iter().map(String::as_str)),
            )?;
        }
        writer.flush()?;

        info!(
            "Saved rows {}–{} to {}",
            chunk.first_row,
            chunk.last_row(),
            path.display()
        );
        paths.push(path);
    }

    info!(
        "✅ Done. {} files created in {}",
        paths.len(),
        output_dir.display()
    );
    Ok(paths)
}
