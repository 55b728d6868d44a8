//! Label Batch - prints EZPL labels from a CSV dataset in row ranges
//!
//! # Overview
//!
//! - **Dataset** (`dataset`): header-less CSV loaded wholesale into memory
//! - **Validation** (`validator`): picks identifier/payload cells, skips bad rows
//! - **Processing** (`processor`): renders and dispatches one row range
//! - **Chunking** (`chunker`): splits a dataset into numbered chunk files
//! - **Progress** (`ledger`): remembers where each source left off
//!
//! # Layout
//!
//! ```text
//! label-batch/src/
//! ├── config.rs      # environment configuration
//! ├── logger.rs      # file + console tracing setup
//! ├── error.rs       # BatchError
//! ├── dataset.rs     # DatasetSource, Row
//! ├── validator.rs   # RowValidator
//! ├── processor.rs   # BatchProcessor, BatchReport
//! ├── chunker.rs     # split / write_chunks
//! ├── ledger.rs      # ProgressLedger
//! └── main.rs        # CLI
//! ```

pub mod chunker;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ledger;
pub mod logger;
pub mod processor;
pub mod validator;

pub use chunker::{Chunk, chunk_file_name, split, write_chunks};
pub use config::Config;
pub use dataset::{DatasetSource, Row};
pub use error::{BatchError, BatchResult};
pub use ledger::{ProgressLedger, RangeRequest, source_key};
pub use logger::init_logger;
pub use processor::{BatchProcessor, BatchReport, RowOutcome, RowRange, RowStatus};
pub use validator::{FieldLayout, RowValidator, SkipReason, Validation};
