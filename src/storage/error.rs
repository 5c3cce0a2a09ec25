use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ValidationError;

/// A table file could not be read, written, or understood.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Table file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Malformed row in {} at line {line}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        #[source]
        source: ValidationError,
    },
}

/// Every failure the ledger store reports to its callers.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{table} record not found: {id}")]
    NotFound { table: &'static str, id: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
