use std::path::PathBuf;

use sheetflow_formula::FormulaFormatError;
use thiserror::Error;

/// Contract failures of spreadsheet operations.
///
/// Every variant leaves the spreadsheet exactly as it was before the call.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("invalid cell name: {0:?}")]
    InvalidName(String),

    #[error("no contents given for cell {0}")]
    NullContent(String),

    #[error("invalid formula: {0}")]
    FormulaFormat(#[from] FormulaFormatError),

    #[error("setting {0} would create a circular dependency")]
    CircularDependency(String),

    #[error("unable to access spreadsheet file {}: {source}", path.display())]
    ReadWrite {
        path: PathBuf,
        #[source]
        source: FileError,
    },
}

impl SpreadsheetError {
    pub(crate) fn read_write(path: impl Into<PathBuf>, source: impl Into<FileError>) -> Self {
        SpreadsheetError::ReadWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Underlying cause of a [`SpreadsheetError::ReadWrite`]
#[derive(Error, Debug)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed spreadsheet file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("version mismatch: expected {expected:?}, found {found:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("bad cell in file: {0}")]
    Cell(#[from] Box<SpreadsheetError>),
}

pub type Result<T> = std::result::Result<T, SpreadsheetError>;
