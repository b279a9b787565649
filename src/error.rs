use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading a city's trip file. Always fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("trip data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("trip data is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}: cannot parse '{value}' in column '{column}' as a timestamp")]
    BadTimestamp {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: {message}")]
    BadRow { row: usize, message: String },
}

/// A reporter could not compute its statistics over the filtered trips.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("no trips to summarise")]
    EmptyDataset,

    #[error("trip data has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("column '{0}' holds no values")]
    EmptyColumn(&'static str),

    #[error("trip durations overflow the supported range")]
    DurationOverflow,
}

/// Errors raised by the interactive console.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
