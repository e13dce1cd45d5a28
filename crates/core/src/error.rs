use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing one of the JSON documents.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistenceError {
    pub fn path(&self) -> &PathBuf {
        match self {
            PersistenceError::Read { path, .. }
            | PersistenceError::Malformed { path, .. }
            | PersistenceError::Write { path, .. } => path,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, PersistenceError::Malformed { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unrecognized time label '{0}': expected e.g. \"6:00 AM\" or \"06:00\"")]
    TimeLabel(String),
    #[error("row {row} is outside the schedule ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("no schedule row for {0}")]
    NoRowForTime(String),
}
