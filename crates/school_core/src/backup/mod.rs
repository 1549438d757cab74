//! Backup, snapshot and flat-file export.
//!
//! # Responsibility
//! - Write CSV exports of the three entity collections.
//! - Produce transactionally consistent copies of the SQLite store.
//! - Dump and restore full school state as JSON.
//!
//! # Invariants
//! - Export targets are created or overwritten; nothing is merged.
//! - JSON load replaces the whole state.

mod csv_export;
mod json_file;
mod snapshot;

pub use csv_export::{
    export_csv, COURSES_CSV, COURSES_HEADER, INSTRUCTORS_CSV, INSTRUCTORS_HEADER, LIST_DELIMITER,
    STUDENTS_CSV, STUDENTS_HEADER,
};
pub use json_file::{load_from_file, save_to_file};
pub use snapshot::snapshot;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type BackupResult<T> = Result<T, BackupError>;

/// Errors from backup and export operations.
#[derive(Debug)]
pub enum BackupError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
    Db(DbError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Csv(err) => write!(f, "csv export failed: {err}"),
            Self::Json(err) => write!(f, "json (de)serialization failed: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<csv::Error> for BackupError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for BackupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackupError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> BackupError {
    let path = path.into();
    move |source| BackupError::Io { path, source }
}
