//! The error type shared by every attendance operation.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Convenience alias for results carrying an [`AttendanceError`].
pub type Result<T, E = AttendanceError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AttendanceError {
    /// The store could not be created, opened, or seeded. The backing file has already been removed
    /// when this is returned, so the next attempt starts from scratch.
    #[error("failed to initialize attendance store: {0}")]
    Initialization(String),

    /// Bad input from the caller, such as an inverted date range or a missing selection.
    #[error("{0}")]
    Validation(String),

    /// Attendance has already been recorded for the requested slot.
    #[error("{0}")]
    DuplicateEntry(String),

    /// A faculty, subject, or section name did not resolve to a row.
    #[error("{kind} '{name}' not found")]
    Lookup { kind: &'static str, name: String },

    #[error("storage error: {0}")]
    Storage(#[source] DieselError),

    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AttendanceError {
    pub(crate) fn lookup(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
        }
    }
}

impl From<DieselError> for AttendanceError {
    /// Unique-constraint violations are reported as duplicates; everything else is a storage
    /// failure.
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::DuplicateEntry(format!("duplicate entry rejected: {}", info.message()))
            }
            other => Self::Storage(other),
        }
    }
}
