//! Error types for guruwali.
//!
//! This module defines all error types used throughout the guruwali crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for guruwali operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored row could not be decoded into a record.
    #[error("corrupt {table} row {id}: {message}")]
    CorruptRow {
        /// Table the row came from.
        table: &'static str,
        /// Identifier of the offending row.
        id: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Journal Errors ===
    /// A counseling log referenced a student that does not exist.
    ///
    /// The submission is refused and no log is created.
    #[error("no student with id '{student_id}'; counseling log not recorded")]
    UnknownStudent {
        /// The unresolved student reference.
        student_id: String,
    },

    /// A student lookup by id failed.
    #[error("student not found: {id}")]
    StudentNotFound {
        /// The requested id.
        id: String,
    },

    /// A counseling log lookup by id failed.
    #[error("counseling log not found: {id}")]
    LogNotFound {
        /// The requested id.
        id: String,
    },

    /// A record with the same id already exists.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// Kind of record ("student" or "counseling log").
        kind: &'static str,
        /// The clashing id.
        id: String,
    },

    /// A field value could not be parsed.
    #[error("invalid {field}: '{value}' (expected {expected})")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// Human readable description of accepted values.
        expected: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an exported document.
    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for guruwali operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(
        field: &'static str,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error is a refused counseling log submission.
    #[must_use]
    pub fn is_unknown_student(&self) -> bool {
        matches!(self, Self::UnknownStudent { .. })
    }

    /// Check if this error is a failed lookup.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StudentNotFound { .. } | Self::LogNotFound { .. })
    }
}
