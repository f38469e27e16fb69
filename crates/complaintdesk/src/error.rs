//! Error types for complaintdesk.
//!
//! Two families live here. [`Error`] covers infrastructure failures (opening
//! the database, loading configuration, binding the server). [`IntakeError`]
//! and [`ProvisionError`] are the outcomes of the complaint pipeline itself;
//! they are returned as data and rendered by the web layer, never propagated
//! as faults.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for complaintdesk infrastructure operations.
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

    // === Server Errors ===
    /// The HTTP listener could not be bound.
    #[error("failed to bind server to {addr}: {source}")]
    ServerBind {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === QR Errors ===
    /// The QR encoder rejected the input.
    #[error("failed to encode QR code: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

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

}

/// A specialized Result type for complaintdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

/// Failure outcomes of submitting or listing complaints.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntakeError {
    /// One or more fields failed validation. Nothing was written.
    #[error("{0}")]
    #[serde(rename = "validation_error")]
    Validation(ValidationErrors),

    /// The complaints table has not been provisioned.
    #[error("The complaints table doesn't exist yet. Please visit the admin page to set up the database.")]
    SchemaMissing,

    /// Any other storage failure, surfaced verbatim.
    #[error("{message}")]
    #[serde(rename = "persistence_error")]
    Persistence {
        /// Message reported by the storage layer.
        message: String,
    },
}

impl IntakeError {
    /// Create a persistence error.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Field violations, if this is a validation failure.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for IntakeError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Table provisioning failed; the operator has to create the table by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProvisionError {
    /// Guidance shown to the operator.
    pub message: String,
}

impl ProvisionError {
    /// Guidance used when the provisioning procedure cannot create the table.
    pub const MANUAL_SETUP: &'static str =
        "Could not automatically create the table. Please follow the instructions to create it manually.";

    /// Create a provisioning error with the given guidance.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The standard manual-setup guidance.
    #[must_use]
    pub fn manual_setup() -> Self {
        Self::new(Self::MANUAL_SETUP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Field, FieldViolation};

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("bind address is empty");
        assert!(err.to_string().contains("bind address is empty"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_server_bind_error_display() {
        let err = Error::ServerBind {
            addr: SocketAddr::from(([127, 0, 0, 1], 80)),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:80"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_schema_missing_message_points_to_admin() {
        let err = IntakeError::SchemaMissing;
        assert!(err.to_string().contains("admin page"));
    }

    #[test]
    fn test_persistence_error_is_verbatim() {
        let err = IntakeError::persistence("disk I/O error");
        assert_eq!(err.to_string(), "disk I/O error");
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn test_validation_error_exposes_fields() {
        let errors = ValidationErrors::from(vec![FieldViolation::new(
            Field::Email,
            "Invalid email address",
        )]);
        let err = IntakeError::from(errors);
        let fields = err.validation_errors().unwrap();
        assert!(fields.contains(Field::Email));
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_intake_error_serializes_tagged() {
        let json = serde_json::to_value(IntakeError::SchemaMissing).unwrap();
        assert_eq!(json["status"], "schema_missing");

        let json = serde_json::to_value(IntakeError::persistence("boom")).unwrap();
        assert_eq!(json["status"], "persistence_error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_provision_error_manual_setup() {
        let err = ProvisionError::manual_setup();
        assert!(err.to_string().contains("manually"));
    }
}
