//! The persistence boundary.
//!
//! Everything above the storage layer talks to a [`ComplaintGateway`] and
//! receives a [`GatewayError`] classification, so callers never inspect
//! backend error messages to decide what went wrong.

use thiserror::Error;

use crate::complaint::{ComplaintRecord, ComplaintRow};

/// Classified failure from the persistence gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The complaints table does not exist.
    #[error("the complaints table does not exist")]
    TableMissing,

    /// This gateway has no provisioning procedure.
    #[error("the table provisioning procedure is not available")]
    ProcedureUnavailable,

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

impl GatewayError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Storage operations the complaint pipeline depends on.
pub trait ComplaintGateway: Send {
    /// Insert one row, returning the assigned identifier.
    ///
    /// # Errors
    ///
    /// [`GatewayError::TableMissing`] if the table is not provisioned,
    /// [`GatewayError::Backend`] for any other failure.
    fn insert(&self, row: &ComplaintRow) -> GatewayResult<i64>;

    /// Every row, newest first.
    ///
    /// # Errors
    ///
    /// [`GatewayError::TableMissing`] if the table is not provisioned,
    /// [`GatewayError::Backend`] for any other failure.
    fn select_newest_first(&self) -> GatewayResult<Vec<ComplaintRecord>>;

    /// Count rows without fetching them; used to check that the table exists.
    ///
    /// # Errors
    ///
    /// [`GatewayError::TableMissing`] if the table is not provisioned,
    /// [`GatewayError::Backend`] for any other failure.
    fn probe(&self) -> GatewayResult<i64>;

    /// Run the provisioning procedure that creates the table.
    ///
    /// # Errors
    ///
    /// [`GatewayError::ProcedureUnavailable`] if there is no such procedure,
    /// [`GatewayError::Backend`] if it fails.
    fn provision(&self) -> GatewayResult<()>;
}
