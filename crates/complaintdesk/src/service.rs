//! The complaint pipeline: submit, list, provision.
//!
//! Each operation takes a [`ComplaintGateway`] and returns its outcome as
//! data. Callers (the web handlers and the CLI) decide how to render it.

use tracing::{debug, error, info, warn};

use crate::complaint::{ComplaintCandidate, ComplaintRecord};
use crate::error::{IntakeError, ProvisionError};
use crate::storage::{ComplaintGateway, GatewayError};
use crate::validation;

/// Result of a successful [`ensure_table`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The table was already there; nothing was done.
    AlreadyExists,
    /// The provisioning procedure created the table.
    Created,
}

impl ProvisionOutcome {
    /// Operator-facing summary.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::AlreadyExists => "Table already exists",
            Self::Created => "Complaints table created",
        }
    }
}

impl From<GatewayError> for IntakeError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::TableMissing => Self::SchemaMissing,
            other => Self::persistence(other.to_string()),
        }
    }
}

/// Validate a candidate and store it.
///
/// Returns the identifier of the new row. Exactly one insert is issued on
/// success and none on failure.
///
/// # Errors
///
/// - [`IntakeError::Validation`] if any field violates its rule.
/// - [`IntakeError::SchemaMissing`] if the table is not provisioned.
/// - [`IntakeError::Persistence`] for any other storage failure.
pub fn submit<G>(gateway: &G, candidate: &ComplaintCandidate) -> Result<i64, IntakeError>
where
    G: ComplaintGateway + ?Sized,
{
    let complaint = validation::validate(candidate).map_err(|errors| {
        debug!("Rejected complaint: {}", errors);
        IntakeError::Validation(errors)
    })?;

    let row = complaint.to_row();
    match gateway.insert(&row) {
        Ok(id) => {
            info!(
                id,
                priority = %row.priority,
                issue_type = %row.issue_type,
                "Complaint submitted"
            );
            Ok(id)
        }
        Err(GatewayError::TableMissing) => {
            warn!("Complaint submitted before the complaints table was provisioned");
            Err(IntakeError::SchemaMissing)
        }
        Err(err) => {
            error!("Error submitting complaint: {}", err);
            Err(err.into())
        }
    }
}

/// Every stored complaint, newest first.
///
/// # Errors
///
/// - [`IntakeError::SchemaMissing`] if the table is not provisioned.
/// - [`IntakeError::Persistence`] for any other storage failure.
pub fn list_complaints<G>(gateway: &G) -> Result<Vec<ComplaintRecord>, IntakeError>
where
    G: ComplaintGateway + ?Sized,
{
    let records = gateway.select_newest_first().map_err(|err| {
        if err != GatewayError::TableMissing {
            error!("Error loading complaints: {}", err);
        }
        IntakeError::from(err)
    })?;
    debug!("Loaded {} complaints", records.len());
    Ok(records)
}

/// Make sure the complaints table exists, creating it if needed.
///
/// Safe to call repeatedly: an existing table is reported and left alone.
///
/// # Errors
///
/// Returns [`ProvisionError`] with operator guidance when the table is
/// missing and cannot be created, or when the existence check itself fails.
pub fn ensure_table<G>(gateway: &G) -> Result<ProvisionOutcome, ProvisionError>
where
    G: ComplaintGateway + ?Sized,
{
    match gateway.probe() {
        Ok(count) => {
            debug!("Complaints table present with {} rows", count);
            return Ok(ProvisionOutcome::AlreadyExists);
        }
        Err(GatewayError::TableMissing) => {}
        Err(err) => {
            error!("Error checking complaints table: {}", err);
            return Err(ProvisionError::new(err.to_string()));
        }
    }

    match gateway.provision() {
        Ok(()) => Ok(ProvisionOutcome::Created),
        Err(err) => {
            error!("Error creating complaints table via provisioning procedure: {}", err);
            Err(ProvisionError::manual_setup())
        }
    }
}
