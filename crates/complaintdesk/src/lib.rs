//! `complaintdesk` - Maintenance complaint intake for a residential community
//!
//! Residents submit complaints through a web form; staff review them on an
//! admin page. Submissions are validated against one rule table and stored
//! in `SQLite`. When the complaints table has not been provisioned yet, the
//! admin page offers to create it or shows the SQL to run by hand.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod complaint;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod storage;
pub mod validation;
pub mod web;

pub use complaint::{Complaint, ComplaintCandidate, ComplaintRecord, ComplaintRow};
pub use config::Config;
pub use error::{Error, IntakeError, ProvisionError, Result};
pub use logging::init_logging;
pub use service::{ensure_table, list_complaints, submit, ProvisionOutcome};
pub use storage::{ComplaintGateway, GatewayError, Storage};
pub use validation::{validate, Field, ValidationErrors};
