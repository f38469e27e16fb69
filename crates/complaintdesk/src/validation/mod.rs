//! Complaint validation.
//!
//! [`validate`] turns a [`ComplaintCandidate`] into a normalized
//! [`Complaint`], or reports every field that violates its rule in
//! [`FIELD_RULES`]. Interactive feedback on the form and the authoritative
//! check before persistence both go through this one function.
//!
//! # Example
//!
//! ```
//! use complaintdesk::complaint::ComplaintCandidate;
//! use complaintdesk::validation::{validate, Field};
//!
//! let candidate = ComplaintCandidate {
//!     email: "not-an-email".to_string(),
//!     ..ComplaintCandidate::default()
//! };
//!
//! let errors = validate(&candidate).unwrap_err();
//! assert!(errors.contains(Field::Email));
//! ```

mod rules;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::complaint::{Complaint, ComplaintCandidate};

pub use rules::{
    is_valid_email, parse_calendar_date, rule_for, Constraint, Field, FieldRule, EARLIEST_DATE,
    FIELD_RULES,
};

/// A single field that failed its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// The offending field.
    pub field: Field,
    /// What the resident should fix.
    pub message: String,
}

impl FieldViolation {
    /// Create a violation.
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All violations found in one candidate, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldViolation>,
}

impl ValidationErrors {
    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the given field failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.errors.iter().any(|v| v.field == field)
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|v| v.field == field)
            .map(|v| v.message.as_str())
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.errors.iter()
    }

    fn push(&mut self, violation: FieldViolation) {
        self.errors.push(violation);
    }
}

impl From<Vec<FieldViolation>> for ValidationErrors {
    fn from(errors: Vec<FieldViolation>) -> Self {
        Self { errors }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

/// Validate a candidate against the rule table, as of the local date.
///
/// # Errors
///
/// Returns every violated field when the candidate is not acceptable.
pub fn validate(candidate: &ComplaintCandidate) -> Result<Complaint, ValidationErrors> {
    validate_as_of(candidate, Local::now().date_naive())
}

/// Validate a candidate, treating `today` as the latest acceptable
/// `dateNoticed`.
///
/// # Errors
///
/// Returns every violated field when the candidate is not acceptable.
pub fn validate_as_of(
    candidate: &ComplaintCandidate,
    today: NaiveDate,
) -> Result<Complaint, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for rule in FIELD_RULES {
        let value = candidate.value(rule.field).trim();
        if !rule.constraint.check(value, today) {
            errors.push(FieldViolation::new(rule.field, rule.message));
        }
    }

    let date_noticed = parse_calendar_date(candidate.date_noticed.trim(), today);
    let Some(date_noticed) = date_noticed.filter(|_| errors.is_empty()) else {
        return Err(errors);
    };

    let text = |field: Field| candidate.value(field).trim().to_string();
    Ok(Complaint {
        first_name: text(Field::FirstName),
        last_name: text(Field::LastName),
        email: text(Field::Email),
        phone: text(Field::Phone),
        street: text(Field::Street),
        unit: text(Field::Unit),
        issue_type: text(Field::IssueType),
        priority: text(Field::Priority),
        date_noticed,
        description: text(Field::Description),
        permission: text(Field::Permission),
    })
}
