//! The complaint field rule table.
//!
//! Every constraint on a complaint field is declared once in
//! [`FIELD_RULES`]. Both the interactive validator behind `/api/validate`
//! and the authoritative check in the submission path read this table.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

/// A complaint field, by its form (camelCase) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Street,
    Unit,
    IssueType,
    Priority,
    DateNoticed,
    Description,
    Permission,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 11] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Street,
        Self::Unit,
        Self::IssueType,
        Self::Priority,
        Self::DateNoticed,
        Self::Description,
        Self::Permission,
    ];

    /// Name used in the form and the JSON API.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::Unit => "unit",
            Self::IssueType => "issueType",
            Self::Priority => "priority",
            Self::DateNoticed => "dateNoticed",
            Self::Description => "description",
            Self::Permission => "permission",
        }
    }

    /// Column name in the `complaints` table.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Street => "street",
            Self::Unit => "unit",
            Self::IssueType => "issue_type",
            Self::Priority => "priority",
            Self::DateNoticed => "date_noticed",
            Self::Description => "description",
            Self::Permission => "permission",
        }
    }

    /// Form label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Email => "Email",
            Self::Phone => "Phone Number",
            Self::Street => "Street Name",
            Self::Unit => "Unit Number",
            Self::IssueType => "Issue Type",
            Self::Priority => "Priority Level",
            Self::DateNoticed => "When did you first notice the issue?",
            Self::Description => "Description of Issue",
            Self::Permission => "Permission to Enter",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate over a trimmed field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// At least this many characters.
    MinChars(usize),
    /// A syntactically valid email address.
    Email,
    /// A `YYYY-MM-DD` date between [`EARLIEST_DATE`] and today.
    CalendarDate,
}

/// Earliest accepted `dateNoticed`.
pub const EARLIEST_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => panic!("1900-01-01 is a valid date"),
};

impl Constraint {
    /// Check a trimmed value against this constraint.
    #[must_use]
    pub fn check(self, value: &str, today: NaiveDate) -> bool {
        match self {
            Self::MinChars(min) => value.chars().count() >= min,
            Self::Email => is_valid_email(value),
            Self::CalendarDate => parse_calendar_date(value, today).is_some(),
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field the rule applies to.
    pub field: Field,
    /// What the value must satisfy.
    pub constraint: Constraint,
    /// Message reported when it does not.
    pub message: &'static str,
}

/// The complaint schema.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::FirstName,
        constraint: Constraint::MinChars(2),
        message: "First name is required",
    },
    FieldRule {
        field: Field::LastName,
        constraint: Constraint::MinChars(2),
        message: "Last name is required",
    },
    FieldRule {
        field: Field::Email,
        constraint: Constraint::Email,
        message: "Invalid email address",
    },
    FieldRule {
        field: Field::Phone,
        constraint: Constraint::MinChars(10),
        message: "Valid phone number is required",
    },
    FieldRule {
        field: Field::Street,
        constraint: Constraint::MinChars(1),
        message: "Street is required",
    },
    FieldRule {
        field: Field::Unit,
        constraint: Constraint::MinChars(1),
        message: "Unit number is required",
    },
    FieldRule {
        field: Field::IssueType,
        constraint: Constraint::MinChars(1),
        message: "Issue type is required",
    },
    FieldRule {
        field: Field::Priority,
        constraint: Constraint::MinChars(1),
        message: "Priority is required",
    },
    FieldRule {
        field: Field::DateNoticed,
        constraint: Constraint::CalendarDate,
        message: "Please select a date",
    },
    FieldRule {
        field: Field::Description,
        constraint: Constraint::MinChars(10),
        message: "Description is required (min 10 characters)",
    },
    FieldRule {
        field: Field::Permission,
        constraint: Constraint::MinChars(1),
        message: "Please select an option",
    },
];

/// Rule for a given field.
#[must_use]
pub fn rule_for(field: Field) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|r| r.field == field)
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .unwrap_or_else(|e| unreachable!("email pattern is a literal: {e}"))
});

/// Check an email address.
///
/// The local part may not start with a dot or contain consecutive dots.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_PATTERN.is_match(value)
}

/// Parse a `YYYY-MM-DD` date, rejecting dates after `today` or before 1900.
#[must_use]
pub fn parse_calendar_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, crate::complaint::DATE_FORMAT)
        .ok()
        .filter(|date| (EARLIEST_DATE..=today).contains(date))
}
