//! Core complaint types for complaintdesk.
//!
//! A complaint moves through four shapes:
//!
//! - [`ComplaintCandidate`]: raw input from the form or the JSON API.
//! - [`Complaint`]: a validated, normalized record.
//! - [`ComplaintRow`]: the snake_case row written to storage.
//! - [`ComplaintRecord`]: a row read back, with storage-assigned fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Field;

/// A fixed set of values offered by a select or radio group on the form.
///
/// Membership is only enforced by the form controls; the submission path
/// stores whatever non-empty text it receives.
pub trait Choice: Copy + Sized + 'static {
    /// Every value, in display order.
    const ALL: &'static [Self];

    /// Value as submitted and stored.
    fn as_str(self) -> &'static str;

    /// Human-readable label for the form.
    fn label(self) -> &'static str;

    /// Look up a value by its stored text.
    #[must_use]
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

/// Streets in the community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    /// Gatewood
    Gatewood,
    /// Bentham
    Bentham,
    /// Monmouth
    Monmouth,
    /// Carver
    Carver,
    /// Westford
    Westford,
    /// Cheryl
    Cheryl,
    /// Pendleton
    Pendleton,
    /// Heathrowe
    Heathrowe,
    /// Turner
    Turner,
}

impl Choice for Street {
    const ALL: &'static [Self] = &[
        Self::Gatewood,
        Self::Bentham,
        Self::Monmouth,
        Self::Carver,
        Self::Westford,
        Self::Cheryl,
        Self::Pendleton,
        Self::Heathrowe,
        Self::Turner,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Gatewood => "gatewood",
            Self::Bentham => "bentham",
            Self::Monmouth => "monmouth",
            Self::Carver => "carver",
            Self::Westford => "westford",
            Self::Cheryl => "cheryl",
            Self::Pendleton => "pendleton",
            Self::Heathrowe => "heathrowe",
            Self::Turner => "turner",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Gatewood => "Gatewood",
            Self::Bentham => "Bentham",
            Self::Monmouth => "Monmouth",
            Self::Carver => "Carver",
            Self::Westford => "Westford",
            Self::Cheryl => "Cheryl",
            Self::Pendleton => "Pendleton",
            Self::Heathrowe => "Heathrowe",
            Self::Turner => "Turner",
        }
    }
}

/// Kind of issue being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// General maintenance.
    Maintenance,
    /// Plumbing.
    Plumbing,
    /// Electrical.
    Electrical,
    /// Heating, ventilation, air conditioning.
    Hvac,
    /// Appliances.
    Appliance,
    /// Noise complaint.
    Noise,
    /// Pest control.
    Pest,
    /// Security concern.
    Security,
    /// Anything else.
    Other,
}

impl Choice for IssueType {
    const ALL: &'static [Self] = &[
        Self::Maintenance,
        Self::Plumbing,
        Self::Electrical,
        Self::Hvac,
        Self::Appliance,
        Self::Noise,
        Self::Pest,
        Self::Security,
        Self::Other,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Hvac => "hvac",
            Self::Appliance => "appliance",
            Self::Noise => "noise",
            Self::Pest => "pest",
            Self::Security => "security",
            Self::Other => "other",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Hvac => "HVAC/Heating/Cooling",
            Self::Appliance => "Appliance",
            Self::Noise => "Noise Complaint",
            Self::Pest => "Pest Control",
            Self::Security => "Security Concern",
            Self::Other => "Other",
        }
    }
}

/// How quickly the issue needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Immediate attention needed.
    Emergency,
    /// Within 24 hours.
    Urgent,
    /// Within 3-5 days.
    Standard,
    /// When convenient.
    Low,
}

impl Choice for Priority {
    const ALL: &'static [Self] = &[Self::Emergency, Self::Urgent, Self::Standard, Self::Low];

    fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::Standard => "standard",
            Self::Low => "low",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Emergency => "Emergency - Immediate attention needed",
            Self::Urgent => "Urgent - Within 24 hours",
            Self::Standard => "Standard - Within 3-5 days",
            Self::Low => "Low - When convenient",
        }
    }
}

/// Color tag shown next to a complaint's priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityTag {
    /// Emergency.
    Red,
    /// Urgent.
    Orange,
    /// Standard.
    Blue,
    /// Low.
    Green,
    /// Anything unrecognized.
    Gray,
}

impl PriorityTag {
    /// Derive the tag from stored priority text.
    #[must_use]
    pub fn for_priority(priority: &str) -> Self {
        match Priority::parse(priority) {
            Some(Priority::Emergency) => Self::Red,
            Some(Priority::Urgent) => Self::Orange,
            Some(Priority::Standard) => Self::Blue,
            Some(Priority::Low) => Self::Green,
            None => Self::Gray,
        }
    }

    /// CSS color for the badge background.
    #[must_use]
    pub fn css_color(self) -> &'static str {
        match self {
            Self::Red => "#ef4444",
            Self::Orange => "#f97316",
            Self::Blue => "#3b82f6",
            Self::Green => "#22c55e",
            Self::Gray => "#6b7280",
        }
    }
}

impl std::fmt::Display for PriorityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Orange => write!(f, "orange"),
            Self::Blue => write!(f, "blue"),
            Self::Green => write!(f, "green"),
            Self::Gray => write!(f, "gray"),
        }
    }
}

/// Whether staff may enter the unit while the resident is away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Staff may enter.
    Yes,
    /// Resident wants to be present.
    No,
}

impl Choice for Permission {
    const ALL: &'static [Self] = &[Self::Yes, Self::No];

    fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes, staff may enter my unit in my absence to address this issue",
            Self::No => "No, I want to be present when staff enters my unit",
        }
    }
}

/// Raw complaint input, exactly as submitted.
///
/// Missing fields deserialize to empty strings so they are reported as
/// validation violations rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplaintCandidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub unit: String,
    pub issue_type: String,
    pub priority: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub date_noticed: String,
    pub description: String,
    pub permission: String,
}

impl ComplaintCandidate {
    /// The submitted text for a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Street => &self.street,
            Field::Unit => &self.unit,
            Field::IssueType => &self.issue_type,
            Field::Priority => &self.priority,
            Field::DateNoticed => &self.date_noticed,
            Field::Description => &self.description,
            Field::Permission => &self.permission,
        }
    }
}

/// A complaint that passed validation.
///
/// Only [`crate::validation::validate`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub unit: String,
    pub issue_type: String,
    pub priority: String,
    pub date_noticed: NaiveDate,
    pub description: String,
    pub permission: String,
}

impl Complaint {
    /// Translate to the storage row shape.
    #[must_use]
    pub fn to_row(&self) -> ComplaintRow {
        ComplaintRow {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            street: self.street.clone(),
            unit: self.unit.clone(),
            issue_type: self.issue_type.clone(),
            priority: self.priority.clone(),
            date_noticed: Some(self.date_noticed.format(DATE_FORMAT).to_string()),
            description: self.description.clone(),
            permission: self.permission.clone(),
        }
    }
}

/// Storage format for `date_noticed`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A row as written to the `complaints` table.
///
/// Field names match the column names; see [`Field::column`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub unit: String,
    pub issue_type: String,
    pub priority: String,
    /// Nullable: rows written before the column was populated have none.
    pub date_noticed: Option<String>,
    pub description: String,
    pub permission: String,
}

/// A stored complaint read back from the `complaints` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintRecord {
    /// Identifier assigned by storage.
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub unit: String,
    pub issue_type: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_noticed: Option<NaiveDate>,
    pub description: String,
    pub permission: String,
    /// Insertion time assigned by storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ComplaintRecord {
    /// Color tag for this complaint's priority.
    #[must_use]
    pub fn priority_tag(&self) -> PriorityTag {
        PriorityTag::for_priority(&self.priority)
    }

    /// Whether the resident granted permission to enter.
    #[must_use]
    pub fn permits_entry(&self) -> bool {
        Permission::parse(&self.permission) == Some(Permission::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_complaint() -> Complaint {
        Complaint {
            first_name: "Jo".to_string(),
            last_name: "Li".to_string(),
            email: "jo@x.com".to_string(),
            phone: "1234567890".to_string(),
            street: "gatewood".to_string(),
            unit: "101A".to_string(),
            issue_type: "plumbing".to_string(),
            priority: "urgent".to_string(),
            date_noticed: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: "Leaking faucet under sink".to_string(),
            permission: "yes".to_string(),
        }
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Street::parse("carver"), Some(Street::Carver));
        assert_eq!(IssueType::parse("hvac"), Some(IssueType::Hvac));
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Permission::parse("no"), Some(Permission::No));
        assert_eq!(Priority::parse("Urgent"), None);
        assert_eq!(Street::parse(""), None);
    }

    #[test]
    fn test_choice_lists_are_complete() {
        assert_eq!(Street::ALL.len(), 9);
        assert_eq!(IssueType::ALL.len(), 9);
        assert_eq!(Priority::ALL.len(), 4);
        assert_eq!(Permission::ALL.len(), 2);
    }

    #[test]
    fn test_choice_serde_matches_as_str() {
        for issue in IssueType::ALL {
            let json = serde_json::to_string(issue).unwrap();
            assert_eq!(json, format!("\"{}\"", issue.as_str()));
        }
    }

    #[test]
    fn test_priority_tag() {
        assert_eq!(PriorityTag::for_priority("emergency"), PriorityTag::Red);
        assert_eq!(PriorityTag::for_priority("urgent"), PriorityTag::Orange);
        assert_eq!(PriorityTag::for_priority("standard"), PriorityTag::Blue);
        assert_eq!(PriorityTag::for_priority("low"), PriorityTag::Green);
        assert_eq!(PriorityTag::for_priority("whenever"), PriorityTag::Gray);
        assert_eq!(PriorityTag::for_priority(""), PriorityTag::Gray);
    }

    #[test]
    fn test_priority_tag_display() {
        assert_eq!(PriorityTag::Red.to_string(), "red");
        assert_eq!(PriorityTag::Gray.to_string(), "gray");
    }

    #[test]
    fn test_candidate_deserialize_camel_case() {
        let json = r#"{"firstName": "Jo", "issueType": "pest", "dateNoticed": "2024-01-01"}"#;
        let candidate: ComplaintCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.first_name, "Jo");
        assert_eq!(candidate.issue_type, "pest");
        assert_eq!(candidate.value(Field::DateNoticed), "2024-01-01");
        // Missing fields default to empty
        assert_eq!(candidate.email, "");
    }

    #[test]
    fn test_to_row_includes_date_noticed() {
        let row = sample_complaint().to_row();
        assert_eq!(row.date_noticed.as_deref(), Some("2024-01-01"));
        assert_eq!(row.priority, "urgent");
    }

    #[test]
    fn test_row_keys_follow_column_names() {
        let complaint = sample_complaint();
        let row = serde_json::to_value(complaint.to_row()).unwrap();
        let domain = serde_json::to_value(&complaint).unwrap();

        let row = row.as_object().unwrap();
        assert_eq!(row.len(), Field::ALL.len());
        for field in Field::ALL {
            assert_eq!(
                row.get(field.column()),
                domain.get(field.name()),
                "column {} does not carry {}",
                field.column(),
                field.name()
            );
        }
    }

    #[test]
    fn test_record_permits_entry() {
        let record = ComplaintRecord {
            id: 1,
            first_name: "Jo".to_string(),
            last_name: "Li".to_string(),
            email: "jo@x.com".to_string(),
            phone: "1234567890".to_string(),
            street: "gatewood".to_string(),
            unit: "101A".to_string(),
            issue_type: "plumbing".to_string(),
            priority: "emergency".to_string(),
            date_noticed: None,
            description: "Leaking faucet under sink".to_string(),
            permission: "yes".to_string(),
            created_at: None,
        };
        assert!(record.permits_entry());
        assert_eq!(record.priority_tag(), PriorityTag::Red);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("date_noticed").is_none());
    }
}
