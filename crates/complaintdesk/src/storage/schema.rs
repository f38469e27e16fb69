//! `SQLite` schema definitions for complaintdesk.
//!
//! The `metadata` table is created whenever the database is opened. The
//! `complaints` table is only created by the provisioning procedure.

/// Name of the complaints table.
pub const COMPLAINTS_TABLE: &str = "complaints";

/// SQL statement to create the complaints table.
pub const CREATE_COMPLAINTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS complaints (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    street TEXT NOT NULL,
    unit TEXT NOT NULL,
    issue_type TEXT NOT NULL,
    priority TEXT NOT NULL,
    date_noticed TEXT,
    description TEXT NOT NULL,
    permission TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
";

/// SQL statement to create an index on `created_at`.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_complaints_created_at ON complaints(created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Statements run every time the database is opened.
pub const BASE_SCHEMA_STATEMENTS: &[&str] = &[CREATE_METADATA_TABLE];

/// Statements run by the provisioning procedure, in order.
pub const COMPLAINTS_SCHEMA_STATEMENTS: &[&str] =
    &[CREATE_COMPLAINTS_TABLE, CREATE_CREATED_AT_INDEX];

/// The provisioning statements as a script an operator can paste into
/// `sqlite3`.
#[must_use]
pub fn manual_setup_sql() -> String {
    COMPLAINTS_SCHEMA_STATEMENTS
        .iter()
        .map(|stmt| format!("{};", stmt.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
