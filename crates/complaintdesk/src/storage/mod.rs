//! Storage layer for complaintdesk.
//!
//! This module provides the `SQLite`-backed [`ComplaintGateway`]: inserting
//! complaints, listing them newest first, and provisioning the table.

pub mod gateway;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::complaint::{ComplaintRecord, ComplaintRow, DATE_FORMAT};
use crate::error::{Error, Result};

pub use gateway::{ComplaintGateway, GatewayError, GatewayResult};
use schema::COMPLAINTS_TABLE;

/// `SQLite` storage for complaints.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Whether [`ComplaintGateway::provision`] may create the table.
    allow_provisioning: bool,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist
    /// and initializes the metadata schema. The complaints table is left to
    /// the provisioning procedure.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL lets the admin listing read while a submission writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn,
            allow_provisioning: true,
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            allow_provisioning: true,
        })
    }

    /// Enable or disable the provisioning procedure.
    #[must_use]
    pub fn with_provisioning(mut self, allow: bool) -> Self {
        self.allow_provisioning = allow;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the catalog for the complaints table.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [COMPLAINTS_TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Classify a failed statement against the complaints table.
    fn classify(&self, err: &rusqlite::Error) -> GatewayError {
        match self.table_exists() {
            Ok(false) => GatewayError::TableMissing,
            Ok(true) => GatewayError::backend(err.to_string()),
            Err(catalog_err) => {
                warn!("Catalog lookup failed after {}: {}", err, catalog_err);
                GatewayError::backend(err.to_string())
            }
        }
    }

    /// Convert a database row to a `ComplaintRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ComplaintRecord> {
        let date_noticed: Option<String> = row.get(9)?;
        let created_at: Option<String> = row.get(12)?;

        Ok(ComplaintRecord {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            street: row.get(5)?,
            unit: row.get(6)?,
            issue_type: row.get(7)?,
            priority: row.get(8)?,
            date_noticed: date_noticed.as_deref().and_then(parse_stored_date),
            description: row.get(10)?,
            permission: row.get(11)?,
            created_at: created_at.as_deref().and_then(parse_stored_timestamp),
        })
    }
}

impl ComplaintGateway for Storage {
    fn insert(&self, row: &ComplaintRow) -> GatewayResult<i64> {
        self.conn
            .execute(
                r"
                INSERT INTO complaints (
                    first_name, last_name, email, phone, street, unit,
                    issue_type, priority, date_noticed, description, permission
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ",
                params![
                    row.first_name,
                    row.last_name,
                    row.email,
                    row.phone,
                    row.street,
                    row.unit,
                    row.issue_type,
                    row.priority,
                    row.date_noticed,
                    row.description,
                    row.permission,
                ],
            )
            .map_err(|e| self.classify(&e))?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted complaint with id {}", id);
        Ok(id)
    }

    fn select_newest_first(&self) -> GatewayResult<Vec<ComplaintRecord>> {
        let query = || -> rusqlite::Result<Vec<ComplaintRecord>> {
            let mut stmt = self.conn.prepare(
                r"
                SELECT id, first_name, last_name, email, phone, street, unit,
                       issue_type, priority, date_noticed, description, permission, created_at
                FROM complaints ORDER BY julianday(created_at) DESC, id DESC
                ",
            )?;
            let records = stmt
                .query_map([], Self::row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        };
        query().map_err(|e| self.classify(&e))
    }

    fn probe(&self) -> GatewayResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM complaints", [], |row| row.get(0))
            .map_err(|e| self.classify(&e))
    }

    fn provision(&self) -> GatewayResult<()> {
        if !self.allow_provisioning {
            return Err(GatewayError::ProcedureUnavailable);
        }
        migrations::provision_complaints(&self.conn).map_err(|e| GatewayError::backend(e.to_string()))
    }
}

/// Parse a stored `date_noticed`, tolerating a trailing time component.
fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Unparseable date_noticed {:?}, treating as absent", value);
            None
        }
    }
}

/// Parse a stored `created_at` (RFC 3339, or `SQLite`'s `datetime('now')` form).
fn parse_stored_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            warn!("Unparseable created_at {:?}, treating as absent", value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn create_test_storage() -> Storage {
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        storage.provision().expect("failed to provision");
        storage
    }

    fn create_test_row(first_name: &str) -> ComplaintRow {
        ComplaintRow {
            first_name: first_name.to_string(),
            last_name: "Li".to_string(),
            email: "jo@x.com".to_string(),
            phone: "1234567890".to_string(),
            street: "gatewood".to_string(),
            unit: "101A".to_string(),
            issue_type: "plumbing".to_string(),
            priority: "urgent".to_string(),
            date_noticed: Some("2024-01-01".to_string()),
            description: "Leaking faucet under sink".to_string(),
            permission: "yes".to_string(),
        }
    }

    fn set_created_at(storage: &Storage, id: i64, created_at: &str) {
        storage
            .conn
            .execute(
                "UPDATE complaints SET created_at = ?1 WHERE id = ?2",
                params![created_at, id],
            )
            .unwrap();
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
        assert!(!storage.table_exists().unwrap());
    }

    #[test]
    fn test_unprovisioned_table_is_classified() {
        let storage = Storage::open_in_memory().unwrap();

        assert_eq!(storage.probe(), Err(GatewayError::TableMissing));
        assert_eq!(storage.select_newest_first(), Err(GatewayError::TableMissing));
        assert_eq!(
            storage.insert(&create_test_row("Jo")),
            Err(GatewayError::TableMissing)
        );
    }

    #[test]
    fn test_insert_and_read_back() {
        let storage = create_test_storage();
        let id = storage.insert(&create_test_row("Jo")).unwrap();

        let records = storage.select_newest_first().unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, id);
        assert_eq!(record.first_name, "Jo");
        assert_eq!(record.priority, "urgent");
        assert_eq!(record.date_noticed, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_probe_counts_rows() {
        let storage = create_test_storage();
        assert_eq!(storage.probe(), Ok(0));
        storage.insert(&create_test_row("Jo")).unwrap();
        storage.insert(&create_test_row("Al")).unwrap();
        assert_eq!(storage.probe(), Ok(2));
    }

    #[test]
    fn test_newest_first() {
        let storage = create_test_storage();
        let old = storage.insert(&create_test_row("Old")).unwrap();
        let new = storage.insert(&create_test_row("New")).unwrap();
        let mid = storage.insert(&create_test_row("Mid")).unwrap();
        set_created_at(&storage, old, "2024-01-01T08:00:00.000Z");
        set_created_at(&storage, new, "2024-03-01T08:00:00.000Z");
        set_created_at(&storage, mid, "2024-02-01T08:00:00.000Z");

        let names: Vec<String> = storage
            .select_newest_first()
            .unwrap()
            .into_iter()
            .map(|r| r.first_name)
            .collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
    }

    #[test]
    fn test_same_timestamp_orders_by_id() {
        let storage = create_test_storage();
        let first = storage.insert(&create_test_row("First")).unwrap();
        let second = storage.insert(&create_test_row("Second")).unwrap();
        set_created_at(&storage, first, "2024-01-01T08:00:00.000Z");
        set_created_at(&storage, second, "2024-01-01T08:00:00.000Z");

        let records = storage.select_newest_first().unwrap();
        assert_eq!(records[0].id, second);
        assert_eq!(records[1].id, first);
    }

    #[test]
    fn test_null_date_noticed_reads_as_absent() {
        let storage = create_test_storage();
        let mut row = create_test_row("Jo");
        row.date_noticed = None;
        storage.insert(&row).unwrap();

        let records = storage.select_newest_first().unwrap();
        assert!(records[0].date_noticed.is_none());
    }

    #[test]
    fn test_legacy_timestamp_format() {
        let storage = create_test_storage();
        let id = storage.insert(&create_test_row("Jo")).unwrap();
        set_created_at(&storage, id, "2024-05-06 07:08:09");

        let record = storage.select_newest_first().unwrap().remove(0);
        let created_at = record.created_at.unwrap();
        assert_eq!(created_at.year(), 2024);
        assert_eq!(created_at.month(), 5);
    }

    #[test]
    fn test_mixed_timestamp_formats_order_by_instant() {
        let storage = create_test_storage();
        let morning = storage.insert(&create_test_row("Morning")).unwrap();
        let night = storage.insert(&create_test_row("Night")).unwrap();
        let noon = storage.insert(&create_test_row("Noon")).unwrap();
        set_created_at(&storage, morning, "2024-05-06T01:00:00.000Z");
        set_created_at(&storage, night, "2024-05-06 23:00:00");
        set_created_at(&storage, noon, "2024-05-06T12:00:00.000Z");

        let records = storage.select_newest_first().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.first_name.as_str()).collect();
        assert_eq!(names, vec!["Night", "Noon", "Morning"]);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn test_garbage_values_read_as_absent() {
        let storage = create_test_storage();
        let id = storage.insert(&create_test_row("Jo")).unwrap();
        storage
            .conn
            .execute(
                "UPDATE complaints SET date_noticed = 'last week', created_at = 'yesterday' WHERE id = ?1",
                [id],
            )
            .unwrap();

        let record = storage.select_newest_first().unwrap().remove(0);
        assert!(record.date_noticed.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_provision_idempotent() {
        let storage = create_test_storage();
        storage.insert(&create_test_row("Jo")).unwrap();

        storage.provision().unwrap();
        storage.provision().unwrap();

        assert_eq!(storage.probe(), Ok(1));
    }

    #[test]
    fn test_provisioning_disabled() {
        let storage = Storage::open_in_memory().unwrap().with_provisioning(false);
        assert_eq!(storage.provision(), Err(GatewayError::ProcedureUnavailable));
        assert!(!storage.table_exists().unwrap());
    }

    #[test]
    fn test_backend_error_when_table_exists() {
        let storage = Storage::open_in_memory().unwrap();
        storage
            .conn
            .execute("CREATE TABLE complaints (id INTEGER PRIMARY KEY)", [])
            .unwrap();

        let result = storage.insert(&create_test_row("Jo"));
        assert!(matches!(result, Err(GatewayError::Backend(_))));

        let result = storage.select_newest_first();
        assert!(matches!(result, Err(GatewayError::Backend(_))));
    }

    #[test]
    fn test_unicode_content() {
        let storage = create_test_storage();
        let mut row = create_test_row("Zoë");
        row.description = "Fuite d'eau sous l'évier 🚰".to_string();
        storage.insert(&row).unwrap();

        let record = storage.select_newest_first().unwrap().remove(0);
        assert_eq!(record.first_name, "Zoë");
        assert_eq!(record.description, "Fuite d'eau sous l'évier 🚰");
    }

    #[test]
    fn test_open_file_based() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("complaints.db");

        {
            let storage = Storage::open(&db_path).unwrap();
            assert_eq!(storage.path(), db_path);
            storage.provision().unwrap();
            storage.insert(&create_test_row("Jo")).unwrap();
        }

        let reopened = Storage::open(&db_path).unwrap();
        assert!(reopened.table_exists().unwrap());
        assert_eq!(reopened.probe(), Ok(1));
    }

    #[test]
    fn test_parse_stored_date_with_time_suffix() {
        assert_eq!(
            parse_stored_date("2024-01-01T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parse_stored_date("short"), None);
    }
}
