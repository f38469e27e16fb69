//! Database migration system for complaintdesk.
//!
//! Tracks the schema version in the `metadata` table and hosts the
//! provisioning procedure that creates the `complaints` table.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{BASE_SCHEMA_STATEMENTS, COMPLAINTS_SCHEMA_STATEMENTS};

/// The current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Key recording when the complaints table was provisioned.
const PROVISIONED_AT_KEY: &str = "complaints_provisioned_at";

/// Initialize the base schema.
///
/// Creates the metadata table if it doesn't exist, then runs any pending
/// migrations. Does not create the complaints table.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in BASE_SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Create the complaints table and its index.
///
/// Idempotent: existing tables and rows are left untouched.
///
/// # Errors
///
/// Returns an error if any statement fails; the transaction is rolled back.
pub fn provision_complaints(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in COMPLAINTS_SCHEMA_STATEMENTS {
        tx.execute(statement, [])?;
    }
    tx.execute(
        "INSERT OR IGNORE INTO metadata (key, value) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        [PROVISIONED_AT_KEY],
    )?;
    tx.commit()?;
    info!("Complaints table provisioned");
    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run migrations from the given version to the current version.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < CURRENT_VERSION {
        current += 1;
        run_migration(conn, current)?;
    }

    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Migration to version 1 (metadata table only).
fn migrate_v1(conn: &Connection) -> Result<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}
