//! Schema versioning with destructive fallback.
//!
//! # Responsibility
//! - Hold the single current schema definition.
//! - Reset stores written by an older schema version.
//!
//! # Invariants
//! - A reset drops every user table before recreating the schema.
//! - Reset and version bump commit in one transaction.
//! - Stores from a newer binary are refused, never reset.

use crate::db::{DbError, DbResult};
use log::warn;
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("0001_init.sql");

/// What opening did to the on-disk schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// Schema already at the current version.
    UpToDate,
    /// Empty store; schema created.
    Created,
    /// Older schema found; all prior data discarded.
    DestructiveReset { from_version: u32 },
}

/// Returns the schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Brings the connection's schema to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<SchemaOutcome> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(SchemaOutcome::UpToDate);
    }

    let stale_tables = user_tables(conn)?;
    let outcome = if current_version == 0 && stale_tables.is_empty() {
        SchemaOutcome::Created
    } else {
        warn!(
            "event=db_destructive_reset module=db status=start from_version={} to_version={} tables={}",
            current_version,
            latest,
            stale_tables.len()
        );
        SchemaOutcome::DestructiveReset {
            from_version: current_version,
        }
    };

    let tx = conn.transaction()?;
    for table in &stale_tables {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_identifier(table)))?;
    }
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    tx.commit()?;

    Ok(outcome)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn user_tables(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name;",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
