//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get live views and insert/update/delete over `datarecords`.
//! - Keep SQL details and notification ordering inside the store.
//!
//! # Invariants
//! - The connection mutex serializes every read, write and subscription.
//! - Subscribers are notified while that mutex is still held, so snapshots
//!   arrive in commit order.
//! - Writes that change no row do not notify.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::live::{LiveRegistry, LiveView};
use crate::lock::acquire_lock;
use crate::model::record::{Record, RecordId};
use log::{error, info, warn};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const RECORD_TABLE: &str = "datarecords";
const RECORD_COLUMNS: &[&str] = &["id", "record"];
const RECORD_SELECT_SQL: &str = "SELECT id, record FROM datarecords";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for record persistence, query and subscription operations.
#[derive(Debug)]
pub enum StoreError {
    /// Insert hit an existing primary key.
    Conflict(RecordId),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict(id) => write!(f, "record id {id} already exists"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::InvalidColumnType(index, name, kind) => Self::InvalidData(format!(
                "column `{name}` (index {index}) holds {kind} in {RECORD_TABLE}"
            )),
            other => Self::Db(DbError::Sqlite(other)),
        }
    }
}

/// Storage interface for the record table.
///
/// `update` and `delete` take several records per call; each call is atomic.
pub trait RecordStore: Send + Sync {
    /// Live view of every row, ascending by id.
    fn list_all(&self) -> StoreResult<LiveView<Vec<Record>>>;
    /// Live view of one row; `None` while no row has this id.
    fn get_by_id(&self, id: RecordId) -> StoreResult<LiveView<Option<Record>>>;
    /// Inserts `record` and returns its id. `NEW_RECORD_ID` lets storage pick one.
    fn insert(&self, record: &Record) -> StoreResult<RecordId>;
    /// Replaces text of existing rows by id. Returns rows changed.
    fn update(&self, records: &[Record]) -> StoreResult<usize>;
    /// Removes rows by id; text is ignored. Returns rows removed.
    fn delete(&self, records: &[Record]) -> StoreResult<usize>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn list_all(&self) -> StoreResult<LiveView<Vec<Record>>> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: RecordId) -> StoreResult<LiveView<Option<Record>>> {
        (**self).get_by_id(id)
    }

    fn insert(&self, record: &Record) -> StoreResult<RecordId> {
        (**self).insert(record)
    }

    fn update(&self, records: &[Record]) -> StoreResult<usize> {
        (**self).update(records)
    }

    fn delete(&self, records: &[Record]) -> StoreResult<usize> {
        (**self).delete(records)
    }
}

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    registry: Arc<LiveRegistry>,
}

impl SqliteRecordStore {
    /// Wraps a connection whose schema is already current.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not latest.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the table shape
    ///   does not match.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            registry: LiveRegistry::new(),
        })
    }

    /// Opens (or creates) a store file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Registry of live views attached to this store.
    pub fn registry(&self) -> &Arc<LiveRegistry> {
        &self.registry
    }

    fn notify_subscribers(&self, conn: &Connection, event: &str) -> usize {
        match self
            .registry
            .publish(|| load_all(conn), |id| load_one(conn, id))
        {
            Ok(notified) => notified,
            Err(err) => {
                error!(
                    "event={} module=store status=error error_code=notify_failed error={}",
                    event, err
                );
                0
            }
        }
    }
}

impl RecordStore for SqliteRecordStore {
    fn list_all(&self) -> StoreResult<LiveView<Vec<Record>>> {
        let conn = acquire_lock(&self.conn, "record_store");
        let rows = load_all(&conn)?;
        Ok(self.registry.register_all(rows))
    }

    fn get_by_id(&self, id: RecordId) -> StoreResult<LiveView<Option<Record>>> {
        let conn = acquire_lock(&self.conn, "record_store");
        let row = load_one(&conn, id)?;
        Ok(self.registry.register_by_id(id, row))
    }

    fn insert(&self, record: &Record) -> StoreResult<RecordId> {
        let started_at = Instant::now();
        let mut conn = acquire_lock(&self.conn, "record_store");

        let tx = conn.transaction()?;
        let inserted = if record.is_unsaved() {
            tx.execute(
                "INSERT OR ABORT INTO datarecords (record) VALUES (?1);",
                params![record.text.as_str()],
            )
        } else {
            tx.execute(
                "INSERT OR ABORT INTO datarecords (id, record) VALUES (?1, ?2);",
                params![record.id, record.text.as_str()],
            )
        };
        if let Err(err) = inserted {
            if is_primary_key_conflict(&err) {
                warn!(
                    "event=record_insert module=store status=conflict id={} duration_ms={}",
                    record.id,
                    started_at.elapsed().as_millis()
                );
                return Err(StoreError::Conflict(record.id));
            }
            return Err(err.into());
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let notified = self.notify_subscribers(&conn, "record_insert");
        info!(
            "event=record_insert module=store status=ok id={} notified={} duration_ms={}",
            id,
            notified,
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    fn update(&self, records: &[Record]) -> StoreResult<usize> {
        let started_at = Instant::now();
        let mut conn = acquire_lock(&self.conn, "record_store");

        let tx = conn.transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE datarecords SET record = ?1 WHERE id = ?2;")?;
            for record in records {
                changed += stmt.execute(params![record.text.as_str(), record.id])?;
            }
        }
        tx.commit()?;

        let notified = if changed > 0 {
            self.notify_subscribers(&conn, "record_update")
        } else {
            0
        };
        info!(
            "event=record_update module=store status=ok requested={} changed={} notified={} duration_ms={}",
            records.len(),
            changed,
            notified,
            started_at.elapsed().as_millis()
        );
        Ok(changed)
    }

    fn delete(&self, records: &[Record]) -> StoreResult<usize> {
        let started_at = Instant::now();
        let mut conn = acquire_lock(&self.conn, "record_store");

        let tx = conn.transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM datarecords WHERE id = ?1;")?;
            for record in records {
                removed += stmt.execute([record.id])?;
            }
        }
        tx.commit()?;

        let notified = if removed > 0 {
            self.notify_subscribers(&conn, "record_delete")
        } else {
            0
        };
        info!(
            "event=record_delete module=store status=ok requested={} removed={} notified={} duration_ms={}",
            records.len(),
            removed,
            notified,
            started_at.elapsed().as_millis()
        );
        Ok(removed)
    }
}

fn load_all(conn: &Connection) -> StoreResult<Vec<Record>> {
    let mut stmt = conn.prepare(&format!("{RECORD_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(parse_record_row(row)?);
    }
    Ok(records)
}

fn load_one(conn: &Connection, id: RecordId) -> StoreResult<Option<Record>> {
    let record = conn
        .query_row(
            &format!("{RECORD_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_record_row,
        )
        .optional()?;
    Ok(record)
}

fn parse_record_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get("id")?,
        text: row.get("record")?,
    })
}

fn is_primary_key_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}

fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({RECORD_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Err(StoreError::MissingRequiredTable(RECORD_TABLE));
    }
    for &column in RECORD_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(StoreError::MissingRequiredColumn {
                table: RECORD_TABLE,
                column,
            });
        }
    }
    Ok(())
}
