//! SQLite storage implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::contract::DATABASE_VERSION;
use crate::{Error, Result};
use super::schema;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Versioned handle to the history database.
///
/// Construction does no I/O. The SQLite connection is opened on the first
/// call to [`Database::with_connection`], kept until [`Database::close`], and
/// re-opened on the next use after that. The open runs under the same lock as
/// every operation, so two threads racing on first use create the schema once.
pub struct Database {
    location: Location,
    version: i32,
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Database file at `path` (created on first use if missing)
    pub fn open(path: &Path) -> Self {
        Self::at(Location::File(path.to_path_buf()))
    }

    /// In-memory database (for testing). Closing it discards all rows.
    pub fn open_in_memory() -> Self {
        Self::at(Location::Memory)
    }

    fn at(location: Location) -> Self {
        Self {
            location,
            version: DATABASE_VERSION,
            conn: Mutex::new(None),
        }
    }

    /// Override the schema version. Versions start at 1; lower values are raised to 1.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version.max(1);
        self
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Backing file, if this is not an in-memory database
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Run `f` against the connection, opening it first if needed.
    ///
    /// The connection stays locked for the duration of `f`.
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.open_connection()?);
        }
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(Error::Lock("connection missing after open".to_string())),
        }
    }

    /// Release the connection. The next operation opens a fresh one.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| Error::Storage(e))?;
            tracing::debug!("Closed history database");
        }
        Ok(())
    }

    /// Schema version recorded in the database file
    pub fn schema_version(&self) -> Result<i32> {
        self.with_connection(|conn| user_version(conn))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| Error::Lock("Failed to acquire database lock".to_string()))
    }

    fn open_connection(&self) -> Result<Connection> {
        let mut conn = match &self.location {
            Location::File(path) => {
                tracing::debug!("Opening history database {}", path.display());
                Connection::open(path)?
            }
            Location::Memory => {
                tracing::debug!("Opening in-memory history database");
                Connection::open_in_memory()?
            }
        };
        prepare_schema(&mut conn, self.version)?;
        Ok(conn)
    }
}

fn user_version(conn: &Connection) -> Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Bring the schema to `version`: create it on a fresh file, or drop and
/// recreate it when the stored version differs in either direction.
fn prepare_schema(conn: &mut Connection, version: i32) -> Result<()> {
    let current = user_version(conn)?;
    if current == version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current == 0 {
        tracing::debug!("Creating history schema at version {}", version);
    } else {
        let direction = if current < version { "Upgrading" } else { "Downgrading" };
        tracing::warn!(
            "{} database from version {} to {}, which will destroy all the existing data",
            direction,
            current,
            version
        );
        for stmt in schema::drop_statements() {
            tx.execute(stmt, [])?;
        }
    }
    for stmt in schema::create_statements() {
        tx.execute(stmt, [])?;
    }
    tx.pragma_update(None, "user_version", version)?;
    tx.commit()?;
    Ok(())
}
