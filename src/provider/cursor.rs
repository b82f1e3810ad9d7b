//! Materialized query results

use rusqlite::types::Value;

use crate::notify::Subscription;
use crate::uri::ContentUri;

/// Rows returned by [`HistoryProvider::query`](super::HistoryProvider::query).
///
/// The cursor is registered for change notification on the URI it was
/// queried with. Once a write touches that URI, [`Cursor::is_stale`] reports
/// true and the caller should re-run its query.
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    uri: ContentUri,
    changes: Option<Subscription>,
    stale: bool,
}

impl Cursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>, uri: ContentUri) -> Self {
        Self { columns, rows, uri, changes: None, stale: false }
    }

    pub(crate) fn set_notification(&mut self, changes: Subscription) {
        self.changes = Some(changes);
    }

    /// URI this cursor watches for changes
    pub fn notification_uri(&self) -> &ContentUri {
        &self.uri
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Value at `row` in column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row)?.get(index)
    }

    /// Integer value at `row` in column `name`; `None` for NULL or non-integers
    pub fn get_i64(&self, row: usize, name: &str) -> Option<i64> {
        match self.get(row, name)? {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// True once a change has been published for the watched URI.
    ///
    /// Drains pending events; stays true after the first one.
    pub fn is_stale(&mut self) -> bool {
        if let Some(changes) = &self.changes {
            if changes.try_iter().count() > 0 {
                self.stale = true;
            }
        }
        self.stale
    }
}

impl std::fmt::Debug for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("uri", &self.uri.to_uri_string())
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("stale", &self.stale)
            .finish()
    }
}
