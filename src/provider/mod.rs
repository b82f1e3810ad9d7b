//! Content provider for the history table
//!
//! Routes a [`ContentUri`] to the single table it can address, runs the
//! matching SQL, and publishes a change for the URI after every successful
//! write so live cursors know to re-query.
//!
//! Failure semantics differ per entry point:
//! - `query`, `insert`, `update` reject an unknown URI with [`Error::InvalidUri`]
//! - `delete` rejects it with [`Error::UnsupportedOperation`]
//! - `insert` that stores nothing, or would use a non-positive row id, fails
//!   with [`Error::InsertFailed`]
//! - `update` that matches nothing fails with [`Error::NoRowsUpdated`] unless
//!   the provider runs with [`UpdatePolicy::AllowZero`]

pub mod cursor;

use std::sync::Arc;

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::contract::{AUTHORITY, COLUMN_ID, HISTORY_MIME_TYPE, SCHEME, TABLE_NAME};
use crate::notify::ChangeNotifier;
use crate::storage::Database;
use crate::uri::ContentUri;
use crate::values::{quote_identifier, ContentValues};
use crate::{Error, Result};

pub use cursor::Cursor;

/// What a URI addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// `content://<authority>/history`
    HistoryTable,
    Invalid,
}

impl UriMatch {
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            UriMatch::HistoryTable => Some(HISTORY_MIME_TYPE),
            UriMatch::Invalid => None,
        }
    }
}

/// How `update` treats a filter that matches no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Zero affected rows is an error
    #[default]
    FailOnZero,
    /// Zero affected rows returns `Ok(0)` and publishes nothing
    AllowZero,
}

/// CRUD gateway over the history table
pub struct HistoryProvider {
    db: Database,
    notifier: Arc<ChangeNotifier>,
    update_policy: UpdatePolicy,
}

impl HistoryProvider {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            notifier: Arc::new(ChangeNotifier::new()),
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Share an existing notifier instead of owning a fresh one
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Release the underlying connection
    pub fn close(&self) -> Result<()> {
        self.db.close()
    }

    /// Map a URI to what it addresses
    pub fn resolve(uri: &ContentUri) -> UriMatch {
        if uri.scheme == SCHEME
            && uri.authority == AUTHORITY
            && uri.segments.len() == 1
            && uri.segments[0] == TABLE_NAME
        {
            UriMatch::HistoryTable
        } else {
            UriMatch::Invalid
        }
    }

    /// Like [`HistoryProvider::resolve`], for an unparsed string
    pub fn resolve_str(uri: &str) -> UriMatch {
        ContentUri::parse(uri)
            .map(|uri| Self::resolve(&uri))
            .unwrap_or(UriMatch::Invalid)
    }

    pub fn mime_type(&self, uri: &ContentUri) -> Option<&'static str> {
        Self::resolve(uri).mime_type()
    }

    /// Read rows from the table addressed by `uri`.
    ///
    /// `projection`, `filter` and `sort_order` are SQL fragments passed through
    /// as-is; `filter_args` bind to the `?` placeholders in `filter`. An empty
    /// or missing projection selects every column.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        filter: Option<&str>,
        filter_args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        match Self::resolve(uri) {
            UriMatch::HistoryTable => {
                let columns = match projection {
                    Some(cols) if !cols.is_empty() => cols.join(", "),
                    _ => "*".to_string(),
                };
                let mut sql = format!("SELECT {} FROM {}", columns, TABLE_NAME);
                push_where(&mut sql, filter);
                if let Some(order) = sort_order.filter(|o| !o.trim().is_empty()) {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(order);
                }
                tracing::debug!("query {}: {}", uri, sql);

                let mut cursor = self.db.with_connection(|conn| {
                    let mut stmt = conn.prepare(&sql)?;
                    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
                    let width = names.len();
                    let rows = stmt
                        .query_map(params_from_iter(filter_args.iter()), |row| {
                            (0..width)
                                .map(|i| row.get::<_, Value>(i))
                                .collect::<rusqlite::Result<Vec<Value>>>()
                        })?
                        .collect::<rusqlite::Result<Vec<Vec<Value>>>>()?;
                    Ok(Cursor::new(names, rows, uri.clone()))
                })?;

                cursor.set_notification(self.notifier.register(uri));
                Ok(cursor)
            }
            UriMatch::Invalid => Err(Error::InvalidUri(format!("Query -- Invalid URI: {}", uri))),
        }
    }

    /// Insert one row with conflict-replace semantics and return its URI
    pub fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri> {
        match Self::resolve(uri) {
            UriMatch::HistoryTable => {
                if values.is_empty() {
                    return Err(Error::InsertFailed(format!("no values for {}", uri)));
                }
                if let Some(Value::Integer(id)) = values.get(COLUMN_ID) {
                    if *id <= 0 {
                        return Err(Error::InsertFailed(format!("non-positive row id {} for {}", id, uri)));
                    }
                }

                let columns: Vec<String> = values.columns().map(quote_identifier).collect();
                let placeholders = vec!["?"; values.len()].join(", ");
                let sql = format!(
                    "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
                    TABLE_NAME,
                    columns.join(", "),
                    placeholders
                );

                let (changed, id) = self.db.with_connection(|conn| {
                    let changed = conn.execute(&sql, params_from_iter(values.values()))?;
                    Ok((changed, conn.last_insert_rowid()))
                })?;

                if changed == 0 || id <= 0 {
                    return Err(Error::InsertFailed(uri.to_uri_string()));
                }

                tracing::debug!("Inserted row {} into {}", id, uri);
                self.notifier.notify_change(uri);
                Ok(uri.with_appended_path(id))
            }
            UriMatch::Invalid => Err(Error::InvalidUri(format!("Insert: Invalid URI {}", uri))),
        }
    }

    /// Update the rows matching `filter`; returns how many changed
    pub fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        filter: Option<&str>,
        filter_args: &[Value],
    ) -> Result<usize> {
        match Self::resolve(uri) {
            UriMatch::HistoryTable => {
                if values.is_empty() {
                    return Err(Error::EmptyValues(uri.to_uri_string()));
                }

                let assignments: Vec<String> = values
                    .columns()
                    .map(|c| format!("{} = ?", quote_identifier(c)))
                    .collect();
                let mut sql = format!("UPDATE {} SET {}", TABLE_NAME, assignments.join(", "));
                push_where(&mut sql, filter);

                let rows = self.db.with_connection(|conn| {
                    Ok(conn.execute(&sql, params_from_iter(values.values().chain(filter_args.iter())))?)
                })?;

                if rows == 0 {
                    return match self.update_policy {
                        UpdatePolicy::FailOnZero => Err(Error::NoRowsUpdated(uri.to_uri_string())),
                        UpdatePolicy::AllowZero => Ok(0),
                    };
                }

                tracing::debug!("Updated {} row(s) in {}", rows, uri);
                self.notifier.notify_change(uri);
                Ok(rows)
            }
            UriMatch::Invalid => Err(Error::InvalidUri(format!("Update: Invalid URI: {}", uri))),
        }
    }

    /// Delete the rows matching `filter` (every row when `None`)
    pub fn delete(&self, uri: &ContentUri, filter: Option<&str>, filter_args: &[Value]) -> Result<usize> {
        match Self::resolve(uri) {
            UriMatch::HistoryTable => {
                let mut sql = format!("DELETE FROM {}", TABLE_NAME);
                push_where(&mut sql, filter);

                let rows = self.db.with_connection(|conn| {
                    Ok(conn.execute(&sql, params_from_iter(filter_args.iter()))?)
                })?;

                tracing::debug!("Deleted {} row(s) from {}", rows, uri);
                self.notifier.notify_change(uri);
                Ok(rows)
            }
            UriMatch::Invalid => Err(Error::UnsupportedOperation(format!("Delete -- unsupported operation {}", uri))),
        }
    }

    /// Number of rows in the history table
    pub fn count(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", TABLE_NAME);
        let count: i64 = self
            .db
            .with_connection(|conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))?;
        Ok(count as usize)
    }
}

fn push_where(sql: &mut String, filter: Option<&str>) {
    if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{self, history_uri, COLUMN_CHANGE, COLUMN_COUNT, COLUMN_TIME, PROJECTION};

    fn provider() -> HistoryProvider {
        HistoryProvider::new(Database::open_in_memory())
    }

    fn row(count: i64, change: i64, time: i64) -> ContentValues {
        let mut values = ContentValues::new();
        values
            .put(COLUMN_COUNT, count)
            .put(COLUMN_CHANGE, change)
            .put(COLUMN_TIME, time);
        values
    }

    fn all(provider: &HistoryProvider) -> Cursor {
        provider
            .query(&history_uri(), Some(&PROJECTION[..]), None, &[], Some("_id DESC"))
            .unwrap()
    }

    #[test]
    fn test_resolve() {
        assert_eq!(HistoryProvider::resolve(&history_uri()), UriMatch::HistoryTable);
        assert_eq!(HistoryProvider::resolve_str("content://me.freewine.winnie/history"), UriMatch::HistoryTable);
        assert_eq!(HistoryProvider::resolve_str("content://me.freewine.winnie/history/"), UriMatch::HistoryTable);

        for invalid in [
            "content://me.freewine.winnie",
            "content://me.freewine.winnie/history/1",
            "content://me.freewine.winnie/points",
            "content://other.authority/history",
            "file://me.freewine.winnie/history",
            "not a uri",
        ] {
            assert_eq!(HistoryProvider::resolve_str(invalid), UriMatch::Invalid, "{}", invalid);
        }
    }

    #[test]
    fn test_mime_type() {
        let provider = provider();
        assert_eq!(provider.mime_type(&history_uri()), Some(HISTORY_MIME_TYPE));
        assert_eq!(provider.mime_type(&history_uri().with_appended_path(1)), None);
    }

    #[test]
    fn test_insert_then_query() {
        let provider = provider();
        let first = provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        let before = all(&provider);
        assert_eq!(before.len(), 1);

        let second = provider.insert(&history_uri(), &row(150, -50, 2000)).unwrap();
        assert_eq!(second.to_uri_string(), format!("{}/{}", history_uri(), second.row_id().unwrap()));
        assert!(second.row_id().unwrap() > first.row_id().unwrap());

        let after = all(&provider);
        assert_eq!(after.len(), 2);
        assert_eq!(after.get_i64(0, COLUMN_ID), second.row_id());
        assert_eq!(after.get_i64(0, COLUMN_COUNT), Some(150));
        assert_eq!(after.get_i64(0, COLUMN_CHANGE), Some(-50));
        assert_eq!(after.get_i64(0, COLUMN_TIME), Some(2000));
    }

    #[test]
    fn test_sort_by_id_desc() {
        let provider = provider();
        for i in 0..5 {
            provider.insert(&history_uri(), &row(i * 50, 50, i)).unwrap();
        }

        let cursor = all(&provider);
        let ids: Vec<i64> = (0..cursor.len()).filter_map(|r| cursor.get_i64(r, COLUMN_ID)).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_end_to_end_order() {
        let provider = provider();
        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        provider.insert(&history_uri(), &row(150, -50, 2000)).unwrap();

        let cursor = all(&provider);
        assert_eq!(cursor.get_i64(0, COLUMN_COUNT), Some(150));
        assert_eq!(cursor.get_i64(0, COLUMN_TIME), Some(2000));
        assert_eq!(cursor.get_i64(1, COLUMN_COUNT), Some(200));
        assert_eq!(cursor.get_i64(1, COLUMN_TIME), Some(1000));
    }

    #[test]
    fn test_insert_conflict_replaces() {
        let provider = provider();
        let uri = provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        provider.insert(&history_uri(), &row(250, 50, 2000)).unwrap();
        let id = uri.row_id().unwrap();

        let mut replacement = row(999, -50, 3000);
        replacement.put(COLUMN_ID, id);
        let replaced = provider.insert(&history_uri(), &replacement).unwrap();
        assert_eq!(replaced.row_id(), Some(id));
        assert_eq!(provider.count().unwrap(), 2);

        let cursor = provider
            .query(&history_uri(), None, Some("_id = ?"), &[Value::Integer(id)], None)
            .unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.get_i64(0, COLUMN_COUNT), Some(999));
        assert_eq!(cursor.get_i64(0, COLUMN_TIME), Some(3000));
    }

    #[test]
    fn test_insert_failures() {
        let provider = provider();
        assert!(matches!(
            provider.insert(&history_uri(), &ContentValues::new()),
            Err(Error::InsertFailed(_))
        ));
        assert!(matches!(
            provider.insert(&history_uri().with_appended_path(1), &row(1, 1, 1)),
            Err(Error::InvalidUri(_))
        ));

        let mut missing_time = ContentValues::new();
        missing_time.put(COLUMN_COUNT, 200i64).put(COLUMN_CHANGE, 50i64);
        assert!(matches!(
            provider.insert(&history_uri(), &missing_time),
            Err(Error::Storage(_))
        ));
        assert_eq!(provider.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_rejects_non_positive_id() {
        let provider = provider();
        let observer = provider.notifier().register(&history_uri());

        for id in [-5i64, 0] {
            let mut values = row(200, 50, 1000);
            values.put(COLUMN_ID, id);
            assert!(matches!(
                provider.insert(&history_uri(), &values),
                Err(Error::InsertFailed(_))
            ));
        }
        assert_eq!(provider.count().unwrap(), 0);
        assert!(observer.try_recv().is_err());
    }

    #[test]
    fn test_reads_do_not_accumulate_observers() {
        let provider = provider();
        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();

        for _ in 0..1000 {
            provider.count().unwrap();
        }
        assert_eq!(provider.notifier().observer_count(), 0);

        for _ in 0..1000 {
            drop(all(&provider));
        }
        assert!(provider.notifier().observer_count() <= 1);

        let mut live = all(&provider);
        assert!(provider.notifier().observer_count() <= 2);
        provider.insert(&history_uri(), &row(250, 50, 2000)).unwrap();
        assert!(live.is_stale());
        assert_eq!(provider.notifier().observer_count(), 1);
    }

    #[test]
    fn test_query_invalid_uri() {
        let provider = provider();
        let uri = ContentUri::parse("content://me.freewine.winnie/points").unwrap();
        assert!(matches!(
            provider.query(&uri, None, None, &[], None),
            Err(Error::InvalidUri(_))
        ));
    }

    #[test]
    fn test_update_counts_rows() {
        let provider = provider();
        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        provider.insert(&history_uri(), &row(250, 50, 2000)).unwrap();
        provider.insert(&history_uri(), &row(200, -50, 3000)).unwrap();

        let mut values = ContentValues::new();
        values.put(COLUMN_CHANGE, 100i64);
        let rows = provider
            .update(&history_uri(), &values, Some("change = ?"), &[Value::Integer(50)])
            .unwrap();
        assert_eq!(rows, 2);

        let cursor = provider
            .query(&history_uri(), None, Some("change = ?"), &[Value::Integer(100)], None)
            .unwrap();
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn test_update_zero_rows() {
        let provider = provider();
        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();

        let mut values = ContentValues::new();
        values.put(COLUMN_COUNT, 0i64);
        let result = provider.update(&history_uri(), &values, Some("_id = ?"), &[Value::Integer(999)]);
        assert!(matches!(result, Err(Error::NoRowsUpdated(_))));

        let lenient = HistoryProvider::new(Database::open_in_memory()).with_update_policy(UpdatePolicy::AllowZero);
        let changes = lenient.notifier().register(&history_uri());
        assert_eq!(lenient.update(&history_uri(), &values, None, &[]).unwrap(), 0);
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_update_failures() {
        let provider = provider();
        assert!(matches!(
            provider.update(&history_uri(), &ContentValues::new(), None, &[]),
            Err(Error::EmptyValues(_))
        ));
        assert!(matches!(
            provider.update(&contract::content_uri(), &row(1, 1, 1), None, &[]),
            Err(Error::InvalidUri(_))
        ));
    }

    #[test]
    fn test_delete() {
        let provider = provider();
        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        provider.insert(&history_uri(), &row(150, -50, 2000)).unwrap();
        provider.insert(&history_uri(), &row(100, -50, 3000)).unwrap();

        let rows = provider
            .delete(&history_uri(), Some("change = ?"), &[Value::Integer(-50)])
            .unwrap();
        assert_eq!(rows, 2);
        assert_eq!(provider.count().unwrap(), 1);

        assert_eq!(provider.delete(&history_uri(), None, &[]).unwrap(), 1);
        assert_eq!(provider.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_invalid_uri_is_unsupported() {
        let provider = provider();
        let uri = ContentUri::parse("content://other.authority/history").unwrap();
        assert!(matches!(
            provider.delete(&uri, None, &[]),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_writes_invalidate_cursors() {
        let provider = provider();
        let mut cursor = all(&provider);
        assert!(!cursor.is_stale());

        provider.insert(&history_uri(), &row(200, 50, 1000)).unwrap();
        assert!(cursor.is_stale());
        assert!(cursor.is_stale());

        let observer = provider.notifier().register(&history_uri());
        let mut values = ContentValues::new();
        values.put(COLUMN_COUNT, 1i64);
        provider.update(&history_uri(), &values, None, &[]).unwrap();
        provider.delete(&history_uri(), None, &[]).unwrap();
        assert_eq!(observer.try_iter().count(), 2);
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        let provider = provider();
        let observer = provider.notifier().register(&history_uri());
        let _ = provider.insert(&history_uri(), &ContentValues::new());
        let _ = provider.update(&history_uri(), &row(1, 1, 1), None, &[]);
        assert!(observer.try_recv().is_err());
    }
}
