//! History records and the live history list

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::contract::{self, COLUMN_CHANGE, COLUMN_COUNT, COLUMN_ID, COLUMN_TIME, PROJECTION};
use crate::provider::{Cursor, HistoryProvider};
use crate::values::ContentValues;
use crate::Result;

/// Display format for record timestamps
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One counter adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id, assigned by the store (0 until inserted)
    pub id: i64,
    /// Counter value right after the adjustment
    pub count: i64,
    /// Signed delta of the adjustment
    pub change: i64,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "time")]
    pub timestamp: i64,
}

impl HistoryRecord {
    /// Create a record for insertion (id will be set by the store)
    pub fn new(count: i64, change: i64, timestamp: i64) -> Self {
        Self { id: 0, count, change, timestamp }
    }

    /// Column values for inserting this record as a new row
    pub fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        values
            .put(COLUMN_COUNT, self.count)
            .put(COLUMN_CHANGE, self.change)
            .put(COLUMN_TIME, self.timestamp);
        values
    }

    /// Read row `row` of a cursor that carries the full projection
    pub fn from_cursor(cursor: &Cursor, row: usize) -> Option<Self> {
        Some(Self {
            id: cursor.get_i64(row, COLUMN_ID)?,
            count: cursor.get_i64(row, COLUMN_COUNT)?,
            change: cursor.get_i64(row, COLUMN_CHANGE)?,
            timestamp: cursor.get_i64(row, COLUMN_TIME)?,
        })
    }

    /// Every row of `cursor` that converts cleanly
    pub fn all_from_cursor(cursor: &Cursor) -> Vec<Self> {
        (0..cursor.len())
            .filter_map(|row| Self::from_cursor(cursor, row))
            .collect()
    }

    pub fn remaining_label(&self) -> String {
        format!("remaining: {}", self.count)
    }

    pub fn change_label(&self) -> String {
        self.change.to_string()
    }

    /// Timestamp in local time
    pub fn formatted_time(&self) -> String {
        format_timestamp(self.timestamp, &Local)
    }
}

/// Format epoch milliseconds in `tz`; out-of-range values fall back to the raw number
pub fn format_timestamp<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        None => millis.to_string(),
    }
}

/// Newest-first history list that re-runs its query when the table changes
pub struct HistoryLoader<'a> {
    provider: &'a HistoryProvider,
    limit: Option<usize>,
    cursor: Cursor,
    records: Vec<HistoryRecord>,
}

impl<'a> HistoryLoader<'a> {
    pub fn new(provider: &'a HistoryProvider) -> Result<Self> {
        Self::with_limit(provider, None)
    }

    /// Load at most `limit` records
    pub fn with_limit(provider: &'a HistoryProvider, limit: Option<usize>) -> Result<Self> {
        let cursor = Self::load(provider, limit)?;
        let records = HistoryRecord::all_from_cursor(&cursor);
        Ok(Self { provider, limit, cursor, records })
    }

    fn load(provider: &HistoryProvider, limit: Option<usize>) -> Result<Cursor> {
        let order = match limit {
            Some(n) => format!("{} DESC LIMIT {}", COLUMN_ID, n),
            None => format!("{} DESC", COLUMN_ID),
        };
        provider.query(&contract::history_uri(), Some(&PROJECTION[..]), None, &[], Some(order.as_str()))
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Re-run the query
    pub fn reload(&mut self) -> Result<()> {
        self.cursor = Self::load(self.provider, self.limit)?;
        self.records = HistoryRecord::all_from_cursor(&self.cursor);
        Ok(())
    }

    /// Reload if the table changed since the last load; returns whether it did
    pub fn refresh_if_stale(&mut self) -> Result<bool> {
        if !self.cursor.is_stale() {
            return Ok(false);
        }
        tracing::debug!("History changed, reloading");
        self.reload()?;
        Ok(true)
    }
}
