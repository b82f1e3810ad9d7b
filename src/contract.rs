//! Contract shared between the history store and its callers
//!
//! Everything here is a constant: the database file and version, the table
//! and its columns, and the `content://` namespace that addresses the table.

use crate::uri::ContentUri;

/// Schema version. Any mismatch with the on-disk version drops the table.
pub const DATABASE_VERSION: i32 = 1;

/// Database file name, relative to the data directory
pub const DATABASE_NAME: &str = "History.db";

pub const TABLE_NAME: &str = "history";

/// Primary key column
pub const COLUMN_ID: &str = "_id";
/// Counter value after the adjustment
pub const COLUMN_COUNT: &str = "count";
/// Signed delta applied by the adjustment
pub const COLUMN_CHANGE: &str = "change";
/// Wall-clock time of the adjustment, milliseconds since the epoch
pub const COLUMN_TIME: &str = "time";

pub const SCHEME: &str = "content";
pub const AUTHORITY: &str = "me.freewine.winnie";

/// MIME type of the history table (a directory of rows)
pub const HISTORY_MIME_TYPE: &str = "vnd.android.cursor.dir/vnd.me.freewine.winnie.history";

/// Columns exposed to callers, in display order
pub const PROJECTION: [&str; 4] = [COLUMN_ID, COLUMN_COUNT, COLUMN_CHANGE, COLUMN_TIME];

/// `content://me.freewine.winnie`
pub fn content_uri() -> ContentUri {
    ContentUri::new(SCHEME, AUTHORITY, Vec::<String>::new())
}

/// `content://me.freewine.winnie/history`
pub fn history_uri() -> ContentUri {
    content_uri().with_appended_path(TABLE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_uri() {
        assert_eq!(history_uri().to_uri_string(), "content://me.freewine.winnie/history");
        assert_eq!(content_uri().to_uri_string(), "content://me.freewine.winnie");
    }

    #[test]
    fn test_mime_type_names_table() {
        assert!(HISTORY_MIME_TYPE.ends_with(&format!("{}.{}", AUTHORITY, TABLE_NAME)));
    }
}
