//! Database schema definitions

/// SQL to create the history table
pub const CREATE_HISTORY_TABLE: &str = r#"
CREATE TABLE history (
    _id INTEGER PRIMARY KEY,
    count INTEGER NOT NULL,
    change INTEGER NOT NULL,
    time LONG NOT NULL
)
"#;

/// SQL to drop the history table; a missing table is not an error
pub const DROP_HISTORY_TABLE: &str = "DROP TABLE IF EXISTS history";

/// Statements run when the database is created from scratch
pub fn create_statements() -> Vec<&'static str> {
    vec![CREATE_HISTORY_TABLE]
}

/// Statements run before re-creating the schema on a version change
pub fn drop_statements() -> Vec<&'static str> {
    vec![DROP_HISTORY_TABLE]
}
