//! # Winnie - persisted counter with an addressable history store
//!
//! Winnie keeps a single integer counter that moves in steps of fifty and
//! records every adjustment in a local SQLite table.
//!
//! Winnie provides:
//! - A static contract (table, columns, authority, database name/version)
//! - `content://` URIs that address the history table
//! - A content provider that routes URIs to CRUD operations over SQLite
//! - Change notification through channel subscriptions
//! - The counter itself, with preferences and per-action sound cues

pub mod contract;
pub mod uri;
pub mod values;
pub mod notify;
pub mod storage;
pub mod provider;
pub mod history;
pub mod preferences;
pub mod counter;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use uri::ContentUri;
pub use values::ContentValues;
pub use notify::{ChangeEvent, ChangeNotifier, Subscription};
pub use storage::Database;
pub use provider::{Cursor, HistoryProvider, UpdatePolicy, UriMatch};
pub use history::{HistoryLoader, HistoryRecord};
pub use counter::{Counter, SoundCue};
pub use preferences::Preferences;

/// Result type alias for Winnie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Winnie operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Insert error: {0}")]
    InsertFailed(String),

    #[error("Update error: {0}")]
    NoRowsUpdated(String),

    #[error("Empty values: {0}")]
    EmptyValues(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Preferences error: {0}")]
    Preferences(String),
}
