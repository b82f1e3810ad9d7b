//! Storage Layer - SQLite-backed persistence
//!
//! A single table, `history(_id, count, change, time)`, versioned through
//! `PRAGMA user_version`. A version mismatch in either direction drops the
//! table and recreates it empty.

pub mod schema;
pub mod sqlite;

pub use sqlite::Database;
