//! SQL schema for the offline cache.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per cached list (or single record). Values are whole JSON
-- documents; individual records are never addressed by SQL.
CREATE TABLE IF NOT EXISTS cache_entries (
    entry_key  TEXT PRIMARY KEY,  -- 'donors' | 'users' | 'schedules' | 'requests' | 'profile'
    value_json TEXT NOT NULL,
    updated_at TEXT NOT NULL      -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
