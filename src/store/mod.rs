//! SQLite snapshot storage.
//!
//! One append-only table of `(path, size, timestamp)` rows. A row is written
//! only when a directory's size differs from its previous row, so the newest
//! row per path is that path's latest size.
//!
//! Supports:
//! - full history of one path, oldest first
//! - latest size of every path under a prefix in a single query
//! - latest size of one path (recorder change detection)

pub mod trend;

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{Error, Result};

/// One recorded observation of a path's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizePoint {
    pub timestamp: i64,
    pub size: u64,
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL,
            size INTEGER NOT NULL,
            timestamp INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_snapshots_path_timestamp ON snapshots(path, timestamp)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let conn = Connection::open(db_path)?;
        // readers in the browser never block the recorder's appends
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// All rows for exactly `path`, oldest first.
    pub fn history(&self, path: &str) -> Result<Vec<SizePoint>> {
        self.history_since(path, i64::MIN)
    }

    /// Rows for `path` with `timestamp >= since`, oldest first.
    pub fn history_since(&self, path: &str, since: i64) -> Result<Vec<SizePoint>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT timestamp, size FROM snapshots
             WHERE path = ?1 AND timestamp >= ?2
             ORDER BY timestamp, id",
        )?;

        let points = stmt
            .query_map(params![path, since], point_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(points)
    }

    /// Latest size of every recorded path that starts with `prefix`.
    pub fn latest_under(&self, prefix: &str) -> Result<HashMap<String, u64>> {
        // newest row per path, ties on timestamp going to the later insert
        let upper = prefix_upper_bound(prefix);
        let mut stmt = match upper {
            Some(_) => self.conn.prepare_cached(
                "SELECT path, size FROM (
                     SELECT path, size, ROW_NUMBER() OVER (
                         PARTITION BY path ORDER BY timestamp DESC, id DESC
                     ) AS newest
                     FROM snapshots
                     WHERE path >= ?1 AND path < ?2
                 ) WHERE newest = 1",
            )?,
            None => self.conn.prepare_cached(
                "SELECT path, size FROM (
                     SELECT path, size, ROW_NUMBER() OVER (
                         PARTITION BY path ORDER BY timestamp DESC, id DESC
                     ) AS newest
                     FROM snapshots
                     WHERE path >= ?1
                 ) WHERE newest = 1",
            )?,
        };

        let mut rows = match &upper {
            Some(upper) => stmt.query(params![prefix, upper])?,
            None => stmt.query(params![prefix])?,
        };

        let mut latest = HashMap::new();
        while let Some(row) = rows.next()? {
            let path: String = row.get(0)?;
            latest.insert(path, size_from_db(row.get(1)?));
        }

        Ok(latest)
    }

    /// Size from the newest row for `path`, if it was ever recorded.
    pub fn last_size(&self, path: &str) -> Result<Option<u64>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT size FROM snapshots
             WHERE path = ?1
             ORDER BY timestamp DESC, id DESC
             LIMIT 1",
        )?;

        let size = stmt
            .query_row(params![path], |row| row.get::<_, i64>(0))
            .optional()?;

        Ok(size.map(size_from_db))
    }

    /// Inserts one row unconditionally. Each call commits on its own, so an
    /// interrupted recorder run keeps everything written before it.
    pub fn append(&self, path: &str, size: u64, timestamp: i64) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO snapshots (path, size, timestamp) VALUES (?1, ?2, ?3)",
        )?;

        stmt.execute(params![
            path,
            i64::try_from(size).unwrap_or(i64::MAX),
            timestamp
        ])?;

        Ok(())
    }

    pub fn row_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))?;
        Ok(size_from_db(count))
    }
}

/// Smallest string greater than every string starting with `prefix`, so the
/// prefix test becomes a range over the path index.
fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let next = (u32::from(last) + 1..=u32::from(char::MAX)).find_map(char::from_u32);
        if let Some(next) = next {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn point_from_row(row: &rusqlite::Row) -> rusqlite::Result<SizePoint> {
    Ok(SizePoint {
        timestamp: row.get(0)?,
        size: size_from_db(row.get(1)?),
    })
}

fn size_from_db(value: i64) -> u64 {
    value.max(0) as u64
}
