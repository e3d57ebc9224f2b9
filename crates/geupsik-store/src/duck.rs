//! DuckDB-backed vote counters.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use duckdb::{Connection, params};
use tracing::info;

use crate::votes::poisoned;
use crate::{StoreError, VoteCounts, VoteKind, VoteStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS menu_votes (
    date VARCHAR NOT NULL,
    school_code VARCHAR NOT NULL,
    good BIGINT NOT NULL DEFAULT 0,
    bad BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (date, school_code)
)";

/// Vote counters in a DuckDB table keyed by `(date, school_code)`.
///
/// Each increment is a single upsert statement, so the database applies it
/// atomically even with several writers.
///
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for a file that survives across runs.
pub struct DuckVoteStore {
    conn: Mutex<Connection>,
}

impl DuckVoteStore {
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl VoteStore for DuckVoteStore {
    fn get_counts(&self, date: NaiveDate, school_code: &str) -> Result<VoteCounts, StoreError> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let mut stmt =
            conn.prepare("SELECT good, bad FROM menu_votes WHERE date = ? AND school_code = ?")?;
        let mut rows = stmt.query(params![key(date), school_code])?;
        match rows.next()? {
            Some(row) => {
                let good: i64 = row.get(0)?;
                let bad: i64 = row.get(1)?;
                Ok(VoteCounts {
                    good: good.max(0) as u64,
                    bad: bad.max(0) as u64,
                })
            }
            None => Ok(VoteCounts::default()),
        }
    }

    fn increment(
        &self,
        date: NaiveDate,
        school_code: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, StoreError> {
        let (good, bad) = match kind {
            VoteKind::Good => (1i64, 0i64),
            VoteKind::Bad => (0, 1),
        };
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let (good, bad): (i64, i64) = conn.query_row(
            "INSERT INTO menu_votes (date, school_code, good, bad) VALUES (?, ?, ?, ?)
             ON CONFLICT (date, school_code) DO UPDATE
             SET good = menu_votes.good + excluded.good, bad = menu_votes.bad + excluded.bad
             RETURNING good, bad",
            params![key(date), school_code, good, bad],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        info!(%date, school_code, %kind, good, bad, "vote recorded");
        Ok(VoteCounts {
            good: good.max(0) as u64,
            bad: bad.max(0) as u64,
        })
    }
}
