//! SQLite-based local persistence.
//!
//! Provides storage for:
//! - The timer engine between CLI invocations (key-value table)
//! - Completed countdown history and per-chore totals

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::DatabaseError;

/// One completed countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSessionRecord {
    pub id: i64,
    pub chore_id: String,
    pub chore_name: String,
    pub duration_secs: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimerStats {
    pub total_sessions: u64,
    pub total_secs: u64,
    pub today_sessions: u64,
    pub today_secs: u64,
}

/// SQLite database at `~/.config/choreplan/choreplan.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating file and schema as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("choreplan.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS timer_sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                chore_id      TEXT NOT NULL,
                chore_name    TEXT NOT NULL DEFAULT '',
                duration_secs INTEGER NOT NULL,
                started_at    TEXT NOT NULL,
                completed_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_timer_sessions_completed_at
                ON timer_sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_timer_sessions_chore_id
                ON timer_sessions(chore_id);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Countdown history ────────────────────────────────────────────

    /// Record a completed countdown.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_timer_session(
        &self,
        chore_id: &str,
        chore_name: &str,
        duration_secs: u64,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO timer_sessions (chore_id, chore_name, duration_secs, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                chore_id,
                chore_name,
                duration_secs,
                started_at.to_rfc3339(),
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent completed countdowns, newest first.
    pub fn recent_sessions(&self, limit: u32) -> Result<Vec<TimerSessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, chore_id, chore_name, duration_secs, started_at, completed_at
             FROM timer_sessions
             ORDER BY completed_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, chore_id, chore_name, duration_secs, started_at, completed_at) = row?;
            records.push(TimerSessionRecord {
                id,
                chore_id,
                chore_name,
                duration_secs,
                started_at: parse_timestamp(&started_at)?,
                completed_at: parse_timestamp(&completed_at)?,
            });
        }
        Ok(records)
    }

    /// Totals for all time and for today.
    pub fn stats(&self) -> Result<TimerStats, DatabaseError> {
        let (total_sessions, total_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0) FROM timer_sessions",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let (today_sessions, today_secs) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM timer_sessions
             WHERE completed_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        Ok(TimerStats {
            total_sessions,
            total_secs,
            today_sessions,
            today_secs,
        })
    }

    /// Total countdown seconds per chore, most-practiced first.
    pub fn chore_totals(&self) -> Result<Vec<(String, u64)>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT chore_id, COALESCE(SUM(duration_secs), 0) AS total
             FROM timer_sessions
             GROUP BY chore_id
             ORDER BY total DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut totals = Vec::new();
        for row in rows {
            totals.push(row?);
        }
        Ok(totals)
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn kv_roundtrip_and_overwrite() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("engine").unwrap(), None);

        db.kv_set("engine", "{}").unwrap();
        assert_eq!(db.kv_get("engine").unwrap().as_deref(), Some("{}"));

        db.kv_set("engine", r#"{"state":"idle"}"#).unwrap();
        assert_eq!(
            db.kv_get("engine").unwrap().as_deref(),
            Some(r#"{"state":"idle"}"#)
        );

        db.kv_delete("engine").unwrap();
        assert_eq!(db.kv_get("engine").unwrap(), None);
    }

    #[test]
    fn history_is_returned_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_timer_session("c1", "Dishes", 300, now - Duration::minutes(10), now - Duration::minutes(5))
            .unwrap();
        db.record_timer_session("c2", "Laundry", 600, now - Duration::minutes(5), now)
            .unwrap();

        let recent = db.recent_sessions(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].chore_id, "c2");
        assert_eq!(recent[1].chore_name, "Dishes");
    }

    #[test]
    fn stats_count_today_and_all_time() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_timer_session("c1", "Dishes", 300, now, now).unwrap();
        db.record_timer_session("c1", "Dishes", 300, now, now).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_secs, 600);
        assert_eq!(stats.today_sessions, 2);
        assert_eq!(stats.today_secs, 600);
    }

    #[test]
    fn chore_totals_are_grouped_and_ordered() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_timer_session("c1", "Dishes", 100, now, now).unwrap();
        db.record_timer_session("c2", "Laundry", 500, now, now).unwrap();
        db.record_timer_session("c1", "Dishes", 100, now, now).unwrap();

        let totals = db.chore_totals().unwrap();
        assert_eq!(totals, vec![("c2".to_string(), 500), ("c1".to_string(), 200)]);
    }
}
