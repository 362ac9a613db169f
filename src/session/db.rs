//! SQLite database for session results
//!
//! Uses WAL mode so a session can be inspected while another one is written.

use rusqlite::{Connection, Result, params};
use std::path::Path;

use crate::env::Team;

use super::runner::EpisodeResult;
use super::summary::SessionSummary;

/// Database wrapper for session results
pub struct SessionDatabase {
    conn: Connection,
}

/// Win/draw counts for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinCounts {
    pub player: u32,
    pub computer: u32,
    pub draws: u32,
}

impl SessionDatabase {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                map_name TEXT NOT NULL,
                team_size INTEGER NOT NULL,
                base_seed INTEGER NOT NULL,
                mean_reward REAL NOT NULL,
                mean_steps REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS episodes (
                id INTEGER PRIMARY KEY,
                session_id TEXT REFERENCES sessions(id),
                episode INTEGER NOT NULL,
                seed INTEGER NOT NULL,
                steps INTEGER NOT NULL,
                total_reward REAL NOT NULL,
                winner TEXT NOT NULL,
                possession_changes INTEGER NOT NULL,
                player_possession_steps INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_session ON episodes(session_id);
            "#,
        )
    }

    /// Store a session and all its episodes, returning the session ID
    pub fn store_session(&self, summary: &SessionSummary) -> Result<String> {
        self.conn.execute(
            r#"INSERT INTO sessions
               (id, created_at, map_name, team_size, base_seed, mean_reward, mean_steps)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                summary.session_id,
                summary.created_at,
                summary.map_name,
                summary.team_size as i64,
                summary.base_seed as i64,
                summary.mean_reward,
                summary.mean_steps,
            ],
        )?;

        for episode in &summary.episodes {
            self.insert_episode(&summary.session_id, episode)?;
        }

        Ok(summary.session_id.clone())
    }

    /// Insert one episode result and return its row ID
    pub fn insert_episode(&self, session_id: &str, result: &EpisodeResult) -> Result<i64> {
        let winner = result.winner.map(|t| t.as_str()).unwrap_or("NONE");
        self.conn.execute(
            r#"INSERT INTO episodes
               (session_id, episode, seed, steps, total_reward, winner,
                possession_changes, player_possession_steps)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                session_id,
                result.episode,
                result.seed as i64,
                result.steps,
                result.total_reward,
                winner,
                result.possession_changes,
                result.player_possession_steps,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Count wins per team for a session
    pub fn win_counts(&self, session_id: &str) -> Result<WinCounts> {
        self.conn.query_row(
            r#"SELECT
                COALESCE(SUM(CASE WHEN winner = ?2 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN winner = ?3 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN winner = 'NONE' THEN 1 ELSE 0 END), 0)
               FROM episodes WHERE session_id = ?1"#,
            params![session_id, Team::Player.as_str(), Team::Computer.as_str()],
            |row| {
                Ok(WinCounts {
                    player: row.get(0)?,
                    computer: row.get(1)?,
                    draws: row.get(2)?,
                })
            },
        )
    }

    /// Get episode count across all sessions
    pub fn episode_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))
    }

    pub fn session_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
    }
}
