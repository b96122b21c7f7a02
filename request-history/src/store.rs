//! SQLite-backed request log.
//!
//! One connection is opened at startup and shared behind a mutex; every query
//! runs on Tokio's blocking pool so request handlers never block a worker.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::HistoryError;
use crate::model::{HistoryRecord, HistoryStats, ModelStats, NewAnswer};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS requests_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    question TEXT,
    model_name TEXT,
    answer TEXT,
    duration REAL
);
"#;

#[derive(Clone)]
pub struct HistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    /// Opens (creating if needed) the database file and its table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| HistoryError::Open {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "history database opened");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory().map_err(|source| HistoryError::Open {
            path: ":memory:".into(),
            source,
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, HistoryError>
    where
        F: FnOnce(&mut Connection) -> Result<T, HistoryError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| HistoryError::Poisoned)?;
            f(&mut guard)
        })
        .await?
    }

    /// Writes all answers for `question` atomically: either every row lands
    /// or none does.
    pub async fn record_exchange(
        &self,
        question: &str,
        answers: Vec<NewAnswer>,
    ) -> Result<(), HistoryError> {
        let question = question.to_string();
        let rows = answers.len();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO requests_history (question, model_name, answer, duration)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for a in &answers {
                    stmt.execute(params![question, a.model_name, a.answer, a.duration])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;
        debug!(rows, "exchange recorded");
        Ok(())
    }

    /// Per-model count and duration aggregates, busiest model first.
    pub async fn stats(&self) -> Result<HistoryStats, HistoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT model_name,
                        COUNT(*) AS request_count,
                        AVG(duration), MIN(duration), MAX(duration)
                 FROM requests_history
                 GROUP BY model_name
                 ORDER BY request_count DESC, model_name ASC",
            )?;
            let models = stmt
                .query_map([], |row| {
                    Ok(ModelStats {
                        model: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        request_count: row.get::<_, i64>(1)? as u64,
                        avg_duration: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                        min_duration: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
                        max_duration: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let total_requests = models.iter().map(|m| m.request_count).sum();
            Ok(HistoryStats {
                models,
                total_requests,
            })
        })
        .await
    }

    /// Up to `limit` rows, newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<HistoryRecord>, HistoryError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, question, model_name, answer, duration
                 FROM requests_history
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok(HistoryRecord {
                        id: row.get(0)?,
                        timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        question: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        model_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        answer: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        duration: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Deletes every row; returns how many were removed.
    pub async fn clear(&self) -> Result<u64, HistoryError> {
        let removed = self
            .with_conn(|conn| Ok(conn.execute("DELETE FROM requests_history", [])? as u64))
            .await?;
        info!(removed, "history cleared");
        Ok(removed)
    }

    pub async fn count(&self) -> Result<u64, HistoryError> {
        self.with_conn(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM requests_history", [], |r| r.get(0))?;
            Ok(n as u64)
        })
        .await
    }
}
