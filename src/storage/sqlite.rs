//! SQLite run log
//!
//! This module provides a SQLite-based implementation of the RunHistory trait
//! and plugs it into the engine as a `RunLog`.

use crate::output::{OutputError, OutputResult, RunLog, RunSummary, SummaryItem};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RunHistory, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const RUN_COLUMNS: &str = "id, pipeline, source, started_at, finished_at, status, config_hash, \
     total_links, success_count, failed_count, duplicate_count, skipped_count, success_rate";

/// SQLite run history
pub struct SqliteRunLog {
    conn: Mutex<Connection>,
}

impl SqliteRunLog {
    /// Opens or creates the run log database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRunLog)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("Connection lock poisoned".to_string()))
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        pipeline: row.get(1)?,
        source: row.get(2)?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Completed),
        config_hash: row.get(6)?,
        total_links: row.get(7)?,
        success_count: row.get(8)?,
        failed_count: row.get(9)?,
        duplicate_count: row.get(10)?,
        skipped_count: row.get(11)?,
        success_rate: row.get(12)?,
    })
}

impl RunHistory for SqliteRunLog {
    fn insert_run(&self, summary: &RunSummary) -> StorageResult<i64> {
        let settings = serde_json::to_string(&summary.settings_used)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let status = if summary.cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (pipeline, source, started_at, finished_at, status, config_hash,
                settings_json, total_links, success_count, failed_count, duplicate_count,
                skipped_count, success_rate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                summary.pipeline,
                summary.source,
                summary.started_at.to_rfc3339(),
                summary.finished_at.to_rfc3339(),
                status.to_db_string(),
                summary.settings_hash,
                settings,
                summary.total_links as i64,
                summary.success_count as i64,
                summary.failed_count as i64,
                summary.duplicate_count as i64,
                summary.skipped_count as i64,
                summary.success_rate,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO run_items (run_id, position, raw_input, normalized_url, domain,
                    status, attempts, error_message, title, redirect_target, status_code,
                    latency_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;

            for item in &summary.items {
                stmt.execute(params![
                    run_id,
                    item.position as i64,
                    item.raw_input,
                    item.normalized_url,
                    item.domain,
                    item.status,
                    item.attempts as i64,
                    item.error,
                    item.title,
                    item.redirect_target,
                    item.status_code.map(i64::from),
                    item.latency_ms.map(|ms| ms as i64),
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            "Stored run {} with {} items",
            run_id,
            summary.items.len()
        );

        Ok(run_id)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let conn = self.lock()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?;

        run.ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    fn run_items(&self, run_id: i64) -> StorageResult<Vec<SummaryItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT position, raw_input, normalized_url, domain, status, attempts,
                error_message, title, redirect_target, status_code, latency_ms
             FROM run_items WHERE run_id = ?1 ORDER BY position",
        )?;

        let items = stmt
            .query_map(params![run_id], |row| {
                Ok(SummaryItem {
                    position: row.get::<_, i64>(0)? as usize,
                    raw_input: row.get(1)?,
                    normalized_url: row.get(2)?,
                    domain: row.get(3)?,
                    status: row.get(4)?,
                    attempts: row.get::<_, i64>(5)? as u32,
                    error: row.get(6)?,
                    title: row.get(7)?,
                    redirect_target: row.get(8)?,
                    status_code: row.get::<_, Option<i64>>(9)?.map(|code| code as u16),
                    latency_ms: row.get::<_, Option<i64>>(10)?.map(|ms| ms as u64),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }
}

#[async_trait]
impl RunLog for SqliteRunLog {
    fn name(&self) -> &str {
        "sqlite run log"
    }

    async fn append(&self, summary: &RunSummary) -> OutputResult<()> {
        self.insert_run(summary)
            .map(|_| ())
            .map_err(|e| OutputError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_summary(cancelled: bool) -> RunSummary {
        RunSummary {
            pipeline: "import".to_string(),
            source: "links.txt".to_string(),
            total_links: 2,
            success_count: 1,
            failed_count: 1,
            duplicate_count: 0,
            skipped_count: 0,
            status_counts: vec![("success".to_string(), 1), ("failed".to_string(), 1)],
            success_rate: 0.5,
            cancelled,
            items: vec![
                SummaryItem {
                    position: 0,
                    raw_input: "example.com".to_string(),
                    normalized_url: "https://example.com".to_string(),
                    domain: "example.com".to_string(),
                    status: "success".to_string(),
                    attempts: 0,
                    error: None,
                    title: Some("Example".to_string()),
                    redirect_target: None,
                    status_code: None,
                    latency_ms: None,
                },
                SummaryItem {
                    position: 1,
                    raw_input: "bad.org".to_string(),
                    normalized_url: "https://bad.org".to_string(),
                    domain: "bad.org".to_string(),
                    status: "failed".to_string(),
                    attempts: 2,
                    error: Some("HTTP 500".to_string()),
                    title: None,
                    redirect_target: None,
                    status_code: Some(500),
                    latency_ms: Some(87),
                },
            ],
            settings_used: serde_json::json!({"concurrency-limit": 5}),
            settings_hash: "abc".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get_run() {
        let log = SqliteRunLog::new_in_memory().unwrap();
        let run_id = log.insert_run(&create_test_summary(false)).unwrap();

        let run = log.get_run(run_id).unwrap();
        assert_eq!(run.pipeline, "import");
        assert_eq!(run.source, "links.txt");
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.config_hash, "abc");
        assert_eq!(run.total_links, 2);
        assert_eq!(run.failed_count, 1);
        assert!((run.success_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_items_roundtrip_in_order() {
        let log = SqliteRunLog::new_in_memory().unwrap();
        let summary = create_test_summary(false);
        let run_id = log.insert_run(&summary).unwrap();

        let items = log.run_items(run_id).unwrap();
        assert_eq!(items, summary.items);
    }

    #[test]
    fn test_recent_runs_newest_first() {
        let log = SqliteRunLog::new_in_memory().unwrap();
        let first = log.insert_run(&create_test_summary(false)).unwrap();
        let second = log.insert_run(&create_test_summary(true)).unwrap();

        let runs = log.recent_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, second);
        assert_eq!(runs[0].status, RunStatus::Cancelled);
        assert_eq!(runs[1].id, first);

        assert_eq!(log.recent_runs(1).unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing_run() {
        let log = SqliteRunLog::new_in_memory().unwrap();
        assert!(matches!(log.get_run(42), Err(StorageError::RunNotFound(42))));
    }

    #[tokio::test]
    async fn test_append_through_run_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = SqliteRunLog::new(&dir.path().join("runs.db")).unwrap();

        log.append(&create_test_summary(false)).await.unwrap();
        assert_eq!(log.recent_runs(5).unwrap().len(), 1);
    }
}
