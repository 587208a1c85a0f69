//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{Finding, PageResult, ResultSet};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunSummary};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, seed_url, started_at, finished_at, config_hash, status, visited_count, result_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_findings(&self, page_result_id: i64) -> StorageResult<Vec<Finding>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, keyword, occurrences FROM findings
             WHERE page_result_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map(params![page_result_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut context_stmt = self.conn.prepare(
            "SELECT context FROM finding_contexts WHERE finding_id = ?1 ORDER BY position",
        )?;

        let mut findings = Vec::with_capacity(rows.len());
        for (finding_id, keyword, occurrences) in rows {
            let contexts = context_stmt
                .query_map(params![finding_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            findings.push(Finding {
                keyword,
                occurrences: usize::try_from(occurrences).map_err(|_| {
                    StorageError::InvalidValue(format!("occurrences = {}", occurrences))
                })?,
                contexts,
            });
        }

        Ok(findings)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        visited_count: row.get::<_, i64>(6)? as u64,
        result_count: row.get::<_, i64>(7)? as u64,
    })
}

/// Inserts one page result with its findings and contexts
fn insert_page_result(
    tx: &Transaction<'_>,
    run_id: i64,
    position: usize,
    result: &PageResult,
) -> StorageResult<()> {
    tx.execute(
        "INSERT INTO page_results (run_id, position, url, title) VALUES (?1, ?2, ?3, ?4)",
        params![run_id, position as i64, result.url, result.title],
    )?;
    let page_result_id = tx.last_insert_rowid();

    for (finding_pos, finding) in result.findings.iter().enumerate() {
        tx.execute(
            "INSERT INTO findings (page_result_id, position, keyword, occurrences)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                page_result_id,
                finding_pos as i64,
                finding.keyword,
                finding.occurrences as i64
            ],
        )?;
        let finding_id = tx.last_insert_rowid();

        for (context_pos, context) in finding.contexts.iter().enumerate() {
            tx.execute(
                "INSERT INTO finding_contexts (finding_id, position, context) VALUES (?1, ?2, ?3)",
                params![finding_id, context_pos as i64, context],
            )?;
        }
    }

    Ok(())
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn record_run(&mut self, run: &RunSummary<'_>, results: &ResultSet) -> StorageResult<i64> {
        // Dropping the transaction on an early return rolls everything back
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (seed_url, started_at, finished_at, config_hash, status,
                               visited_count, result_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run.seed_url,
                run.started_at.to_rfc3339(),
                run.finished_at.to_rfc3339(),
                run.config_hash,
                run.status.to_db_string(),
                run.visited_count as i64,
                results.len() as i64
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for (position, result) in results.iter().enumerate() {
            insert_page_result(&tx, run_id, position, result)?;
        }

        tx.commit()?;
        Ok(run_id)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    // ===== Results =====

    fn load_results(&self, run_id: i64) -> StorageResult<ResultSet> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title FROM page_results WHERE run_id = ?1 ORDER BY position",
        )?;
        let pages = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = ResultSet::new();
        for (id, url, title) in pages {
            let findings = self.load_findings(id)?;
            // Rows without findings are never written by record_run
            if let Some(result) = PageResult::new(url, title, findings) {
                results.push(result);
            }
        }

        Ok(results)
    }
}
