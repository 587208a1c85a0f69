//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the run database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    visited_count INTEGER NOT NULL DEFAULT 0,
    result_count INTEGER NOT NULL DEFAULT 0
);

-- Pages that produced at least one finding
CREATE TABLE IF NOT EXISTS page_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_page_results_run ON page_results(run_id);

-- One row per keyword (or EMAIL / PHONE) per page
CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_result_id INTEGER NOT NULL REFERENCES page_results(id),
    position INTEGER NOT NULL,
    keyword TEXT NOT NULL,
    occurrences INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_findings_page ON findings(page_result_id);
CREATE INDEX IF NOT EXISTS idx_findings_keyword ON findings(keyword);

-- Context snippets, in extraction order
CREATE TABLE IF NOT EXISTS finding_contexts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    finding_id INTEGER NOT NULL REFERENCES findings(id),
    position INTEGER NOT NULL,
    context TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_finding_contexts_finding ON finding_contexts(finding_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Version stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;
