//! SQL migration definitions for the checkpoint ledger database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as one batch.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: checkpoint, timeline_events, enrichment_runs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per case identifier; the single source of truth for
-- "is this case finished". Rows are upserted, never deleted.
CREATE TABLE IF NOT EXISTS checkpoint (
    case_id         TEXT PRIMARY KEY,
    status          TEXT NOT NULL CHECK (status IN ('pending', 'done', 'failed-exhausted')),
    attempts        INTEGER NOT NULL DEFAULT 0,
    last_attempt_at TEXT NOT NULL,
    last_error      TEXT
);

CREATE INDEX IF NOT EXISTS idx_checkpoint_status ON checkpoint(status);

-- Timeline events fetched for done cases, so a resumed run can emit
-- prior successes without re-fetching.
CREATE TABLE IF NOT EXISTS timeline_events (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id    TEXT NOT NULL REFERENCES checkpoint(case_id),
    kind       TEXT NOT NULL,
    event_date TEXT,
    raw_label  TEXT NOT NULL,
    raw_date   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_timeline_case ON timeline_events(case_id);

-- Enrichment run journal
CREATE TABLE IF NOT EXISTS enrichment_runs (
    id          TEXT PRIMARY KEY,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    stats_json  TEXT
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
