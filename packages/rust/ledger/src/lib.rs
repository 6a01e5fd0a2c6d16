//! Durable checkpoint ledger on libSQL.
//!
//! The [`Ledger`] wraps a local libSQL database holding per-case enrichment
//! status, fetched timeline events, and a run journal. It is the single
//! source of truth for "is this case finished" and must survive process
//! restarts: every [`Ledger::record`] is an atomic per-entry upsert that is
//! durably persisted before the call returns.
//!
//! Status transitions are monotonic — an entry never leaves `done` or
//! `failed-exhausted`. Downgrade attempts are ignored with a warning.

mod migrations;

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::warn;
use uuid::Uuid;

use courtline_shared::{
    CaseId, CheckpointEntry, CheckpointStatus, CourtlineError, EventKind, Result, TimelineEvent,
};

/// Checkpoint ledger handle wrapping a libSQL database.
///
/// Opened at run start and dropped at run end — there is no hidden
/// process-wide state beyond the database file itself.
pub struct Ledger {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

/// Aggregate entry counts, for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub done: u64,
    pub failed_exhausted: u64,
    pub pending: u64,
}

impl Ledger {
    /// Open or create a ledger database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CourtlineError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        let ledger = Self { db, conn };
        ledger.run_migrations().await?;
        Ok(ledger)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    CourtlineError::Ledger(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Checkpoint operations
    // -----------------------------------------------------------------------

    /// Record a per-case outcome. Idempotent atomic upsert, durable before
    /// returning. Transitions away from a terminal status are ignored.
    pub async fn record(&self, entry: &CheckpointEntry) -> Result<()> {
        if let Some(existing) = self.get(&entry.case_id).await? {
            if existing.status.is_terminal() && existing.status != entry.status {
                warn!(
                    case_id = %entry.case_id,
                    from = %existing.status,
                    to = %entry.status,
                    "ignoring checkpoint status downgrade"
                );
                return Ok(());
            }
        }

        self.conn
            .execute(
                "INSERT INTO checkpoint (case_id, status, attempts, last_attempt_at, last_error)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(case_id) DO UPDATE SET
                   status = excluded.status,
                   attempts = excluded.attempts,
                   last_attempt_at = excluded.last_attempt_at,
                   last_error = excluded.last_error",
                params![
                    entry.case_id.as_str(),
                    entry.status.as_str(),
                    entry.attempts as i64,
                    entry.last_attempt_at.to_rfc3339(),
                    entry.last_error.as_deref(),
                ],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
        Ok(())
    }

    /// Get the checkpoint entry for a single case, if one exists.
    pub async fn get(&self, case_id: &CaseId) -> Result<Option<CheckpointEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT case_id, status, attempts, last_attempt_at, last_error
                 FROM checkpoint WHERE case_id = ?1",
                params![case_id.as_str()],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_entry(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(CourtlineError::Ledger(e.to_string())),
        }
    }

    /// Full-scan reload of every checkpoint entry.
    pub async fn load(&self) -> Result<HashMap<CaseId, CheckpointEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT case_id, status, attempts, last_attempt_at, last_error
                 FROM checkpoint ORDER BY case_id",
                params![],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        let mut entries = HashMap::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?
        {
            let entry = row_to_entry(&row)?;
            entries.insert(entry.case_id.clone(), entry);
        }
        Ok(entries)
    }

    /// Remaining work: `all_ids` minus every id with a terminal entry, in
    /// the stable input order. No entry for an id implies it is pending.
    pub async fn pending_cases(&self, all_ids: &[CaseId]) -> Result<Vec<CaseId>> {
        let entries = self.load().await?;
        Ok(all_ids
            .iter()
            .filter(|id| {
                entries
                    .get(id)
                    .is_none_or(|entry| !entry.status.is_terminal())
            })
            .cloned()
            .collect())
    }

    /// Check ledger consistency against the input set: every recorded id
    /// must be present in `all_ids`.
    pub async fn validate(&self, all_ids: &[CaseId]) -> Result<()> {
        let known: std::collections::HashSet<&CaseId> = all_ids.iter().collect();
        let entries = self.load().await?;

        let unknown: Vec<&str> = entries
            .keys()
            .filter(|id| !known.contains(id))
            .map(|id| id.as_str())
            .collect();

        if !unknown.is_empty() {
            return Err(CourtlineError::validation(format!(
                "ledger has {} case ids not present in the input data: {}",
                unknown.len(),
                unknown.join(", ")
            )));
        }
        Ok(())
    }

    /// Aggregate counts by status.
    pub async fn summary(&self) -> Result<LedgerSummary> {
        let mut rows = self
            .conn
            .query(
                "SELECT status, COUNT(*) FROM checkpoint GROUP BY status",
                params![],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        let mut summary = LedgerSummary::default();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?
        {
            let status: String = row
                .get(0)
                .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
            let count: u64 = row.get::<i64>(1).unwrap_or(0) as u64;
            match CheckpointStatus::parse(&status) {
                Some(CheckpointStatus::Done) => summary.done = count,
                Some(CheckpointStatus::FailedExhausted) => summary.failed_exhausted = count,
                Some(CheckpointStatus::Pending) => summary.pending = count,
                None => warn!(%status, "unknown status value in ledger"),
            }
        }
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Timeline event storage
    // -----------------------------------------------------------------------

    /// Persist the fetched timeline for a case. Replaces any prior events
    /// for the same case, so a re-fetch is idempotent.
    pub async fn store_events(&self, case_id: &CaseId, events: &[TimelineEvent]) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM timeline_events WHERE case_id = ?1",
                params![case_id.as_str()],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        for event in events {
            self.conn
                .execute(
                    "INSERT INTO timeline_events (case_id, kind, event_date, raw_label, raw_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        case_id.as_str(),
                        event.kind.as_str(),
                        event.date.map(|d| d.to_string()),
                        event.raw_label.as_str(),
                        event.raw_date.as_str(),
                    ],
                )
                .await
                .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
        }
        Ok(())
    }

    /// Load the stored timeline for a case (empty if none recorded).
    pub async fn events_for(&self, case_id: &CaseId) -> Result<Vec<TimelineEvent>> {
        let mut rows = self
            .conn
            .query(
                "SELECT kind, event_date, raw_label, raw_date
                 FROM timeline_events WHERE case_id = ?1 ORDER BY id",
                params![case_id.as_str()],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;

        let mut events = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?
        {
            let kind_str: String = row
                .get(0)
                .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
            let kind = EventKind::parse(&kind_str)
                .ok_or_else(|| CourtlineError::Ledger(format!("invalid event kind: {kind_str}")))?;
            let date: Option<String> = row.get::<String>(1).ok();
            events.push(TimelineEvent {
                kind,
                date: date.as_deref().and_then(|d| d.parse().ok()),
                raw_label: row
                    .get::<String>(2)
                    .map_err(|e| CourtlineError::Ledger(e.to_string()))?,
                raw_date: row
                    .get::<String>(3)
                    .map_err(|e| CourtlineError::Ledger(e.to_string()))?,
            });
        }
        Ok(events)
    }

    // -----------------------------------------------------------------------
    // Run journal
    // -----------------------------------------------------------------------

    /// Insert a new enrichment run row. Returns the generated run ID.
    pub async fn begin_run(&self) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO enrichment_runs (id, started_at) VALUES (?1, ?2)",
                params![id.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
        Ok(id)
    }

    /// Mark a run finished with its stats.
    pub async fn finish_run(&self, run_id: &str, stats_json: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "UPDATE enrichment_runs SET finished_at = ?1, stats_json = ?2 WHERE id = ?3",
                params![now.as_str(), stats_json, run_id],
            )
            .await
            .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
        Ok(())
    }
}

/// Convert a database row to a [`CheckpointEntry`].
fn row_to_entry(row: &libsql::Row) -> Result<CheckpointEntry> {
    let status_str: String = row
        .get(1)
        .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
    let status = CheckpointStatus::parse(&status_str)
        .ok_or_else(|| CourtlineError::Ledger(format!("invalid status value: {status_str}")))?;

    Ok(CheckpointEntry {
        case_id: CaseId::new(
            row.get::<String>(0)
                .map_err(|e| CourtlineError::Ledger(e.to_string()))?,
        ),
        status,
        attempts: row.get::<i64>(2).unwrap_or(0) as u32,
        last_attempt_at: {
            let s: String = row
                .get(3)
                .map_err(|e| CourtlineError::Ledger(e.to_string()))?;
            chrono::DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .map_err(|e| CourtlineError::Ledger(format!("invalid timestamp: {e}")))?
        },
        last_error: row.get::<String>(4).ok(),
    })
}
