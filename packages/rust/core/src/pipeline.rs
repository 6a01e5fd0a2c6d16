//! Checkpointed enrichment orchestrator: input → pending → fetch → ledger →
//! augmented dataset.
//!
//! Cases are processed strictly sequentially. Each attempt is checkpointed
//! before the request goes out, so an interrupted run never repeats a
//! completed case and never loses an attempt against the retry budget.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument, warn};

use courtline_fetcher::TimelineFetcher;
use courtline_ledger::Ledger;
use courtline_shared::{
    CaseId, CaseRecord, CheckpointEntry, CheckpointStatus, EnrichConfig, FetchError, Result,
    TimelineEvent,
};

use crate::output::EnrichedCase;

/// Source of timeline events for one case. The production implementation
/// is [`TimelineFetcher`]; tests script outcomes per case id.
#[allow(async_fn_in_trait)]
pub trait TimelineSource {
    async fn fetch(
        &self,
        case_id: &CaseId,
    ) -> std::result::Result<Vec<TimelineEvent>, FetchError>;
}

impl TimelineSource for TimelineFetcher {
    async fn fetch(
        &self,
        case_id: &CaseId,
    ) -> std::result::Result<Vec<TimelineEvent>, FetchError> {
        TimelineFetcher::fetch(self, case_id).await
    }
}

/// Progress callbacks for reporting enrichment status to a frontend.
pub trait EnrichProgress: Send + Sync {
    /// A case is about to be fetched (`current` is 1-based within `total`
    /// pending cases).
    fn case_started(&self, case_id: &CaseId, current: usize, total: usize);
    /// A case reached a terminal status.
    fn case_finished(&self, case_id: &CaseId, status: CheckpointStatus);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl EnrichProgress for SilentProgress {
    fn case_started(&self, _case_id: &CaseId, _current: usize, _total: usize) {}
    fn case_finished(&self, _case_id: &CaseId, _status: CheckpointStatus) {}
}

/// Result of one enrichment run.
#[derive(Debug)]
pub struct EnrichOutcome {
    /// One output row per input case, in input order.
    pub rows: Vec<EnrichedCase>,
    /// Cases that reached `done` during this run.
    pub done: usize,
    /// Cases that reached `failed-exhausted` during this run.
    pub failed: usize,
    /// Cases skipped because a previous run already finished them.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Run the enrichment pass over `records`.
///
/// Resumable: cases already terminal in the ledger are not fetched again,
/// but their previously stored events still appear in the output. The
/// ledger must belong to this input set; a ledger with foreign case ids is
/// rejected before any request is made.
#[instrument(skip_all, fields(cases = records.len()))]
pub async fn enrich<S: TimelineSource>(
    config: &EnrichConfig,
    records: Vec<CaseRecord>,
    ledger: &Ledger,
    source: &S,
    progress: &dyn EnrichProgress,
) -> Result<EnrichOutcome> {
    let start = Instant::now();
    let ids: Vec<CaseId> = records.iter().map(|r| r.id.clone()).collect();

    ledger.validate(&ids).await?;
    let run_id = ledger.begin_run().await?;
    let pending = ledger.pending_cases(&ids).await?;
    let skipped = ids.len() - pending.len();

    info!(
        %run_id,
        total = ids.len(),
        pending = pending.len(),
        skipped,
        "starting enrichment run"
    );

    let mut done = 0usize;
    let mut failed = 0usize;

    for (i, case_id) in pending.iter().enumerate() {
        progress.case_started(case_id, i + 1, pending.len());

        let status = enrich_case(config, case_id, ledger, source).await?;
        match status {
            CheckpointStatus::Done => done += 1,
            CheckpointStatus::FailedExhausted => failed += 1,
            CheckpointStatus::Pending => {}
        }
        progress.case_finished(case_id, status);

        if config.rate_limit_ms > 0 && i + 1 < pending.len() {
            tokio::time::sleep(Duration::from_millis(config.rate_limit_ms)).await;
        }
    }

    let rows = assemble_rows(records, ledger).await?;

    let stats = serde_json::json!({
        "total": ids.len(),
        "done": done,
        "failed": failed,
        "skipped": skipped,
    });
    ledger.finish_run(&run_id, &stats.to_string()).await?;

    let elapsed = start.elapsed();
    info!(%run_id, done, failed, skipped, elapsed_ms = elapsed.as_millis() as u64, "enrichment run finished");

    Ok(EnrichOutcome {
        rows,
        done,
        failed,
        skipped,
        elapsed,
    })
}

/// Drive one case to a terminal status, spending at most the remaining
/// retry budget. Returns the status the case ended the run with.
async fn enrich_case<S: TimelineSource>(
    config: &EnrichConfig,
    case_id: &CaseId,
    ledger: &Ledger,
    source: &S,
) -> Result<CheckpointStatus> {
    let budget = config.retry_budget.max(1);
    let mut attempts = match ledger.get(case_id).await? {
        Some(entry) => entry.attempts,
        None => 0,
    };

    while attempts < budget {
        attempts += 1;

        // checkpoint the attempt before the request so a crash mid-fetch
        // still counts it against the budget
        ledger
            .record(&CheckpointEntry {
                case_id: case_id.clone(),
                status: CheckpointStatus::Pending,
                attempts,
                last_attempt_at: Utc::now(),
                last_error: None,
            })
            .await?;

        match source.fetch(case_id).await {
            Ok(events) => {
                ledger.store_events(case_id, &events).await?;
                ledger
                    .record(&CheckpointEntry {
                        case_id: case_id.clone(),
                        status: CheckpointStatus::Done,
                        attempts,
                        last_attempt_at: Utc::now(),
                        last_error: None,
                    })
                    .await?;
                return Ok(CheckpointStatus::Done);
            }
            Err(e) => {
                let exhausted = !e.is_transient() || attempts >= budget;
                let status = if exhausted {
                    CheckpointStatus::FailedExhausted
                } else {
                    CheckpointStatus::Pending
                };
                warn!(case_id = %case_id, attempts, %status, error = %e, "fetch failed");
                ledger
                    .record(&CheckpointEntry {
                        case_id: case_id.clone(),
                        status,
                        attempts,
                        last_attempt_at: Utc::now(),
                        last_error: Some(e.to_string()),
                    })
                    .await?;
                if exhausted {
                    return Ok(CheckpointStatus::FailedExhausted);
                }
            }
        }
    }

    // budget was already spent by earlier runs
    ledger
        .record(&CheckpointEntry {
            case_id: case_id.clone(),
            status: CheckpointStatus::FailedExhausted,
            attempts,
            last_attempt_at: Utc::now(),
            last_error: Some("retry budget exhausted".to_string()),
        })
        .await?;
    Ok(CheckpointStatus::FailedExhausted)
}

/// Build one output row per input record, in input order, pulling events
/// stored by this or any previous run.
async fn assemble_rows(records: Vec<CaseRecord>, ledger: &Ledger) -> Result<Vec<EnrichedCase>> {
    let entries: HashMap<CaseId, CheckpointEntry> = ledger.load().await?;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let status = entries
            .get(&record.id)
            .map(|e| e.status)
            .unwrap_or(CheckpointStatus::Pending);
        let events = if status == CheckpointStatus::Done {
            ledger.events_for(&record.id).await?
        } else {
            Vec::new()
        };
        rows.push(EnrichedCase::new(record, status, &events));
    }
    Ok(rows)
}
