//! Timeline fetcher for the infosoud enrichment source.
//!
//! One enrichment request per case identifier, with a bounded number of
//! backed-off attempts on transient failures. The fetcher classifies every
//! failure as transient or permanent for the orchestrator's recovery
//! bookkeeping; it never touches the checkpoint ledger, keeping fetch logic
//! and checkpoint bookkeeping independently testable.

mod retry;
mod timeline;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use courtline_shared::{CaseId, CourtlineError, EnrichConfig, FetchError, Result, TimelineEvent};

pub use retry::RetryPolicy;

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("Courtline/", env!("CARGO_PKG_VERSION"));

/// Fetches the judicial timeline for one case from infosoud.
pub struct TimelineFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl TimelineFetcher {
    /// Build a fetcher from the runtime enrichment configuration.
    pub fn new(config: &EnrichConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CourtlineError::config(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            retry: RetryPolicy::from(config),
        })
    }

    /// Replace the retry policy (zero-delay in tests).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch the timeline events for one case.
    ///
    /// Transient failures (network errors, timeouts, 5xx, 429) are retried
    /// up to the policy's attempt bound with exponential backoff; permanent
    /// failures (unknown case id) are reported immediately. A result page
    /// without the proceedings table yields `Ok(vec![])`.
    #[instrument(skip_all, fields(case_id = %case_id))]
    pub async fn fetch(
        &self,
        case_id: &CaseId,
    ) -> std::result::Result<Vec<TimelineEvent>, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                let delay = self.retry.delay_for(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                tokio::time::sleep(delay).await;
            }

            match self.attempt(case_id).await {
                Ok(events) => {
                    debug!(attempt, events = events.len(), "timeline fetched");
                    return Ok(events);
                }
                Err(e) if e.is_transient() => {
                    warn!(attempt, error = %e, "transient fetch failure");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| FetchError::transient("fetch attempts exhausted")))
    }

    /// One network attempt.
    async fn attempt(
        &self,
        case_id: &CaseId,
    ) -> std::result::Result<Vec<TimelineEvent>, FetchError> {
        let response = self
            .client
            .get(case_id.as_str())
            .send()
            .await
            .map_err(|e| FetchError::transient(format!("{case_id}: {e}")))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::transient(format!("{case_id}: HTTP {status}")));
        }
        if !status.is_success() {
            // 4xx: the case id is not known to the source
            return Err(FetchError::permanent(format!("{case_id}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transient(format!("{case_id}: body read failed: {e}")))?;

        Ok(timeline::extract_timeline(&body))
    }
}
