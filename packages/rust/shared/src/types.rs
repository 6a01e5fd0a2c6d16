//! Core domain types for the Courtline dataset pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CaseId
// ---------------------------------------------------------------------------

/// Unique key referencing one court decision across both external sources.
///
/// The id is the canonical infosoud query URL for the case, constructed by
/// Stage 1 from the court and the parsed case number. It doubles as the
/// fetch target for timeline enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// CaseRecord
// ---------------------------------------------------------------------------

/// One court decision as produced by Stage 1.
///
/// Read-only to the enrichment core: timeline fields are attached to a
/// separate output row, never written back into the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Unique case identifier (infosoud query URL).
    pub id: CaseId,
    /// Court name as scraped (e.g., "Okresní soud v Chebu").
    pub court: String,
    /// Raw case number string (jednací číslo), e.g. "12 C 123/2020-15".
    pub case_number: String,
    /// Date the decision was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_date: Option<NaiveDate>,
    /// Date the decision was published by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<NaiveDate>,
    /// Free-text keyword list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Raw legal-citation strings, order-preserving, duplicates allowed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    /// Remaining scraped metadata fields, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// TimelineEvent
// ---------------------------------------------------------------------------

/// The judicial-lifecycle milestones tracked from the infosoud
/// "Průběh řízení" table. Rows outside this set are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Zahájení řízení — proceedings initiated.
    ProceedingsStarted,
    /// Nařízení jednání — hearing scheduled.
    HearingScheduled,
    /// Vydání rozhodnutí — decision issued.
    DecisionIssued,
    /// Vyřízení věci — case resolved.
    CaseResolved,
    /// Datum pravomocného ukončení věci — final legal conclusion.
    FinalConclusion,
}

impl EventKind {
    /// All tracked kinds, in lifecycle order. Drives output column order.
    pub const ALL: [EventKind; 5] = [
        EventKind::ProceedingsStarted,
        EventKind::HearingScheduled,
        EventKind::DecisionIssued,
        EventKind::CaseResolved,
        EventKind::FinalConclusion,
    ];

    /// Map an infosoud row label to a tracked kind.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Zahájení řízení" => Some(Self::ProceedingsStarted),
            "Nařízení jednání" => Some(Self::HearingScheduled),
            "Vydání rozhodnutí" => Some(Self::DecisionIssued),
            "Vyřízení věci" => Some(Self::CaseResolved),
            "Datum pravomocného ukončení věci" => Some(Self::FinalConclusion),
            _ => None,
        }
    }

    /// Stable identifier used in ledger storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProceedingsStarted => "proceedings_started",
            Self::HearingScheduled => "hearing_scheduled",
            Self::DecisionIssued => "decision_issued",
            Self::CaseResolved => "case_resolved",
            Self::FinalConclusion => "final_conclusion",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Output column name for this kind (prefixed to avoid collisions with
    /// Stage-1 metadata columns).
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::ProceedingsStarted => "timeline_proceedings_started",
            Self::HearingScheduled => "timeline_hearing_scheduled",
            Self::DecisionIssued => "timeline_decision_issued",
            Self::CaseResolved => "timeline_case_resolved",
            Self::FinalConclusion => "timeline_final_conclusion",
        }
    }
}

/// A dated event in one case's judicial lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Which milestone this row represents.
    pub kind: EventKind,
    /// Event date; the source may omit or garble it.
    pub date: Option<NaiveDate>,
    /// Row label exactly as it appeared in the source, for traceability.
    pub raw_label: String,
    /// Date cell exactly as it appeared in the source.
    pub raw_date: String,
}

// ---------------------------------------------------------------------------
// Checkpoint entries
// ---------------------------------------------------------------------------

/// Per-case enrichment status recorded in the ledger.
///
/// Transitions are monotonic: `Pending → Done` or
/// `Pending → FailedExhausted`, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointStatus {
    Pending,
    Done,
    FailedExhausted,
}

impl CheckpointStatus {
    /// Terminal statuses are never revisited by the orchestrator.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::FailedExhausted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::FailedExhausted => "failed-exhausted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "failed-exhausted" => Some(Self::FailedExhausted),
            _ => None,
        }
    }
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row per case identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointEntry {
    pub case_id: CaseId,
    pub status: CheckpointStatus,
    /// Fetch attempts made so far (across runs).
    pub attempts: u32,
    pub last_attempt_at: DateTime<Utc>,
    /// Summary of the most recent failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_label_mapping() {
        assert_eq!(
            EventKind::from_label("Zahájení řízení"),
            Some(EventKind::ProceedingsStarted)
        );
        assert_eq!(
            EventKind::from_label("  Vydání rozhodnutí "),
            Some(EventKind::DecisionIssued)
        );
        assert_eq!(EventKind::from_label("Doručení obsílky"), None);
    }

    #[test]
    fn event_kind_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        // serde uses the same identifiers
        let json = serde_json::to_string(&EventKind::CaseResolved).expect("serialize");
        assert_eq!(json, "\"case_resolved\"");
    }

    #[test]
    fn status_roundtrip() {
        for status in [
            CheckpointStatus::Pending,
            CheckpointStatus::Done,
            CheckpointStatus::FailedExhausted,
        ] {
            assert_eq!(CheckpointStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CheckpointStatus::parse("unknown"), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!CheckpointStatus::Pending.is_terminal());
        assert!(CheckpointStatus::Done.is_terminal());
        assert!(CheckpointStatus::FailedExhausted.is_terminal());
    }

    #[test]
    fn case_record_roundtrip_keeps_extra_fields() {
        let json = serde_json::json!({
            "id": "https://infosoud.justice.cz/InfoSoud/public/search.do?type=spzn&bcVec=123",
            "court": "Okresní soud v Chebu",
            "case_number": "12 C 123/2020",
            "decision_date": "2021-03-15",
            "references": ["§ 142 odst. 1 o. s. ř."],
            "ecli": "ECLI:CZ:OSCH:2021:12.C.123.2020.1"
        });

        let record: CaseRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(record.court, "Okresní soud v Chebu");
        assert_eq!(record.references.len(), 1);
        assert_eq!(
            record.extra.get("ecli").and_then(|v| v.as_str()),
            Some("ECLI:CZ:OSCH:2021:12.C.123.2020.1")
        );

        let back = serde_json::to_value(&record).expect("serialize");
        assert_eq!(back["ecli"], "ECLI:CZ:OSCH:2021:12.C.123.2020.1");
    }
}
