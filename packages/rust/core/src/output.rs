//! Augmented-dataset output.
//!
//! One JSON Lines row per Stage-1 case, in input order: the original
//! metadata, one `timeline_*` date column per tracked event kind, and the
//! final `enrichment_status`. Failed cases keep their metadata with null
//! timeline columns, so enrichment never shrinks the dataset.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use courtline_shared::{
    CaseRecord, CheckpointStatus, CourtlineError, EventKind, Result, TimelineEvent,
};

/// One output row: the Stage-1 record plus enrichment columns.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCase {
    #[serde(flatten)]
    pub record: CaseRecord,
    /// `timeline_*` columns, one per tracked kind, null when undated.
    #[serde(flatten)]
    pub timeline: Map<String, Value>,
    pub enrichment_status: CheckpointStatus,
}

impl EnrichedCase {
    /// Assemble a row from a record, its final status, and the fetched
    /// events. Every `timeline_*` column is present on every row; a kind
    /// that was not observed (or whose date was unreadable) is null. When
    /// the source repeats a kind, the last occurrence wins.
    pub fn new(record: CaseRecord, status: CheckpointStatus, events: &[TimelineEvent]) -> Self {
        let mut timeline = Map::new();
        for kind in EventKind::ALL {
            let date = events
                .iter()
                .filter(|e| e.kind == kind)
                .next_back()
                .and_then(|e| e.date);
            let value = match date {
                Some(date) => Value::String(date.to_string()),
                None => Value::Null,
            };
            timeline.insert(kind.column_name().to_string(), value);
        }

        Self {
            record,
            timeline,
            enrichment_status: status,
        }
    }
}

/// Write the augmented dataset as JSON Lines, creating parent directories.
pub fn write_dataset(path: &Path, rows: &[EnrichedCase]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CourtlineError::io(parent, e))?;
    }

    let file = fs::File::create(path).map_err(|e| CourtlineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, row)
            .map_err(|e| CourtlineError::parse(format!("serializing output row: {e}")))?;
        writer
            .write_all(b"\n")
            .map_err(|e| CourtlineError::io(path, e))?;
    }
    writer.flush().map_err(|e| CourtlineError::io(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "wrote augmented dataset");
    Ok(())
}
