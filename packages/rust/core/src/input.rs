//! Stage-1 input loading.
//!
//! Stage 1 leaves one `page*.json` file per scraped result page, each with
//! an `items` array of decision objects. Loading aggregates every page file
//! under the data directory, then filtering drops records that cannot be
//! identified on infosoud (unknown court, unparseable case number).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use courtline_shared::{CaseRecord, CourtlineError, Result};

use crate::caseno::parse_case_number;
use crate::courts;

/// One decision object as Stage 1 scraped it, before identification.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDecision {
    /// Court name ("soud" in the scraped payload).
    #[serde(rename = "soud", default)]
    pub court: Option<String>,
    /// Case number ("jednací číslo") as scraped.
    #[serde(rename = "jednaciCislo", default)]
    pub case_number: Option<String>,
    #[serde(rename = "datumVydani", default)]
    pub decision_date: Option<NaiveDate>,
    #[serde(rename = "datumZverejneni", default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(rename = "klicovaSlova", default)]
    pub keywords: Vec<String>,
    #[serde(rename = "zminenaUstanoveni", default)]
    pub references: Vec<String>,
    /// Everything else Stage 1 scraped, carried through to the output.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PageFile {
    #[serde(default)]
    items: Vec<RawDecision>,
}

/// Recursively load every `page*.json` under `dir`.
///
/// Files that fail to read or parse are logged and skipped so one corrupt
/// page cannot sink a run. File order is sorted for determinism.
pub fn load_decisions(dir: &Path) -> Result<Vec<RawDecision>> {
    if !dir.is_dir() {
        return Err(CourtlineError::validation(format!(
            "data directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    collect_page_files(dir, &mut files)?;
    files.sort();

    let mut records = Vec::new();
    for path in &files {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable page file");
                continue;
            }
        };
        match serde_json::from_str::<PageFile>(&text) {
            Ok(page) => {
                debug!(path = %path.display(), items = page.items.len(), "loaded page file");
                records.extend(page.items);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed page file");
            }
        }
    }

    info!(files = files.len(), records = records.len(), "loaded decisions");
    Ok(records)
}

fn collect_page_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| CourtlineError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| CourtlineError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_page_files(&path, out)?;
        } else if is_page_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_page_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("page") && n.ends_with(".json"))
        .unwrap_or(false)
}

/// Identify raw decisions: drop anything without a known court and a valid
/// case number, and attach the infosoud query URL as the case id.
///
/// Input order is preserved. The dropped counts are logged so dataset
/// shrinkage is visible per run.
pub fn identify_decisions(raws: Vec<RawDecision>, base_url: &str) -> Vec<CaseRecord> {
    let total = raws.len();
    let mut bad_court = 0usize;
    let mut bad_case_number = 0usize;

    let mut records = Vec::with_capacity(total);
    for raw in raws {
        let court = match raw.court.as_deref().filter(|c| courts::lookup(c).is_some()) {
            Some(court) => court.to_string(),
            None => {
                bad_court += 1;
                continue;
            }
        };
        let case_number = raw.case_number.unwrap_or_default();
        let parsed = match parse_case_number(&case_number) {
            Some(parsed) => parsed,
            None => {
                bad_case_number += 1;
                continue;
            }
        };
        let Some(id) = courts::case_url(base_url, &court, &parsed) else {
            bad_court += 1;
            continue;
        };

        records.push(CaseRecord {
            id,
            court,
            case_number,
            decision_date: raw.decision_date,
            publication_date: raw.publication_date,
            keywords: raw.keywords,
            references: raw.references,
            extra: raw.extra,
        });
    }

    if bad_court > 0 || bad_case_number > 0 {
        warn!(
            total,
            kept = records.len(),
            unknown_court = bad_court,
            bad_case_number,
            "dropped unidentifiable decisions"
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const BASE: &str = "https://infosoud.justice.cz/InfoSoud/public/search.do";

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("courtline_input_{}", Uuid::now_v7()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn raw(court: &str, case_number: &str) -> RawDecision {
        serde_json::from_value(serde_json::json!({
            "soud": court,
            "jednaciCislo": case_number,
        }))
        .unwrap()
    }

    #[test]
    fn loads_nested_page_files_and_skips_corrupt_ones() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("2020/01")).unwrap();
        fs::write(
            dir.join("2020/01/page1.json"),
            r#"{"items": [{"soud": "Okresní soud v Chebu", "jednaciCislo": "12 C 123/2020"}]}"#,
        )
        .unwrap();
        fs::write(dir.join("2020/01/page2.json"), "{not json").unwrap();
        fs::write(dir.join("notes.json"), r#"{"items": [{"soud": "x"}]}"#).unwrap();

        let records = load_decisions(&dir).expect("load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].court.as_deref(), Some("Okresní soud v Chebu"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let dir = std::env::temp_dir().join(format!("courtline_missing_{}", Uuid::now_v7()));
        assert!(load_decisions(&dir).is_err());
    }

    #[test]
    fn identify_drops_unknown_courts_and_bad_case_numbers() {
        let raws = vec![
            raw("Okresní soud v Chebu", "12 C 123/2020-15"),
            raw("Neznámý soud", "12 C 123/2020"),
            raw("Okresní soud v Chebu", "not a case number"),
        ];

        let records = identify_decisions(raws, BASE);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].case_number, "12 C 123/2020-15");
        assert!(records[0].id.as_str().contains("org=OSZPCCH"));
    }

    #[test]
    fn identify_preserves_input_order() {
        let raws = vec![
            raw("Okresní soud v Chebu", "1 C 1/2020"),
            raw("Okresní soud v Chebu", "2 C 2/2020"),
            raw("Okresní soud v Chebu", "3 C 3/2020"),
        ];

        let records = identify_decisions(raws, BASE);
        let senates: Vec<&str> = records.iter().map(|r| &r.case_number[..1]).collect();
        assert_eq!(senates, vec!["1", "2", "3"]);
    }

    #[test]
    fn extra_fields_survive_identification() {
        let raw: RawDecision = serde_json::from_value(serde_json::json!({
            "soud": "Okresní soud v Chebu",
            "jednaciCislo": "12 C 123/2020",
            "ecli": "ECLI:CZ:OSCH:2021:12.C.123.2020.1",
        }))
        .unwrap();

        let records = identify_decisions(vec![raw], BASE);
        assert_eq!(
            records[0].extra.get("ecli").and_then(|v| v.as_str()),
            Some("ECLI:CZ:OSCH:2021:12.C.123.2020.1")
        );
    }
}
