//! Courtline core: Stage-1 input handling, case identification, and the
//! checkpointed timeline-enrichment pipeline.

pub mod caseno;
pub mod courts;
pub mod input;
pub mod output;
pub mod pipeline;

pub use caseno::{ParsedCaseNumber, parse_case_number};
pub use input::{identify_decisions, load_decisions};
pub use output::{EnrichedCase, write_dataset};
pub use pipeline::{EnrichOutcome, EnrichProgress, SilentProgress, TimelineSource, enrich};
