//! Shared types, error model, and configuration for Courtline.
//!
//! This crate is the foundation depended on by all other Courtline crates.
//! It provides:
//! - [`CourtlineError`] / [`FetchError`] — the unified error model
//! - Domain types ([`CaseRecord`], [`TimelineEvent`], [`CheckpointEntry`], [`CaseId`])
//! - Configuration ([`AppConfig`], [`EnrichConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, EnrichConfig, EnrichmentConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{CourtlineError, FetchError, FetchErrorKind, Result};
pub use types::{
    CaseId, CaseRecord, CheckpointEntry, CheckpointStatus, EventKind, TimelineEvent,
};
