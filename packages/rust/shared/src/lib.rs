//! Shared types, error model, and configuration for Dossier.
//!
//! This crate is the foundation depended on by all other Dossier crates.
//! It provides:
//! - [`DossierError`] — the unified error type
//! - Domain types ([`ProcessRecord`], [`DocumentReference`], [`FeedbackInput`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, ReportConfig, StoreConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_service_key,
};
pub use error::{DossierError, Result};
pub use types::{
    DocumentReference, FeedbackInput, ProcessRecord, ProcessStatus, RecordUpdate,
};
