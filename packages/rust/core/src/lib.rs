//! Core delivery-document pipeline for Dossier.
//!
//! Ties artifact retrieval, report generation, PDF merging, and
//! publication together into the `finalize` and `update_feedback`
//! operations, and exposes their HTTP-style result surface in [`ops`].

pub mod merge;
pub mod ops;
pub mod pipeline;

pub use merge::merge_documents;
pub use ops::{ApiError, FinalizeResponse, SurveySubmission, UpdateResponse};
pub use pipeline::DeliveryPipeline;
