//! Core domain types for Dossier process records and survey feedback.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DocumentReference
// ---------------------------------------------------------------------------

/// A pointer to a stored PDF: either an absolute URL or a storage-relative
/// path (`<bucket>/...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentReference(pub String);

impl DocumentReference {
    /// Whether the reference looks like an absolute http(s) URL.
    pub fn is_url(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// The raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// ProcessRecord
// ---------------------------------------------------------------------------

/// Completion state of a process record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Pending,
    Finalized,
}

/// The business entity tracking a client engagement, its documents, and its
/// feedback outcome.
///
/// Owned by the record store; this service only reads records and performs
/// field-scoped updates. Fields it does not touch are not modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Store-assigned opaque identifier, stable for the record's lifetime.
    pub id: String,
    /// Human-facing unique code, supplied by callers.
    pub code: String,
    /// Main terms document; required for finalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_doc: Option<DocumentReference>,
    /// Optional caveats/exceptions document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations_doc: Option<DocumentReference>,
    /// Published delivery document, set by finalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_doc: Option<DocumentReference>,
    pub status: ProcessStatus,
    /// Survey outcome stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackInput>,
    /// Survey score, duplicated out of `feedback` for filtering screens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// FeedbackInput
// ---------------------------------------------------------------------------

/// Structured survey data: a score, rated categories, and free-text
/// feedback sections.
///
/// The score is rendered verbatim (no range enforcement here). Rating
/// values are heterogeneous scalars; feedback bodies may contain embedded
/// line breaks. Map ordering is not contractually meaningful — `BTreeMap`
/// just keeps rendering deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    pub score: i64,
    #[serde(default)]
    pub ratings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub feedback: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// RecordUpdate
// ---------------------------------------------------------------------------

/// Field-scoped patch for a process record.
///
/// Serialized once and sent as a single request so the store never sees a
/// partially-updated record. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProcessStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_doc: Option<DocumentReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl RecordUpdate {
    /// The single finalization write: status transition, published
    /// reference, verbatim feedback summary, score, and timestamp.
    pub fn finalization(published: DocumentReference, input: &FeedbackInput) -> Self {
        Self {
            status: Some(ProcessStatus::Finalized),
            final_doc: Some(published),
            feedback: Some(input.clone()),
            score: Some(input.score),
            updated_at: None,
            finalized_at: Some(Utc::now()),
        }
    }

    /// Feedback refresh that never touches status, the published reference,
    /// or the finalization timestamp.
    pub fn feedback_only(input: &FeedbackInput) -> Self {
        Self {
            status: None,
            final_doc: None,
            feedback: Some(input.clone()),
            score: Some(input.score),
            updated_at: Some(Utc::now()),
            finalized_at: None,
        }
    }
}
