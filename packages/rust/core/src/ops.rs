//! HTTP-style operation surface: request/response shapes and the
//! error-to-status mapping consumed by whatever transport fronts the
//! pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dossier_shared::{DossierError, FeedbackInput};

use crate::pipeline::DeliveryPipeline;

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

/// Survey payload accepted by both `finalize` and `update_feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySubmission {
    pub process_code: String,
    pub score: i64,
    #[serde(default)]
    pub ratings: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub feedback: BTreeMap<String, String>,
}

impl SurveySubmission {
    fn input(&self) -> FeedbackInput {
        FeedbackInput {
            score: self.score,
            ratings: self.ratings.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub status: String,
    pub final_doc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Operation failure with its HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::BadGateway(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// JSON body for the error response.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "detail": self.to_string(),
        })
    }
}

impl From<DossierError> for ApiError {
    fn from(err: DossierError) -> Self {
        match err {
            DossierError::Validation { message } => Self::BadRequest(message),
            DossierError::NotFound { message } => Self::NotFound(message),
            DossierError::Retrieval(message) => Self::BadGateway(message),
            // Merge/publish/store and anything unclassified: internal, with
            // the original message kept for diagnostics.
            other => Self::Internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Assemble, publish, and finalize. 200 with the published URL on success.
pub async fn finalize(
    pipeline: &DeliveryPipeline,
    submission: &SurveySubmission,
) -> Result<FinalizeResponse, ApiError> {
    let published = pipeline
        .finalize(&submission.process_code, &submission.input())
        .await?;
    Ok(FinalizeResponse {
        status: "ok".into(),
        final_doc: published.to_string(),
    })
}

/// Refresh survey fields only; no document pipeline involvement.
pub async fn update_feedback(
    pipeline: &DeliveryPipeline,
    submission: &SurveySubmission,
) -> Result<UpdateResponse, ApiError> {
    pipeline
        .update_feedback(&submission.process_code, &submission.input())
        .await?;
    Ok(UpdateResponse {
        status: "ok".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_error_taxonomy() {
        let cases = [
            (DossierError::validation("blank code"), 400),
            (DossierError::not_found("no such process"), 404),
            (DossierError::Retrieval("both strategies failed".into()), 502),
            (DossierError::Merge("broken part".into()), 500),
            (DossierError::Publish("upload refused".into()), 500),
            (DossierError::Store("record write failed".into()), 500),
        ];

        for (err, expected) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), expected);
        }
    }

    #[test]
    fn error_body_keeps_the_original_message() {
        let api: ApiError = DossierError::Merge("document 1 is malformed".into()).into();
        let body = api.body();
        assert_eq!(body["status"], "error");
        assert!(body["detail"].as_str().unwrap().contains("document 1"));
    }

    #[test]
    fn submission_maps_are_optional_in_the_wire_format() {
        let submission: SurveySubmission =
            serde_json::from_str(r#"{"process_code":"ABC123","score":5}"#).unwrap();
        assert!(submission.ratings.is_empty());
        assert!(submission.feedback.is_empty());
    }
}
