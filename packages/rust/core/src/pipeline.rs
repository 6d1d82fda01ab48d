//! Finalize / update-feedback orchestration.
//!
//! `finalize` runs the whole assembly: locate and fetch the record's
//! stored documents (fetches and report generation run concurrently),
//! merge in fixed order, publish to blob storage, and transition the
//! record in one write. `update_feedback` refreshes the survey fields
//! without touching the document pipeline.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use uuid::Uuid;

use dossier_fetch::ArtifactFetcher;
use dossier_report::{DocTheme, render_survey_report};
use dossier_shared::{
    DocumentReference, DossierError, FeedbackInput, ProcessRecord, RecordUpdate, Result,
};
use dossier_store::{BlobStore, RecordStore};

use crate::merge::merge_documents;

/// The assembly pipeline with its injected store clients.
///
/// Stateless across invocations; safe to share behind an `Arc`.
pub struct DeliveryPipeline {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    fetcher: ArtifactFetcher,
    theme: DocTheme,
}

impl DeliveryPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        bucket: &str,
        fetch_timeout: Duration,
        theme: DocTheme,
    ) -> Result<Self> {
        let fetcher = ArtifactFetcher::new(blobs.clone(), bucket, fetch_timeout)?;
        Ok(Self {
            records,
            blobs,
            fetcher,
            theme,
        })
    }

    /// Assemble and publish the delivery document for the record with
    /// `code`, then mark the record finalized.
    ///
    /// Validation and lookup failures return before any side effect;
    /// retrieval, merge, and publish failures leave the record untouched.
    #[instrument(skip_all, fields(code = %code))]
    pub async fn finalize(
        &self,
        code: &str,
        input: &FeedbackInput,
    ) -> Result<DocumentReference> {
        let record = self.lookup(code).await?;
        let primary_ref = record.primary_doc.clone().ok_or_else(|| {
            DossierError::not_found(format!("process {} has no primary document", record.code))
        })?;
        let annotations_ref = record.annotations_doc.clone();

        // The two fetches and the report have no data dependency; run them
        // together and let the first failure cancel the rest. A missing
        // annotations reference is simply omitted; a present but
        // unretrievable one aborts the whole assembly.
        let (primary, annotations, report) = tokio::try_join!(
            self.fetcher.fetch(&primary_ref),
            async {
                match &annotations_ref {
                    Some(reference) => self.fetcher.fetch(reference).await.map(Some),
                    None => Ok(None),
                }
            },
            async { render_survey_report(input, &self.theme) },
        )?;

        // Merge order is a product requirement: terms, caveats, survey.
        let mut parts = Vec::with_capacity(3);
        parts.push(primary);
        if let Some(annotations) = annotations {
            parts.push(annotations);
        }
        parts.push(report);
        let merged = merge_documents(&parts)?;
        let digest = format!("{:x}", Sha256::digest(&merged));

        // Fresh object name per attempt: a retried finalize never collides
        // with a previous upload under the no-upsert rule.
        let object_path = format!("{}/final/{}.pdf", record.id, Uuid::new_v4());
        self.blobs
            .upload(&object_path, &merged, "application/pdf", false)
            .await
            .map_err(|e| DossierError::Publish(e.to_string()))?;
        let published = DocumentReference(self.blobs.public_url(&object_path));

        // One write carrying the whole state transition.
        self.records
            .update(&record.id, &RecordUpdate::finalization(published.clone(), input))
            .await
            .map_err(|e| DossierError::Publish(e.to_string()))?;

        info!(
            id = %record.id,
            len = merged.len(),
            sha256 = %digest,
            url = %published,
            "delivery document published"
        );
        Ok(published)
    }

    /// Refresh the record's survey fields without running the document
    /// pipeline or touching finalization state.
    #[instrument(skip_all, fields(code = %code))]
    pub async fn update_feedback(&self, code: &str, input: &FeedbackInput) -> Result<()> {
        let record = self.lookup(code).await?;
        self.records
            .update(&record.id, &RecordUpdate::feedback_only(input))
            .await?;
        info!(id = %record.id, score = input.score, "feedback updated");
        Ok(())
    }

    /// Validate the code and resolve it to a record.
    async fn lookup(&self, code: &str) -> Result<ProcessRecord> {
        let code = code.trim();
        if code.is_empty() {
            return Err(DossierError::validation("process code is missing"));
        }
        self.records
            .get_by_code(code)
            .await?
            .ok_or_else(|| DossierError::not_found(format!("process {code} not found")))
    }
}
