//! End-to-end assembly pipeline tests over in-memory stores.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use dossier_core::{ApiError, DeliveryPipeline, SurveySubmission, ops};
use dossier_report::{DocTheme, render_survey_report};
use dossier_shared::{
    DocumentReference, DossierError, FeedbackInput, ProcessRecord, ProcessStatus, Result,
};
use dossier_store::{BlobStore, MemoryBlobStore, MemoryRecordStore};

fn pipeline(
    records: Arc<MemoryRecordStore>,
    blobs: Arc<dyn BlobStore>,
) -> DeliveryPipeline {
    DeliveryPipeline::new(
        records,
        blobs,
        "processes",
        Duration::from_secs(5),
        DocTheme::standard("1 Example Way, Testville"),
    )
    .unwrap()
}

/// A one-page PDF whose text contains `marker`.
fn marker_pdf(marker: &str) -> Vec<u8> {
    let input = FeedbackInput {
        score: 0,
        ratings: BTreeMap::new(),
        feedback: BTreeMap::from([("section".to_string(), marker.to_string())]),
    };
    render_survey_report(&input, &DocTheme::compact("fixture")).unwrap()
}

fn record(code: &str, primary: Option<&str>, annotations: Option<&str>) -> ProcessRecord {
    ProcessRecord {
        id: format!("id-{code}"),
        code: code.to_string(),
        primary_doc: primary.map(DocumentReference::from),
        annotations_doc: annotations.map(DocumentReference::from),
        final_doc: None,
        status: ProcessStatus::Pending,
        feedback: None,
        score: None,
        updated_at: None,
        finalized_at: None,
    }
}

fn submission(code: &str) -> SurveySubmission {
    SurveySubmission {
        process_code: code.to_string(),
        score: 9,
        ratings: BTreeMap::from([("clarity".to_string(), serde_json::json!(5))]),
        feedback: BTreeMap::from([("comments".to_string(), "great\nservice".to_string())]),
    }
}

fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).expect("parse published PDF");
    doc.get_pages()
        .keys()
        .map(|page| doc.extract_text(&[*page]).expect("extract page text"))
        .collect()
}

#[tokio::test]
async fn finalize_publishes_and_transitions_the_record() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record("ABC123", Some("processes/id-ABC123/terms.pdf"), None));
    blobs.put("id-ABC123/terms.pdf", marker_pdf("SERVICE-TERMS"));

    let pipeline = pipeline(records.clone(), blobs.clone());
    let response = ops::finalize(&pipeline, &submission("ABC123")).await.unwrap();
    assert_eq!(response.status, "ok");

    // Record transitioned in one write with all finalization fields.
    let stored = records.get("ABC123").unwrap();
    assert_eq!(stored.status, ProcessStatus::Finalized);
    assert_eq!(stored.final_doc.as_ref().unwrap().as_str(), response.final_doc);
    assert_eq!(stored.score, Some(9));
    assert!(stored.finalized_at.is_some());
    assert_eq!(
        stored.feedback.unwrap().feedback["comments"],
        "great\nservice"
    );
    assert_eq!(records.update_calls(), 1);

    // Published document: primary marker first, then the survey report
    // with the feedback lines kept separate.
    let published = blobs
        .get_by_public_url(&response.final_doc)
        .expect("published object retrievable by its URL");
    let texts = page_texts(&published);
    assert!(texts.len() >= 2);
    assert!(texts[0].contains("SERVICE-TERMS"));

    let report_text = texts[1..].join("\n");
    assert!(report_text.contains("Satisfaction Survey"));
    assert!(report_text.contains("Score: 9"));
    assert!(report_text.contains("great"));
    assert!(report_text.contains("service"));
    assert!(
        !report_text
            .lines()
            .any(|l| l.contains("great") && l.contains("service"))
    );
}

#[tokio::test]
async fn annotations_document_merges_between_primary_and_report() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record(
        "XYZ777",
        Some("processes/id-XYZ777/terms.pdf"),
        Some("processes/id-XYZ777/caveats.pdf"),
    ));
    blobs.put("id-XYZ777/terms.pdf", marker_pdf("PRIMARY-MARK"));
    blobs.put("id-XYZ777/caveats.pdf", marker_pdf("CAVEATS-MARK"));

    let pipeline = pipeline(records.clone(), blobs.clone());
    let response = ops::finalize(&pipeline, &submission("XYZ777")).await.unwrap();

    let published = blobs.get_by_public_url(&response.final_doc).unwrap();
    let texts = page_texts(&published);
    assert!(texts.len() >= 3);
    assert!(texts[0].contains("PRIMARY-MARK"));
    assert!(texts[1].contains("CAVEATS-MARK"));
    assert!(texts[2].contains("Satisfaction Survey"));
}

#[tokio::test]
async fn finalize_over_public_urls_never_reads_the_store() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/terms.pdf"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_bytes(marker_pdf("URL-TERMS")),
        )
        .mount(&server)
        .await;

    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record(
        "URL001",
        Some(&format!("{}/terms.pdf", server.uri())),
        None,
    ));

    let pipeline = pipeline(records.clone(), blobs.clone());
    let response = ops::finalize(&pipeline, &submission("URL001")).await.unwrap();

    assert_eq!(blobs.download_calls(), 0);
    let published = blobs.get_by_public_url(&response.final_doc).unwrap();
    assert!(page_texts(&published)[0].contains("URL-TERMS"));
}

#[tokio::test]
async fn unknown_code_is_404_with_zero_blob_traffic() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let pipeline = pipeline(records, blobs.clone());
    let err = ops::finalize(&pipeline, &submission("MISSING")).await.unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(blobs.download_calls(), 0);
    assert_eq!(blobs.upload_calls(), 0);
}

#[tokio::test]
async fn blank_code_is_400_before_any_lookup() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let pipeline = pipeline(records, blobs);
    let err = ops::finalize(&pipeline, &submission("   ")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn missing_primary_document_is_404() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record("NODOC1", None, None));

    let pipeline = pipeline(records.clone(), blobs);
    let err = ops::finalize(&pipeline, &submission("NODOC1")).await.unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(records.get("NODOC1").unwrap().status, ProcessStatus::Pending);
}

#[tokio::test]
async fn unretrievable_annotations_fail_closed_as_502() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record(
        "ANN404",
        Some("processes/id-ANN404/terms.pdf"),
        Some("processes/id-ANN404/caveats.pdf"),
    ));
    blobs.put("id-ANN404/terms.pdf", marker_pdf("TERMS"));
    // Annotations object deliberately absent.

    let pipeline = pipeline(records.clone(), blobs.clone());
    let err = ops::finalize(&pipeline, &submission("ANN404")).await.unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert_eq!(blobs.upload_calls(), 0);

    let untouched = records.get("ANN404").unwrap();
    assert_eq!(untouched.status, ProcessStatus::Pending);
    assert!(untouched.final_doc.is_none());
    assert_eq!(records.update_calls(), 0);
}

#[tokio::test]
async fn retrieval_failure_on_primary_is_502_without_record_writes() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record("GONE42", Some("processes/id-GONE42/terms.pdf"), None));

    let pipeline = pipeline(records.clone(), blobs);
    let err = ops::finalize(&pipeline, &submission("GONE42")).await.unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert_eq!(records.update_calls(), 0);
}

#[tokio::test]
async fn upload_failure_is_500_and_leaves_the_record_unmodified() {
    /// Blob store whose uploads always fail.
    struct RefusingUploads(Arc<MemoryBlobStore>);

    #[async_trait]
    impl BlobStore for RefusingUploads {
        async fn download(&self, path: &str) -> Result<Vec<u8>> {
            self.0.download(path).await
        }

        async fn upload(&self, _: &str, _: &[u8], _: &str, _: bool) -> Result<()> {
            Err(DossierError::Store("bucket quota exceeded".into()))
        }

        fn public_url(&self, path: &str) -> String {
            self.0.public_url(path)
        }
    }

    let records = Arc::new(MemoryRecordStore::new());
    let inner = Arc::new(MemoryBlobStore::new());
    records.insert(record("QUOTA1", Some("processes/id-QUOTA1/terms.pdf"), None));
    inner.put("id-QUOTA1/terms.pdf", marker_pdf("TERMS"));

    let pipeline = pipeline(records.clone(), Arc::new(RefusingUploads(inner)));
    let err = ops::finalize(&pipeline, &submission("QUOTA1")).await.unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert!(matches!(err, ApiError::Internal(_)));
    assert!(err.to_string().contains("quota"));

    let untouched = records.get("QUOTA1").unwrap();
    assert_eq!(untouched.status, ProcessStatus::Pending);
    assert_eq!(records.update_calls(), 0);
}

#[tokio::test]
async fn update_feedback_is_last_write_wins_and_never_finalizes() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    records.insert(record("UPD001", Some("processes/id-UPD001/terms.pdf"), None));

    let pipeline = pipeline(records.clone(), blobs.clone());

    let mut first = submission("UPD001");
    first.score = 3;
    ops::update_feedback(&pipeline, &first).await.unwrap();

    let mut second = submission("UPD001");
    second.score = 8;
    second
        .feedback
        .insert("comments".to_string(), "much better now".to_string());
    let response = ops::update_feedback(&pipeline, &second).await.unwrap();
    assert_eq!(response.status, "ok");

    let stored = records.get("UPD001").unwrap();
    assert_eq!(stored.status, ProcessStatus::Pending);
    assert_eq!(stored.score, Some(8));
    assert_eq!(stored.feedback.unwrap().feedback["comments"], "much better now");
    assert!(stored.final_doc.is_none());
    assert!(stored.finalized_at.is_none());
    assert!(stored.updated_at.is_some());

    // No document pipeline involvement at all.
    assert_eq!(blobs.download_calls(), 0);
    assert_eq!(blobs.upload_calls(), 0);
    assert_eq!(records.update_calls(), 2);
}

#[tokio::test]
async fn update_feedback_unknown_code_is_404() {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let pipeline = pipeline(records, blobs);
    let err = ops::update_feedback(&pipeline, &submission("MISSING"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
