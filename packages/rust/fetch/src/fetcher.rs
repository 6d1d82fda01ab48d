//! Two-strategy artifact retrieval: public URL first, blob store second.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use dossier_shared::{DocumentReference, DossierError, Result};
use dossier_store::BlobStore;

use crate::locator::derive_storage_path;

/// User-Agent string for artifact requests.
const USER_AGENT: &str = concat!("Dossier/", env!("CARGO_PKG_VERSION"));

/// Retrieves document bytes for stored references.
///
/// The primary strategy treats the reference as a public URL; any failure
/// there — transport error, non-success status, or a reference that is
/// not a URL at all — escalates to a single authenticated blob-store read
/// by derived path. A second failure is terminal for the reference.
pub struct ArtifactFetcher {
    client: reqwest::Client,
    blobs: Arc<dyn BlobStore>,
    bucket: String,
}

impl ArtifactFetcher {
    /// Create a fetcher bounded by `timeout` per network attempt.
    pub fn new(blobs: Arc<dyn BlobStore>, bucket: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| DossierError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            blobs,
            bucket: bucket.to_string(),
        })
    }

    /// Fetch the bytes behind `reference`.
    ///
    /// Idempotent for a given reference and store state. Fails with
    /// [`DossierError::Retrieval`] only after both strategies are
    /// exhausted.
    #[instrument(skip_all, fields(reference = %reference))]
    pub async fn fetch(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let primary_err = match self.fetch_public(reference).await {
            Ok(bytes) => {
                debug!(len = bytes.len(), "public fetch succeeded");
                return Ok(bytes);
            }
            Err(e) => e,
        };

        debug!(error = %primary_err, "public fetch failed, trying store fallback");

        let Some(path) = derive_storage_path(reference.as_str(), &self.bucket) else {
            return Err(DossierError::Retrieval(format!(
                "invalid storage reference: {reference}"
            )));
        };

        match self.blobs.download(&path).await {
            Ok(bytes) => {
                debug!(len = bytes.len(), %path, "store fallback succeeded");
                Ok(bytes)
            }
            Err(e) => Err(DossierError::Retrieval(e.to_string())),
        }
    }

    /// Primary strategy: direct GET of the reference as a public URL.
    async fn fetch_public(&self, reference: &DocumentReference) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(reference.as_str())
            .send()
            .await
            .map_err(|e| DossierError::Network(format!("{reference}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DossierError::Network(format!(
                "{reference}: HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DossierError::Network(format!("{reference}: body read failed: {e}")))?;

        Ok(bytes.to_vec())
    }
}
