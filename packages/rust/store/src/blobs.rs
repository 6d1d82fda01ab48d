//! HTTP blob-store client (storage-service object endpoint).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use dossier_shared::{DossierError, Result};

use crate::BlobStore;

const USER_AGENT: &str = concat!("Dossier/", env!("CARGO_PKG_VERSION"));

/// Binary-object client over the storage service's `storage/v1` endpoint.
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpBlobStore {
    /// Build a client against `base_url` for the given bucket.
    pub fn new(base_url: &str, bucket: &str, service_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DossierError::Store(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip_all, fields(path = %path))]
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.object_url(path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| DossierError::Store(format!("object download: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DossierError::Store(format!(
                "object download {path}: HTTP {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DossierError::Store(format!("object download {path}: {e}")))?;

        debug!(len = bytes.len(), "object downloaded");
        Ok(bytes.to_vec())
    }

    #[instrument(skip_all, fields(path = %path, len = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> Result<()> {
        if bytes.is_empty() {
            return Err(DossierError::Store("refusing to upload empty object".into()));
        }

        let response = self
            .client
            .post(self.object_url(path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", if overwrite { "true" } else { "false" })
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| DossierError::Store(format!("object upload: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DossierError::Store(format!(
                "object upload {path}: HTTP {status}: {body}"
            )));
        }

        debug!("object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/object/processes/r-1/terms.pdf"))
            .and(header("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 stub".to_vec()))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), "processes", "secret").unwrap();
        let bytes = store.download("r-1/terms.pdf").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.5 stub");
    }

    #[tokio::test]
    async fn download_error_carries_store_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), "processes", "secret").unwrap();
        let err = store.download("r-1/missing.pdf").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn upload_disables_upsert_by_default() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/processes/r-1/final/a.pdf"))
            .and(header("x-upsert", "false"))
            .and(header("content-type", "application/pdf"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), "processes", "secret").unwrap();
        store
            .upload("r-1/final/a.pdf", b"%PDF-1.5", "application/pdf", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upload_rejects_empty_payload_without_network() {
        let store = HttpBlobStore::new("http://unreachable.invalid", "processes", "secret")
            .unwrap();
        let err = store
            .upload("r-1/final/a.pdf", b"", "application/pdf", false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty object"));
    }

    #[test]
    fn public_url_shape() {
        let store = HttpBlobStore::new("https://stash.example.com/", "processes", "k").unwrap();
        assert_eq!(
            store.public_url("r-1/final/a.pdf"),
            "https://stash.example.com/storage/v1/object/public/processes/r-1/final/a.pdf"
        );
    }
}
