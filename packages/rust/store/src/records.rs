//! HTTP record-store client (storage-service REST dialect).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use dossier_shared::{DossierError, ProcessRecord, RecordUpdate, Result};

use crate::RecordStore;

/// User-Agent string for store requests.
const USER_AGENT: &str = concat!("Dossier/", env!("CARGO_PKG_VERSION"));

/// Process-record client over the storage service's `rest/v1` endpoint.
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
    table: String,
    service_key: String,
}

impl HttpRecordStore {
    /// Build a client against `base_url` for the given record table.
    pub fn new(base_url: &str, table: &str, service_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DossierError::Store(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    #[instrument(skip_all, fields(code = %code))]
    async fn get_by_code(&self, code: &str) -> Result<Option<ProcessRecord>> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("code", format!("eq.{code}")), ("select", "*".into())])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| DossierError::Store(format!("record lookup: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DossierError::Store(format!(
                "record lookup: HTTP {status}"
            )));
        }

        let mut rows: Vec<ProcessRecord> = response
            .json()
            .await
            .map_err(|e| DossierError::Store(format!("record lookup: invalid body: {e}")))?;

        debug!(found = !rows.is_empty(), "record lookup complete");
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()> {
        // One PATCH carrying every changed field.
        let response = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(update)
            .send()
            .await
            .map_err(|e| DossierError::Store(format!("record update: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DossierError::Store(format!(
                "record update: HTTP {status}"
            )));
        }

        debug!("record update applied");
        Ok(())
    }
}
