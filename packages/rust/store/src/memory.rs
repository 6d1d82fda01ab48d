//! In-memory store implementations for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use dossier_shared::{DossierError, ProcessRecord, RecordUpdate, Result};

use crate::{BlobStore, RecordStore};

// ---------------------------------------------------------------------------
// MemoryRecordStore
// ---------------------------------------------------------------------------

/// Record store backed by a mutex-guarded vector.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<ProcessRecord>>,
    update_calls: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record (test setup; record lifecycle is otherwise external).
    pub fn insert(&self, record: ProcessRecord) {
        self.records.lock().expect("records lock").push(record);
    }

    /// Current state of a record, by code.
    pub fn get(&self, code: &str) -> Option<ProcessRecord> {
        self.records
            .lock()
            .expect("records lock")
            .iter()
            .find(|r| r.code == code)
            .cloned()
    }

    /// How many update requests were applied.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_by_code(&self, code: &str) -> Result<Option<ProcessRecord>> {
        Ok(self
            .records
            .lock()
            .expect("records lock")
            .iter()
            .find(|r| r.code == code)
            .cloned())
    }

    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()> {
        let mut records = self.records.lock().expect("records lock");
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DossierError::Store(format!("no record with id {id}")))?;

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(final_doc) = &update.final_doc {
            record.final_doc = Some(final_doc.clone());
        }
        if let Some(feedback) = &update.feedback {
            record.feedback = Some(feedback.clone());
        }
        if let Some(score) = update.score {
            record.score = Some(score);
        }
        if let Some(updated_at) = update.updated_at {
            record.updated_at = Some(updated_at);
        }
        if let Some(finalized_at) = update.finalized_at {
            record.finalized_at = Some(finalized_at);
        }

        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryBlobStore
// ---------------------------------------------------------------------------

/// Blob store backed by a mutex-guarded path → bytes map.
///
/// Download calls are counted so tests can prove the fallback strategy is
/// only consulted when it should be.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    download_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object at `path` (test setup).
    pub fn put(&self, path: &str, bytes: Vec<u8>) {
        self.objects
            .lock()
            .expect("objects lock")
            .insert(path.to_string(), bytes);
    }

    /// Current bytes stored at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().expect("objects lock").get(path).cloned()
    }

    /// Bytes stored at the object behind a previously issued public URL.
    pub fn get_by_public_url(&self, url: &str) -> Option<Vec<u8>> {
        url.strip_prefix("memory://blob/")
            .and_then(|path| self.get(path))
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .expect("objects lock")
            .get(path)
            .cloned()
            .ok_or_else(|| DossierError::Store(format!("object not found: {path}")))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
        overwrite: bool,
    ) -> Result<()> {
        if bytes.is_empty() {
            return Err(DossierError::Store("refusing to upload empty object".into()));
        }

        let mut objects = self.objects.lock().expect("objects lock");
        if !overwrite && objects.contains_key(path) {
            return Err(DossierError::Store(format!(
                "object already exists: {path}"
            )));
        }

        objects.insert(path.to_string(), bytes.to_vec());
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://blob/{path}")
    }
}
