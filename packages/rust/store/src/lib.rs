//! Record-store and blob-store client seams for Dossier.
//!
//! The pipeline consumes the external stores only through the
//! [`RecordStore`] and [`BlobStore`] traits. [`HttpRecordStore`] and
//! [`HttpBlobStore`] speak the storage service's REST dialect; the
//! in-memory variants back tests and local development.
//!
//! Clients are explicitly constructed and injected — there are no
//! process-wide singletons, and store failures are typed errors rather
//! than an error attribute to probe on each response.

mod blobs;
mod memory;
mod records;

use async_trait::async_trait;

use dossier_shared::{ProcessRecord, RecordUpdate, Result};

pub use blobs::HttpBlobStore;
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use records::HttpRecordStore;

/// Key-value-by-code access to process records.
///
/// A lookup miss is a first-class `Ok(None)`, not an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the record carrying the given human-facing code.
    async fn get_by_code(&self, code: &str) -> Result<Option<ProcessRecord>>;

    /// Apply a field-scoped update to the record with the given internal id.
    ///
    /// Implementations must send the whole update as a single request so
    /// the store never observes a partially-updated record.
    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()>;
}

/// Get/put-by-path access to binary objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Authenticated read of an object by storage-relative path.
    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Write an object. With `overwrite` false the store must reject the
    /// write when the path already exists (no implicit upsert).
    async fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> Result<()>;

    /// Public URL under which an uploaded object is retrievable.
    fn public_url(&self, path: &str) -> String;
}
