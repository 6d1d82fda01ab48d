//! Artifact location and retrieval for Dossier.
//!
//! A stored document reference is retrievable two ways: directly as a
//! public URL, or through the authenticated blob store by its derived
//! storage-relative path. [`ArtifactFetcher`] tries the public URL first
//! and escalates to the store exactly once; [`locator`] derives the
//! fallback path.

pub mod fetcher;
pub mod locator;

pub use fetcher::ArtifactFetcher;
pub use locator::derive_storage_path;
