// src/uploads/mod.rs
//! File ingestion: format sniffing, blob storage and reconciliation of the
//! blobs attached to a record.

pub mod blob_store;
pub mod error;
pub mod handlers;
pub mod payload;
pub mod reconciler;
pub mod routes;
pub mod sniffer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use blob_store::{BlobStore, BlobStoreConfig, StoredBlobReference};
pub use error::UploadError;
pub use payload::{resolve_all, resolve_optional, RawPayloadOrReference};
pub use reconciler::{DocumentReconciler, EmptyDocumentsPolicy, SlotPlan};
pub use routes::uploads_routes;
pub use sniffer::{classify, classify_as, BlobKind, SniffedFormat};
