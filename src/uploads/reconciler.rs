// src/uploads/reconciler.rs
//! Reconciliation of a record's attached blobs against a new submission.
//!
//! Work happens in three phases so callers can put their own commit in the
//! middle:
//!
//! 1. `plan` classifies every raw payload in memory and computes the diff. No
//!    disk I/O happens, so a rejected submission leaves nothing behind.
//! 2. `persist` writes the new blobs. If one write fails, the blobs already
//!    written by this call are removed again.
//! 3. `commit` deletes the blobs that dropped out of the set, or `abort`
//!    removes the freshly written ones when the caller's own commit failed.
//!
//! Old blobs are only ever deleted in `commit`.

use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, info};

use super::blob_store::{BlobStore, StoredBlobReference};
use super::error::UploadError;
use super::payload::RawPayloadOrReference;
use super::sniffer::{classify_as, BlobKind, SniffedFormat};

/// What an explicitly empty document list means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyDocumentsPolicy {
    /// Detach and delete every existing document
    #[default]
    ClearAll,
    /// Leave the existing documents untouched
    KeepExisting,
}

impl FromStr for EmptyDocumentsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "clear_all" => Ok(EmptyDocumentsPolicy::ClearAll),
            "keep" | "keep_existing" => Ok(EmptyDocumentsPolicy::KeepExisting),
            other => Err(format!("unknown empty documents policy: {}", other)),
        }
    }
}

/// A classified payload waiting to be written
#[derive(Debug)]
struct PendingBlob {
    data: Vec<u8>,
    format: SniffedFormat,
}

impl PendingBlob {
    fn classify(data: Vec<u8>, kind: BlobKind) -> Result<Self, UploadError> {
        let format = classify_as(&data, kind)?;
        Ok(Self { data, format })
    }
}

/// Writes every pending blob or none of them.
async fn write_all(
    store: &BlobStore,
    pending: &[PendingBlob],
) -> Result<Vec<StoredBlobReference>, UploadError> {
    let mut written = Vec::with_capacity(pending.len());
    for blob in pending {
        match store.store(&blob.data, blob.format).await {
            Ok(reference) => written.push(reference),
            Err(e) => {
                for reference in &written {
                    store.delete_best_effort(reference).await;
                }
                return Err(e);
            }
        }
    }
    Ok(written)
}

pub struct DocumentReconciler<'a> {
    store: &'a BlobStore,
    policy: EmptyDocumentsPolicy,
}

impl<'a> DocumentReconciler<'a> {
    pub fn new(store: &'a BlobStore, policy: EmptyDocumentsPolicy) -> Self {
        Self { store, policy }
    }

    /// Diffs `existing` against `incoming` without touching the disk.
    ///
    /// Echoed references must already belong to `existing`; a reference owned
    /// by another record is rejected so each blob keeps a single owner.
    pub fn plan(
        &self,
        existing: &BTreeSet<StoredBlobReference>,
        incoming: Vec<RawPayloadOrReference>,
    ) -> Result<ReconcilePlan, UploadError> {
        if incoming.is_empty() && self.policy == EmptyDocumentsPolicy::KeepExisting {
            debug!(existing = existing.len(), "Empty document list, keeping existing set");
            return Ok(ReconcilePlan {
                keep: existing.clone(),
                pending: Vec::new(),
                remove: BTreeSet::new(),
            });
        }

        let mut keep = BTreeSet::new();
        let mut pending = Vec::new();

        for item in incoming {
            match item {
                RawPayloadOrReference::Reference(reference) => {
                    if !existing.contains(&reference) {
                        return Err(UploadError::ForeignReference(reference.to_string()));
                    }
                    keep.insert(reference);
                }
                RawPayloadOrReference::Raw(data) => {
                    pending.push(PendingBlob::classify(data, BlobKind::Document)?);
                }
            }
        }

        let remove = existing.difference(&keep).cloned().collect();

        Ok(ReconcilePlan {
            keep,
            pending,
            remove,
        })
    }

    /// Plans, persists, and commits in one go; returns the new reference set.
    pub async fn reconcile(
        &self,
        existing: &BTreeSet<StoredBlobReference>,
        incoming: Vec<RawPayloadOrReference>,
    ) -> Result<BTreeSet<StoredBlobReference>, UploadError> {
        let plan = self.plan(existing, incoming)?;
        let persisted = plan.persist(self.store).await?;
        Ok(persisted.commit(self.store).await)
    }
}

/// Outcome of [`DocumentReconciler::plan`]
#[derive(Debug)]
pub struct ReconcilePlan {
    keep: BTreeSet<StoredBlobReference>,
    pending: Vec<PendingBlob>,
    remove: BTreeSet<StoredBlobReference>,
}

impl ReconcilePlan {
    pub fn kept(&self) -> &BTreeSet<StoredBlobReference> {
        &self.keep
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn removals(&self) -> &BTreeSet<StoredBlobReference> {
        &self.remove
    }

    pub async fn persist(self, store: &BlobStore) -> Result<PersistedDocuments, UploadError> {
        let written = write_all(store, &self.pending).await?;

        let mut documents = self.keep;
        documents.extend(written.iter().cloned());

        info!(
            kept = documents.len() - written.len(),
            written = written.len(),
            to_remove = self.remove.len(),
            "Document set persisted"
        );

        Ok(PersistedDocuments {
            documents,
            written,
            remove: self.remove,
        })
    }
}

/// New blobs are on disk; old ones are still in place
#[derive(Debug)]
pub struct PersistedDocuments {
    documents: BTreeSet<StoredBlobReference>,
    written: Vec<StoredBlobReference>,
    remove: BTreeSet<StoredBlobReference>,
}

impl PersistedDocuments {
    pub fn documents(&self) -> &BTreeSet<StoredBlobReference> {
        &self.documents
    }

    /// Deletes the orphaned blobs and returns the canonical set.
    pub async fn commit(self, store: &BlobStore) -> BTreeSet<StoredBlobReference> {
        for reference in &self.remove {
            store.delete_best_effort(reference).await;
        }
        self.documents
    }

    /// Removes the blobs written for this submission.
    pub async fn abort(self, store: &BlobStore) {
        for reference in &self.written {
            store.delete_best_effort(reference).await;
        }
    }
}

#[derive(Debug)]
enum SlotChange {
    Unchanged,
    Replace(PendingBlob),
}

/// Plan for a single-valued blob field such as a profile picture
#[derive(Debug)]
pub struct SlotPlan {
    current: Option<StoredBlobReference>,
    change: SlotChange,
}

impl SlotPlan {
    /// `None` leaves the slot as it is. An echoed reference must be the
    /// current one.
    pub fn new(
        current: Option<&StoredBlobReference>,
        incoming: Option<RawPayloadOrReference>,
        kind: BlobKind,
    ) -> Result<Self, UploadError> {
        let change = match incoming {
            None => SlotChange::Unchanged,
            Some(RawPayloadOrReference::Reference(reference)) => {
                if current != Some(&reference) {
                    return Err(UploadError::ForeignReference(reference.to_string()));
                }
                SlotChange::Unchanged
            }
            Some(RawPayloadOrReference::Raw(data)) => {
                SlotChange::Replace(PendingBlob::classify(data, kind)?)
            }
        };

        Ok(Self {
            current: current.cloned(),
            change,
        })
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self.change, SlotChange::Unchanged)
    }

    pub async fn persist(self, store: &BlobStore) -> Result<PersistedSlot, UploadError> {
        match self.change {
            SlotChange::Unchanged => Ok(PersistedSlot {
                value: self.current,
                written: None,
                replaced: None,
            }),
            SlotChange::Replace(blob) => {
                let reference = store.store(&blob.data, blob.format).await?;
                Ok(PersistedSlot {
                    value: Some(reference.clone()),
                    written: Some(reference),
                    replaced: self.current,
                })
            }
        }
    }
}

#[derive(Debug)]
pub struct PersistedSlot {
    value: Option<StoredBlobReference>,
    written: Option<StoredBlobReference>,
    replaced: Option<StoredBlobReference>,
}

impl PersistedSlot {
    pub fn value(&self) -> Option<&StoredBlobReference> {
        self.value.as_ref()
    }

    pub async fn commit(self, store: &BlobStore) -> Option<StoredBlobReference> {
        if let Some(old) = &self.replaced {
            store.delete_best_effort(old).await;
        }
        self.value
    }

    pub async fn abort(self, store: &BlobStore) {
        if let Some(new) = &self.written {
            store.delete_best_effort(new).await;
        }
    }
}
