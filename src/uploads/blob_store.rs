// src/uploads/blob_store.rs
//! Filesystem blob store for uploaded images and documents.
//!
//! Layout: `{root}/images/{uuid}.{png|jpeg}` and
//! `{root}/documents/{uuid}.{pdf|docx}`. The reference handed back to callers
//! is that path as a string; there is no manifest, so a blob exists for the
//! application only while some record holds its reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::UploadError;
use super::sniffer::{BlobKind, SniffedFormat};

#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub root: PathBuf,
}

/// Opaque reference to a persisted blob
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredBlobReference(String);

impl StoredBlobReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rehydrates a reference previously handed out by the store and read
    /// back from the database.
    pub(crate) fn from_persisted(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StoredBlobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference broken into its namespace and file name
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedReference {
    kind: BlobKind,
    format: SniffedFormat,
    file_name: String,
}

#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
    prefix: String,
}

impl BlobStore {
    /// Opens the store, creating both namespace directories if absent.
    pub async fn open(config: BlobStoreConfig) -> Result<Self, UploadError> {
        for kind in [BlobKind::Image, BlobKind::Document] {
            let dir = config.root.join(kind.namespace());
            fs::create_dir_all(&dir).await.map_err(|e| {
                error!(error = %e, dir = %dir.display(), "Failed to create blob directory");
                e
            })?;
        }

        let prefix = config
            .root
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();

        info!(root = %config.root.display(), "Blob store opened");

        Ok(Self {
            root: config.root,
            prefix,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `payload` under a fresh random name. Existing files are never
    /// overwritten.
    pub async fn store(
        &self,
        payload: &[u8],
        format: SniffedFormat,
    ) -> Result<StoredBlobReference, UploadError> {
        let file_name = format!("{}.{}", Uuid::new_v4().hyphenated(), format.extension());
        let path = self.root.join(format.kind().namespace()).join(&file_name);

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                error!(error = %e, path = %path.display(), "Failed to create blob file");
                e
            })?;

        let written = async {
            file.write_all(payload).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            error!(error = %e, path = %path.display(), "Failed to write blob file");
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }

        let reference = StoredBlobReference(format!(
            "{}/{}/{}",
            self.prefix,
            format.kind().namespace(),
            file_name
        ));

        info!(
            reference = %reference,
            kind = %format.kind(),
            size = payload.len(),
            "Blob stored"
        );

        Ok(reference)
    }

    /// True when `value` follows this store's naming convention. Purely
    /// syntactic: the file itself is not checked.
    pub fn is_stored_reference(&self, value: &str) -> bool {
        self.parse(value).is_some()
    }

    /// Typed form of [`BlobStore::is_stored_reference`]
    pub fn recognize(&self, value: &str) -> Option<StoredBlobReference> {
        self.parse(value)
            .map(|_| StoredBlobReference(value.to_string()))
    }

    /// Rebuilds the reference for a file served from `/{namespace}/{file_name}`
    pub fn lookup(&self, namespace: &str, file_name: &str) -> Option<StoredBlobReference> {
        self.recognize(&format!("{}/{}/{}", self.prefix, namespace, file_name))
    }

    pub fn format_of(&self, reference: &StoredBlobReference) -> Option<SniffedFormat> {
        self.parse(reference.as_str()).map(|parsed| parsed.format)
    }

    pub async fn read(&self, reference: &StoredBlobReference) -> Result<Vec<u8>, UploadError> {
        let path = self.path_of(reference)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(UploadError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a blob. Absent files are reported as `NotFound`.
    pub async fn delete(&self, reference: &StoredBlobReference) -> Result<(), UploadError> {
        let path = self.path_of(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(reference = %reference, "Blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(UploadError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletion as cleanup: failures are logged and swallowed.
    pub async fn delete_best_effort(&self, reference: &StoredBlobReference) {
        match self.delete(reference).await {
            Ok(()) => {}
            Err(UploadError::NotFound(_)) => {
                warn!(reference = %reference, "Blob already absent, nothing to delete");
            }
            Err(e) => {
                error!(reference = %reference, error = %e, "Failed to delete blob");
            }
        }
    }

    fn path_of(&self, reference: &StoredBlobReference) -> Result<PathBuf, UploadError> {
        let parsed = self
            .parse(reference.as_str())
            .ok_or_else(|| UploadError::NotFound(reference.to_string()))?;
        Ok(self
            .root
            .join(parsed.kind.namespace())
            .join(parsed.file_name))
    }

    fn parse(&self, value: &str) -> Option<ParsedReference> {
        let rest = value.strip_prefix(&self.prefix)?.strip_prefix('/')?;
        let (namespace, file_name) = rest.split_once('/')?;
        let kind = BlobKind::from_namespace(namespace)?;

        let (stem, extension) = file_name.rsplit_once('.')?;
        let format = SniffedFormat::from_extension(extension)?;
        if format.kind() != kind {
            debug!(value = %value, "Reference extension does not match its namespace");
            return None;
        }

        // Only the canonical lowercase hyphenated form minted by `store`
        let uuid = Uuid::parse_str(stem).ok()?;
        if uuid.hyphenated().to_string() != stem {
            return None;
        }

        Some(ParsedReference {
            kind,
            format,
            file_name: file_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploads::fixtures;
    use crate::uploads::sniffer::{classify, DocumentType, ImageType};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    async fn temp_store() -> (BlobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(BlobStoreConfig {
            root: dir.path().join("uploads"),
        })
        .await
        .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_open_creates_namespaces() {
        let (store, _dir) = temp_store().await;
        assert!(store.root().join("images").is_dir());
        assert!(store.root().join("documents").is_dir());

        // Opening again over the same root is fine
        BlobStore::open(BlobStoreConfig {
            root: store.root().to_path_buf(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_store_then_recognize() {
        let (store, _dir) = temp_store().await;
        let data = fixtures::png_bytes();
        let reference = store.store(&data, classify(&data).unwrap()).await.unwrap();

        assert!(store.is_stored_reference(reference.as_str()));
        assert!(reference.as_str().contains("/images/"));
        assert!(reference.as_str().ends_with(".png"));
        assert_eq!(store.read(&reference).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_documents_go_to_document_namespace() {
        let (store, _dir) = temp_store().await;
        let data = fixtures::docx_bytes();
        let reference = store
            .store(&data, SniffedFormat::Document(DocumentType::Docx))
            .await
            .unwrap();

        assert!(reference.as_str().contains("/documents/"));
        assert_eq!(
            store.format_of(&reference),
            Some(SniffedFormat::Document(DocumentType::Docx))
        );
    }

    #[tokio::test]
    async fn test_store_mints_unique_names() {
        let (store, _dir) = temp_store().await;
        let data = fixtures::png_bytes();
        let format = SniffedFormat::Image(ImageType::Png);
        let first = store.store(&data, format).await.unwrap();
        let second = store.store(&data, format).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_raw_base64_is_never_a_reference() {
        let (store, _dir) = temp_store().await;
        let encoded = STANDARD.encode(fixtures::png_bytes());
        assert!(!store.is_stored_reference(&encoded));
        assert!(!store.is_stored_reference(&STANDARD.encode(fixtures::pdf_bytes())));
    }

    #[tokio::test]
    async fn test_lookalike_references_are_rejected() {
        let (store, _dir) = temp_store().await;
        let prefix = store.root().to_string_lossy().to_string();
        let uuid = Uuid::new_v4();

        assert!(store.is_stored_reference(&format!("{}/images/{}.png", prefix, uuid)));
        // Wrong namespace for the extension
        assert!(!store.is_stored_reference(&format!("{}/documents/{}.png", prefix, uuid)));
        // Unknown namespace
        assert!(!store.is_stored_reference(&format!("{}/other/{}.png", prefix, uuid)));
        // Not a uuid, or traversal attempts
        assert!(!store.is_stored_reference(&format!("{}/images/avatar.png", prefix)));
        assert!(!store.is_stored_reference(&format!("{}/images/../../etc/passwd.png", prefix)));
        // Different root
        assert!(!store.is_stored_reference(&format!("/elsewhere/images/{}.png", uuid)));
        // Uppercase uuid is not the canonical form
        assert!(!store.is_stored_reference(&format!(
            "{}/images/{}.png",
            prefix,
            uuid.hyphenated().to_string().to_uppercase()
        )));
    }

    #[tokio::test]
    async fn test_delete_reports_missing_blob() {
        let (store, _dir) = temp_store().await;
        let data = fixtures::pdf_bytes();
        let reference = store
            .store(&data, SniffedFormat::Document(DocumentType::Pdf))
            .await
            .unwrap();

        store.delete(&reference).await.unwrap();
        assert!(matches!(
            store.delete(&reference).await,
            Err(UploadError::NotFound(_))
        ));

        // Best-effort variant swallows the same condition
        store.delete_best_effort(&reference).await;
    }

    #[tokio::test]
    async fn test_lookup_by_namespace_and_file_name() {
        let (store, _dir) = temp_store().await;
        let data = fixtures::jpeg_bytes();
        let reference = store
            .store(&data, SniffedFormat::Image(ImageType::Jpeg))
            .await
            .unwrap();
        let file_name = reference.as_str().rsplit('/').next().unwrap();

        assert_eq!(store.lookup("images", file_name), Some(reference.clone()));
        assert_eq!(store.lookup("documents", file_name), None);
        assert_eq!(store.lookup("images", "..%2F..%2Fsecret"), None);
    }
}
