// src/uploads/payload.rs
//! Boundary decoding of client-submitted file fields.
//!
//! A submitted string is either a reference the client echoes back unchanged or
//! a base64 payload (optionally wrapped in a `data:` URI). It is resolved
//! exactly once, here, into [`RawPayloadOrReference`].

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::blob_store::{BlobStore, StoredBlobReference};
use super::error::UploadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayloadOrReference {
    Raw(Vec<u8>),
    Reference(StoredBlobReference),
}

impl RawPayloadOrReference {
    /// Resolves one submitted value. References are recognised by the store's
    /// naming convention and are never decoded.
    pub fn from_submitted(
        value: &str,
        store: &BlobStore,
        max_bytes: usize,
    ) -> Result<Self, UploadError> {
        let value = value.trim();
        if let Some(reference) = store.recognize(value) {
            return Ok(RawPayloadOrReference::Reference(reference));
        }
        decode_base64(value, max_bytes).map(RawPayloadOrReference::Raw)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, RawPayloadOrReference::Reference(_))
    }
}

/// Resolves an optional single-file field. Absent and empty values both mean
/// "no change".
pub fn resolve_optional(
    value: Option<&str>,
    store: &BlobStore,
    max_bytes: usize,
) -> Result<Option<RawPayloadOrReference>, UploadError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => RawPayloadOrReference::from_submitted(v, store, max_bytes).map(Some),
    }
}

/// Resolves a list field, stopping at the first value that fails.
pub fn resolve_all(
    values: &[String],
    store: &BlobStore,
    max_bytes: usize,
) -> Result<Vec<RawPayloadOrReference>, UploadError> {
    values
        .iter()
        .map(|v| RawPayloadOrReference::from_submitted(v, store, max_bytes))
        .collect()
}

/// Decodes standard base64, accepting `data:<mime>;base64,` prefixes and
/// embedded whitespace.
pub fn decode_base64(value: &str, max_bytes: usize) -> Result<Vec<u8>, UploadError> {
    let encoded = strip_data_uri(value);
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(UploadError::InvalidPayload("payload is empty".to_string()));
    }

    // Reject before allocating the decoded buffer
    let estimated = cleaned.len() / 4 * 3;
    if estimated > max_bytes.saturating_add(2) {
        return Err(UploadError::PayloadTooLarge {
            actual: estimated,
            limit: max_bytes,
        });
    }

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| UploadError::InvalidPayload(format!("payload is not valid base64: {}", e)))?;

    if bytes.len() > max_bytes {
        return Err(UploadError::PayloadTooLarge {
            actual: bytes.len(),
            limit: max_bytes,
        });
    }

    Ok(bytes)
}

fn strip_data_uri(value: &str) -> &str {
    if value.starts_with("data:") {
        value.split_once(',').map(|(_, data)| data).unwrap_or(value)
    } else {
        value
    }
}
