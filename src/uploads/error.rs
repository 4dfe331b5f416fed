// src/uploads/error.rs

/// Failures raised while sniffing, storing, or reconciling uploaded blobs.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Payload of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { actual: usize, limit: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Reference is not attached to this record: {0}")]
    ForeignReference(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] std::io::Error),
}

impl UploadError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        UploadError::UnsupportedFormat(message.into())
    }
}
