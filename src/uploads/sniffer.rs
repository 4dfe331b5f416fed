// src/uploads/sniffer.rs
//! Content-based format detection for uploaded blobs.
//!
//! Classification only ever looks at the bytes. Filenames, extensions and
//! client-supplied MIME types are never consulted.

use std::fmt;
use std::io::{Cursor, Read};

use super::error::UploadError;

/// Upper bound on the `[Content_Types].xml` entry read while probing a DOCX
const MAX_CONTENT_TYPES_BYTES: u64 = 1024 * 1024;

/// How far into the buffer a `%PDF-` header may start
const PDF_HEADER_WINDOW: usize = 1024;

/// Storage namespace a blob belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKind {
    Image,
    Document,
}

impl BlobKind {
    pub fn namespace(&self) -> &'static str {
        match self {
            BlobKind::Image => "images",
            BlobKind::Document => "documents",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "images" => Some(BlobKind::Image),
            "documents" => Some(BlobKind::Document),
            _ => None,
        }
    }
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobKind::Image => write!(f, "image"),
            BlobKind::Document => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Pdf,
    Docx,
}

/// Result of a successful classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SniffedFormat {
    Image(ImageType),
    Document(DocumentType),
}

impl SniffedFormat {
    pub fn kind(&self) -> BlobKind {
        match self {
            SniffedFormat::Image(_) => BlobKind::Image,
            SniffedFormat::Document(_) => BlobKind::Document,
        }
    }

    /// Canonical file extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            SniffedFormat::Image(ImageType::Png) => "png",
            SniffedFormat::Image(ImageType::Jpeg) => "jpeg",
            SniffedFormat::Document(DocumentType::Pdf) => "pdf",
            SniffedFormat::Document(DocumentType::Docx) => "docx",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "png" => Some(SniffedFormat::Image(ImageType::Png)),
            "jpeg" => Some(SniffedFormat::Image(ImageType::Jpeg)),
            "pdf" => Some(SniffedFormat::Document(DocumentType::Pdf)),
            "docx" => Some(SniffedFormat::Document(DocumentType::Docx)),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SniffedFormat::Image(ImageType::Png) => "image/png",
            SniffedFormat::Image(ImageType::Jpeg) => "image/jpeg",
            SniffedFormat::Document(DocumentType::Pdf) => "application/pdf",
            SniffedFormat::Document(DocumentType::Docx) => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Classifies a decoded payload as a PNG/JPEG image or a PDF/DOCX document.
///
/// Buffers whose magic bytes announce an image must fully decode as PNG or
/// JPEG. Everything else is tried as a PDF and then as a DOCX container.
pub fn classify(data: &[u8]) -> Result<SniffedFormat, UploadError> {
    if data.is_empty() {
        return Err(UploadError::unsupported("payload is empty"));
    }

    if infer::is_image(data) {
        return classify_image(data).map(SniffedFormat::Image);
    }

    classify_document(data).map(SniffedFormat::Document)
}

/// Like [`classify`], but the content must also belong to `expected`.
pub fn classify_as(data: &[u8], expected: BlobKind) -> Result<SniffedFormat, UploadError> {
    let format = classify(data)?;
    if format.kind() != expected {
        return Err(UploadError::unsupported(format!(
            "expected {} content but received {}",
            expected,
            format.extension()
        )));
    }
    Ok(format)
}

fn classify_image(data: &[u8]) -> Result<ImageType, UploadError> {
    let format = image::guess_format(data)
        .map_err(|e| UploadError::unsupported(format!("unrecognised image data: {}", e)))?;

    let image_type = match format {
        image::ImageFormat::Png => ImageType::Png,
        image::ImageFormat::Jpeg => ImageType::Jpeg,
        other => {
            return Err(UploadError::unsupported(format!(
                "image format {:?} is not accepted, only PNG and JPEG",
                other
            )))
        }
    };

    image::load_from_memory_with_format(data, format)
        .map_err(|e| UploadError::unsupported(format!("image could not be decoded: {}", e)))?;

    Ok(image_type)
}

fn classify_document(data: &[u8]) -> Result<DocumentType, UploadError> {
    let pdf_error = match parse_pdf(data) {
        Ok(()) => return Ok(DocumentType::Pdf),
        Err(reason) => reason,
    };

    match parse_docx(data) {
        Ok(()) => Ok(DocumentType::Docx),
        Err(docx_error) => Err(UploadError::unsupported(format!(
            "content is neither a PDF ({}) nor a DOCX ({})",
            pdf_error, docx_error
        ))),
    }
}

fn parse_pdf(data: &[u8]) -> Result<(), String> {
    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    if !window.windows(5).any(|w| w == b"%PDF-") {
        return Err("missing %PDF- header".to_string());
    }

    let document = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;
    if document.get_pages().is_empty() {
        return Err("document has no pages".to_string());
    }
    Ok(())
}

fn parse_docx(data: &[u8]) -> Result<(), String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| format!("not a zip container: {}", e))?;

    let mut content_types = String::new();
    {
        let entry = archive
            .by_name("[Content_Types].xml")
            .map_err(|_| "missing [Content_Types].xml".to_string())?;
        if entry.size() > MAX_CONTENT_TYPES_BYTES {
            return Err("[Content_Types].xml is too large".to_string());
        }
        entry
            .take(MAX_CONTENT_TYPES_BYTES)
            .read_to_string(&mut content_types)
            .map_err(|e| format!("unreadable [Content_Types].xml: {}", e))?;
    }

    if !content_types.contains("wordprocessingml.document") {
        return Err("container is not a Word document".to_string());
    }

    archive
        .by_name("word/document.xml")
        .map_err(|_| "missing word/document.xml".to_string())?;

    Ok(())
}
