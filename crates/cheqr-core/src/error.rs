//! Error types for the cheqr-core library.

use thiserror::Error;

/// Main error type for the cheqr library.
#[derive(Error, Debug)]
pub enum CheqrError {
    /// OCR backend error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from an OCR backend call. All of these are page-scoped: the
/// pipeline degrades the affected page and keeps processing siblings.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend did not answer within the bounded wait.
    #[error("backend request timed out after {0}s")]
    Timeout(u64),

    /// The backend could not be reached or returned a failure status.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The response did not expose text or entities in a recognized shape.
    /// `raw_text` carries whatever text could still be recovered so the
    /// reconciler can fall back to pattern-only extraction.
    #[error("malformed backend response: {reason}")]
    Malformed {
        reason: String,
        raw_text: Option<String>,
    },
}

/// Errors from the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not create or open the database file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Party code generation kept colliding with existing codes.
    #[error("party code space exhausted after {0} attempts")]
    PartyCodeSpaceExhausted(u32),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No scan image could be extracted from a page.
    #[error("failed to extract page image: {0}")]
    ImageExtraction(String),
}

/// Result type for the cheqr library.
pub type Result<T> = std::result::Result<T, CheqrError>;
