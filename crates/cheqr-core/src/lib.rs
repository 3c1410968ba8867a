//! Core library for cheque OCR processing.
//!
//! This crate provides:
//! - Page-image extraction from scanned cheque PDFs
//! - OCR backend clients (document, vision, generative) behind one trait
//! - Tiered field extraction: backend entities with pattern-rule fallback
//! - Party identity resolution keyed by bank account number
//! - A SQLite record store with an account-uniqueness constraint

pub mod backend;
pub mod error;
pub mod extract;
pub mod models;
pub mod party;
pub mod pdf;
pub mod pipeline;
pub mod store;

pub use backend::{BackendResponse, OcrBackend, PageContent, build_backend};
pub use error::{BackendError, CheqrError, PdfError, Result, StoreError};
pub use extract::{PatternExtractor, Reconciler};
pub use models::{
    CheqrConfig, ChequeField, FieldSet, FieldValue, PageImage, PageResult, PartyRecord,
    ProcessingStatus, StoredCheque,
};
pub use party::PartyResolver;
pub use pdf::ScannedDocument;
pub use pipeline::ChequePipeline;
pub use store::{ChequeStore, SqliteStore};
