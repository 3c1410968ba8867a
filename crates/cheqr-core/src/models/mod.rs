//! Data models for cheque records and pipeline configuration.

pub mod config;
pub mod field;
pub mod record;

pub use config::{BackendConfig, BackendKind, CheqrConfig, ExtractionConfig, StoreConfig};
pub use field::{ChequeField, FieldSet, FieldValue, REVIEW_THRESHOLD};
pub use record::{NewCheque, PageImage, PageResult, PartyRecord, ProcessingStatus, StoredCheque};
