//! Ingestion pipeline
//!
//! - [`detect`] - format, encoding and delimiter detection
//! - [`extract`] - delimited and spreadsheet extraction into a [`Dataset`](crate::domain::Dataset)
//! - [`validate`] - integrity rules, warnings and row hashes
//! - [`dedup`] - new/duplicate partition against the store's key set
//! - [`tariff`] - case-mix tariff multiplier
//! - [`batch`] - batched writes to the store
//! - [`coordinator`] - the pipeline itself
//! - [`summary`] - per-upload summary

pub mod batch;
pub mod coordinator;
pub mod dedup;
pub mod detect;
pub mod extract;
pub mod summary;
pub mod tariff;
pub mod validate;

pub use batch::{BatchPersister, BatchResult};
pub use coordinator::{IngestCoordinator, INTERRUPTED_REASON};
pub use dedup::{partition, partition_with_keys, DedupOutcome};
pub use detect::{Detection, FileFormat, FormatDetector, SpreadsheetKind};
pub use extract::{ExtractedTable, TabularExtractor};
pub use summary::{IngestError, IngestErrorType, IngestSummary};
pub use tariff::{AdjustmentSummary, TariffAdjustmentEngine};
pub use validate::{row_hash, IntegrityValidator, ValidationReport};
