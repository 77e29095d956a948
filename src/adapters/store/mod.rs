//! Claim store abstraction layer
//!
//! Trait-based persistence so ingest and query run unchanged against the
//! in-memory, file-snapshot, or PostgreSQL backends.

pub mod factory;
pub mod memory;
pub mod models;
pub mod traits;

pub use factory::create_claim_store;
pub use memory::MemoryClaimStore;
pub use models::{
    BatchInsertResult, FailedRow, FailureKind, StoreStats, UploadLog, UploadStatus,
};
pub use traits::ClaimStore;
