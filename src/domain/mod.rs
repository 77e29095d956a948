//! Domain models and types for claimrecon.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ClaimId`], [`CaseMixCode`])
//! - **Row model** ([`CellValue`], [`ClaimRow`], [`Dataset`])
//! - **Column catalogue** ([`columns`])
//! - **Error types** ([`ClaimReconError`], [`FormatError`], [`QueryError`])
//! - **Result type alias** ([`Result`])
//!
//! # Generic and typed access
//!
//! ```rust
//! use claimrecon::domain::{CellValue, ClaimRow};
//!
//! let row = ClaimRow::from_pairs([
//!     ("SEP", CellValue::from_raw("0301R0011124V000123")),
//!     ("INACBG", CellValue::from_raw("K-4-17-I")),
//!     ("TARIF_RS", CellValue::Number(1_000_000.0)),
//! ]);
//!
//! assert_eq!(row.get("TARIF_RS"), Some(&CellValue::Number(1_000_000.0)));
//! assert_eq!(row.hospital_tariff(), 1_000_000.0);
//! assert!(row.claim_id().is_some());
//! ```

pub mod columns;
pub mod errors;
pub mod ids;
pub mod result;
pub mod row;

// Re-export commonly used types for convenience
pub use errors::{ClaimReconError, FormatError, QueryError, ReaderAttempt};
pub use ids::{CaseMixCode, ClaimId, SeverityMarker};
pub use result::Result;
pub use row::{CellValue, ClaimRow, Dataset};
