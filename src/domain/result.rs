//! Result type alias for claimrecon
//!
//! This module provides a convenient Result type alias that uses
//! ClaimReconError as the error type.

use super::errors::ClaimReconError;

/// Result type alias for claimrecon operations
///
/// # Examples
///
/// ```
/// use claimrecon::domain::result::Result;
/// use claimrecon::domain::errors::ClaimReconError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ClaimReconError::Validation("SEP column is missing".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ClaimReconError>;
