//! Domain identifier types with validation
//!
//! Newtype wrappers for the claim identifier (SEP) and the INACBG case-mix code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Claim identifier newtype wrapper
///
/// Represents the SEP number that uniquely identifies one claim episode.
/// Surrounding whitespace is trimmed; an empty identifier is rejected.
///
/// # Examples
///
/// ```
/// use claimrecon::domain::ids::ClaimId;
/// use std::str::FromStr;
///
/// let sep = ClaimId::from_str(" 0301R0011124V000123 ").unwrap();
/// assert_eq!(sep.as_str(), "0301R0011124V000123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimId(String);

impl ClaimId {
    /// Creates a new ClaimId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClaimId)` if the trimmed ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Claim identifier (SEP) cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the claim ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClaimId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ClaimId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Severity level encoded in the last segment of an INACBG code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityMarker {
    /// Trailing segment `0` (ambulatory / no severity)
    Zero,
    /// Trailing segment `I`, `II` or `III` (any case)
    Roman,
    /// Any other trailing segment, or fewer than four segments
    Other,
}

/// INACBG case-mix code
///
/// A dash-separated code such as `K-4-17-I`. Only codes with at least four
/// segments carry a severity marker.
///
/// # Examples
///
/// ```
/// use claimrecon::domain::ids::{CaseMixCode, SeverityMarker};
///
/// assert_eq!(CaseMixCode::new("K-4-17-I").severity(), SeverityMarker::Roman);
/// assert_eq!(CaseMixCode::new("K-4-17-0").severity(), SeverityMarker::Zero);
/// assert_eq!(CaseMixCode::new("ABC").severity(), SeverityMarker::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseMixCode(String);

impl CaseMixCode {
    /// Wraps a raw code; whitespace is trimmed
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing segment when the code has at least four dash-separated parts
    pub fn marker(&self) -> Option<&str> {
        let parts: Vec<&str> = self.0.split('-').collect();
        if parts.len() >= 4 {
            parts.last().map(|p| p.trim())
        } else {
            None
        }
    }

    /// Classifies the trailing segment
    pub fn severity(&self) -> SeverityMarker {
        match self.marker() {
            Some("0") => SeverityMarker::Zero,
            Some(m)
                if m.eq_ignore_ascii_case("I")
                    || m.eq_ignore_ascii_case("II")
                    || m.eq_ignore_ascii_case("III") =>
            {
                SeverityMarker::Roman
            }
            _ => SeverityMarker::Other,
        }
    }
}

impl fmt::Display for CaseMixCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
