//! Secret wrapper for credentials held in configuration
//!
//! The store connection string is the only secret claimrecon handles. It is
//! wrapped in `secrecy::Secret` so it is zeroed on drop and redacted in
//! `Debug` output; callers must go through `expose_secret()` to read it.
//!
//! ```rust
//! use claimrecon::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let conn = secret_string("postgresql://claims:pw@localhost/claims".to_string());
//! assert!(conn.expose_secret().starts_with("postgresql://"));
//! assert!(!format!("{conn:?}").contains("pw@"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype satisfying the `secrecy` marker traits
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Returns true if the secret is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the secret starts with `prefix`
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string held in configuration
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("postgres://localhost".to_string());
        assert_eq!(secret.expose_secret().as_ref(), "postgres://localhost");
        assert!(secret.expose_secret().starts_with("postgres://"));
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("sensitive-data"));
    }

    #[test]
    fn test_secret_toml_roundtrip() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            connection_string: SecretString,
        }

        let parsed: Section = toml::from_str("connection_string = \"postgres://db\"").unwrap();
        assert_eq!(parsed.connection_string.expose_secret().as_ref(), "postgres://db");

        let out = toml::to_string(&parsed).unwrap();
        assert!(out.contains("postgres://db"));
    }
}
