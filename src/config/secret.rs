//! Credentials held in configuration
//!
//! The OAuth2 client secret and the basic-auth password travel through the
//! relay as [`SecretString`]: wiped from memory on drop, printed as
//! `[REDACTED]` by `Debug`. They are exposed only when a request is signed.
//!
//! ```rust
//! use secrecy::ExposeSecret;
//! use transform_relay::config::secret_string;
//!
//! let client_secret = secret_string("s3cret".to_string());
//! assert_eq!(client_secret.expose_secret().as_ref(), "s3cret");
//! assert!(!format!("{client_secret:?}").contains("s3cret"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Credential text; only reachable through `ExposeSecret`
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

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
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

/// A credential as stored in [`RelayConfig`](super::RelayConfig)
pub type SecretString = Secret<SecretValue>;

/// Wraps plain text as a [`SecretString`]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_exposed_value_matches_input() {
        let secret = secret_string("client-secret".to_string());
        assert_eq!(secret.expose_secret(), "client-secret");
        assert!(!secret.expose_secret().is_empty());
        assert!(secret_string(String::new()).expose_secret().is_empty());
    }

    #[test]
    fn test_debug_output_hides_value() {
        let secret = secret_string("client-secret".to_string());
        assert!(!format!("{secret:?}").contains("client-secret"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let secret = secret_string("client-secret".to_string());
        assert_eq!(serde_json::to_string(&secret).unwrap(), r#""client-secret""#);
    }

    #[test]
    fn test_secret_deserializes_inside_tuple() {
        let (user, pass): (String, SecretString) =
            serde_json::from_str(r#"["alice", "s3cret"]"#).unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass.expose_secret(), "s3cret");
    }
}
