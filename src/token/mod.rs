//! Token issuance.
//!
//! Claims are an arbitrary string-keyed map; `issue` injects the expiration
//! timestamp and signs the full set with the active secret (HS256). No
//! verification API is provided; consumers validate tokens on their side,
//! so rotated fallback secrets never show up here.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use thiserror::Error;

/// Token lifetime applied when the caller does not override it.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no active signing secret configured")]
    MissingSecret,
    #[error("failed to encode token")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Signs claim sets with the active secret.
pub struct TokenSigner {
    key: EncodingKey,
}

impl TokenSigner {
    /// Build a signer from the active secret.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSecret`] if the configured secret is empty.
    pub fn new(secret: &SecretString) -> Result<Self, Error> {
        let secret = secret.expose_secret();

        if secret.is_empty() {
            return Err(Error::MissingSecret);
        }

        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Sign `claims` after injecting `exp = now + ttl_minutes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub fn issue(&self, mut claims: Map<String, Value>, ttl_minutes: i64) -> Result<String, Error> {
        let exp = Utc::now().timestamp() + ttl_minutes * 60;

        claims.insert("exp".to_string(), Value::from(exp));

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &Value::Object(claims),
            &self.key,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use jsonwebtoken::{DecodingKey, Validation};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct DecodedClaims {
        user: String,
        exp: i64,
    }

    fn signer(secret: &str) -> Result<TokenSigner> {
        TokenSigner::new(&SecretString::from(secret.to_string())).context("signer")
    }

    fn decode(secret: &str, token: &str) -> Result<DecodedClaims> {
        let data = jsonwebtoken::decode::<DecodedClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    fn user_claims(user: &str) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("user".to_string(), Value::from(user));
        claims
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let result = TokenSigner::new(&SecretString::default());
        assert!(matches!(result, Err(Error::MissingSecret)));
    }

    #[test]
    fn issue_injects_expiration() -> Result<()> {
        let signer = signer("top-secret")?;
        let before = Utc::now().timestamp();

        let token = signer.issue(user_claims("admin"), DEFAULT_TTL_MINUTES)?;
        let claims = decode("top-secret", &token)?;

        let after = Utc::now().timestamp();
        assert_eq!(claims.user, "admin");
        assert!(claims.exp >= before + 60 * 60);
        assert!(claims.exp <= after + 60 * 60);
        Ok(())
    }

    #[test]
    fn issue_honors_custom_ttl() -> Result<()> {
        let signer = signer("top-secret")?;
        let before = Utc::now().timestamp();

        let token = signer.issue(user_claims("admin"), 5)?;
        let claims = decode("top-secret", &token)?;

        assert!(claims.exp >= before + 5 * 60);
        assert!(claims.exp < before + 6 * 60);
        Ok(())
    }

    #[test]
    fn tokens_differ_per_subject() -> Result<()> {
        let signer = signer("top-secret")?;

        let first = signer.issue(user_claims("admin"), DEFAULT_TTL_MINUTES)?;
        let second = signer.issue(user_claims("guest"), DEFAULT_TTL_MINUTES)?;

        assert_ne!(first, second);
        assert_eq!(decode("top-secret", &first)?.user, "admin");
        assert_eq!(decode("top-secret", &second)?.user, "guest");
        Ok(())
    }

    #[test]
    fn token_does_not_verify_with_another_secret() -> Result<()> {
        let signer = signer("top-secret")?;
        let token = signer.issue(user_claims("admin"), DEFAULT_TTL_MINUTES)?;

        assert!(decode("other-secret", &token).is_err());
        Ok(())
    }
}
