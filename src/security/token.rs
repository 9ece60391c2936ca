//! Signed identity tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    TokenMalformed(String),

    #[error("token signature is invalid")]
    TokenSignatureInvalid,

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("token creation failed: {0}")]
    Creation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Caller-supplied claims such as `role`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Builds the service from a base64-encoded HMAC key.
    pub fn from_base64_secret(secret: &str, ttl_seconds: u64) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_base64_secret(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let decoding = DecodingKey::from_base64_secret(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| TokenError::InvalidKey(format!("ttl out of range: {ttl_seconds}")))?;

        Ok(Self {
            encoding,
            decoding,
            ttl,
        })
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `subject` using the configured lifetime.
    pub fn issue(&self, subject: &str, claims: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, claims, self.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        subject: &str,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            extra: claims,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Verifies the signature and returns every claim. Expiry is not checked
    /// here; see [`TokenService::is_valid`].
    pub fn extract_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::TokenSignatureInvalid,
                _ => TokenError::TokenMalformed(e.to_string()),
            })
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.extract_claims(token).map(|claims| claims.sub)
    }

    /// True iff the token verifies, names `expected_subject`, and has not
    /// expired. Account status is not consulted.
    #[must_use]
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        self.is_valid_at(token, expected_subject, Utc::now().timestamp())
    }

    #[must_use]
    pub fn is_valid_at(&self, token: &str, expected_subject: &str, now: i64) -> bool {
        self.extract_claims(token)
            .is_ok_and(|claims| claims.sub == expected_subject && now < claims.exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::generate_jwt_secret;

    fn service() -> TokenService {
        TokenService::from_base64_secret(&generate_jwt_secret(), 3600).unwrap()
    }

    fn role_claim(role: &str) -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("role".to_string(), Value::String(role.to_string()));
        claims
    }

    #[test]
    fn issued_token_carries_subject_and_claims() {
        let tokens = service();
        let token = tokens.issue("alice", role_claim("ADMIN")).unwrap();

        assert_eq!(tokens.extract_subject(&token).unwrap(), "alice");
        let claims = tokens.extract_claims(&token).unwrap();
        assert_eq!(claims.extra.get("role"), Some(&Value::from("ADMIN")));
        assert_eq!(claims.exp - claims.iat, tokens.ttl().num_seconds());
        assert!(tokens.is_valid(&token, "alice"));
    }

    #[test]
    fn subject_mismatch_is_invalid() {
        let tokens = service();
        let token = tokens.issue("alice", Map::new()).unwrap();
        assert!(!tokens.is_valid(&token, "bob"));
    }

    #[test]
    fn expired_token_still_yields_subject_but_is_invalid() {
        let tokens = service();
        let token = tokens
            .issue_with_ttl("alice", Map::new(), Duration::seconds(-60))
            .unwrap();

        assert_eq!(tokens.extract_subject(&token).unwrap(), "alice");
        assert!(!tokens.is_valid(&token, "alice"));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let tokens = service();
        let token = tokens.issue("alice", Map::new()).unwrap();
        let exp = tokens.extract_claims(&token).unwrap().exp;

        assert!(tokens.is_valid_at(&token, "alice", exp - 1));
        assert!(!tokens.is_valid_at(&token, "alice", exp));
    }

    #[test]
    fn foreign_key_signature_is_rejected() {
        let token = service().issue("alice", Map::new()).unwrap();
        let err = service().extract_subject(&token).unwrap_err();
        assert!(matches!(err, TokenError::TokenSignatureInvalid));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = service().extract_subject("not.a.token").unwrap_err();
        assert!(matches!(err, TokenError::TokenMalformed(_)));
    }

    #[test]
    fn rejects_non_base64_secret() {
        assert!(TokenService::from_base64_secret("%%%", 60).is_err());
    }
}
