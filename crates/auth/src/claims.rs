use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clubhouse_core::UserId;

/// Bearer token claims (transport-agnostic).
///
/// The minimal set Clubhouse expects once a token has been decoded. `sub` is
/// the identity provider's user identifier and is treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / principal identifier.
    pub sub: String,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(sub: impl Into<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: sub.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token has no usable subject")]
    MissingSubject,
}

/// Deterministically validate token claims against `now`.
///
/// Signature verification happens in the [`TokenVerifier`]; this checks the
/// time window only.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

/// Verifies a bearer token and yields the authenticated principal.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError>;
}

/// HMAC-SHA256 shared-secret verifier.
pub struct Hs256TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller-supplied clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;

        UserId::new(data.claims.sub).map_err(|_| TokenError::MissingSubject)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    fn mint(secret: &str, claims: &TokenClaims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_subject() {
        let now = Utc::now();
        let token = mint("s3cret", &TokenClaims::new("auth0|u1", now, Duration::minutes(5)));

        let verifier = Hs256TokenVerifier::new(b"s3cret");
        assert_eq!(verifier.verify(&token, now).unwrap().as_str(), "auth0|u1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = mint("s3cret", &TokenClaims::new("u1", now, Duration::minutes(5)));

        let verifier = Hs256TokenVerifier::new(b"other");
        assert!(matches!(verifier.verify(&token, now), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(1);
        let token = mint("s3cret", &TokenClaims::new("u1", issued, Duration::minutes(5)));

        let verifier = Hs256TokenVerifier::new(b"s3cret");
        assert_eq!(verifier.verify(&token, Utc::now()), Err(TokenError::Expired));
    }

    #[test]
    fn empty_subject_is_rejected() {
        let now = Utc::now();
        let token = mint("s3cret", &TokenClaims::new("", now, Duration::minutes(5)));

        let verifier = Hs256TokenVerifier::new(b"s3cret");
        assert_eq!(verifier.verify(&token, now), Err(TokenError::MissingSubject));
    }

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "u1".to_string(),
            iat: now.timestamp(),
            exp: now.timestamp(),
        };
        assert_eq!(validate_claims(&claims, now), Err(TokenError::InvalidTimeWindow));

        let future = TokenClaims::new("u1", now + Duration::minutes(1), Duration::minutes(5));
        assert_eq!(validate_claims(&future, now), Err(TokenError::NotYetValid));
    }
}
