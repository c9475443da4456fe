//! Signing and verification of access and refresh tokens.
//!
//! [`TokenCodec`] owns one HMAC key pair per token class. Access tokens live
//! 15 minutes and refresh tokens 7 days by default (see
//! [`JwtConfig`](lectern_config::JwtConfig)).
//!
//! Verification fails closed: a bad signature, a malformed token, an expired
//! token or a token of the other class all yield [`TokenError::Invalid`],
//! never a partially decoded payload.
//!
//! # Example
//!
//! ```ignore
//! let codec = TokenCodec::new(&jwt_config);
//! let refresh = codec.sign_refresh(&payload, family)?;
//!
//! assert!(codec.verify_access(&refresh).is_err());
//! let claims = codec.verify_refresh(&refresh)?;
//! assert_eq!(claims.family, family);
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use lectern_config::JwtConfig;
use lectern_models::FamilyId;

use crate::claims::{AccessClaims, RefreshClaims, TokenKind, TokenPayload, TypedClaims};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed, wrongly signed, wrong class, or expired.
    #[error("Invalid or expired token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: KeyPair::from_secret(&config.access_secret),
            refresh: KeyPair::from_secret(&config.refresh_secret),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
            validation,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Signs an access token for `payload` with a fresh `jti`.
    pub fn sign_access(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            payload: payload.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now as usize,
            exp: (now + self.access_ttl.num_seconds()) as usize,
            typ: TokenKind::Access,
        };

        self.sign(&claims, &self.access)
    }

    /// Signs a refresh token for `payload` belonging to `family`.
    pub fn sign_refresh(
        &self,
        payload: &TokenPayload,
        family: FamilyId,
    ) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            payload: payload.clone(),
            family,
            jti: Uuid::new_v4().to_string(),
            iat: now as usize,
            exp: (now + self.refresh_ttl.num_seconds()) as usize,
            typ: TokenKind::Refresh,
        };

        self.sign(&claims, &self.refresh)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify::<AccessClaims>(token, &self.access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify::<RefreshClaims>(token, &self.refresh)
    }

    fn sign<C: Serialize>(&self, claims: &C, keys: &KeyPair) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding).map_err(TokenError::Signing)
    }

    fn verify<C>(&self, token: &str, keys: &KeyPair) -> Result<C, TokenError>
    where
        C: TypedClaims + DeserializeOwned,
    {
        let claims = decode::<C>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(kind = ?C::KIND, error = %e, "Token verification failed");
                TokenError::Invalid
            })?;

        if claims.kind() != C::KIND {
            debug!(expected = ?C::KIND, found = ?claims.kind(), "Token class mismatch");
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }
}
