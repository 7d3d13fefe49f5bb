//! JWT issuance and verification for API authentication.
//!
//! Two token kinds are issued: short-lived access tokens presented on
//! every authenticated request, and long-lived refresh tokens that are
//! additionally persisted server-side so they can be revoked.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use techhome_domain::error::{AuthError, HomeError};
use techhome_domain::id::UserId;
use techhome_domain::time::Timestamp;
use techhome_domain::user::User;

/// Distinguishes access from refresh tokens so one cannot stand in for
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Username, carried for logging.
    pub username: String,
    pub kind: TokenKind,
    /// Expiration, unix seconds.
    pub exp: i64,
    /// Issued at, unix seconds.
    pub iat: i64,
    pub iss: String,
    /// Unique token identifier.
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into a [`UserId`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the subject is not a UUID.
    pub fn user_id(&self) -> Result<UserId, HomeError> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken.into())
    }
}

/// Creates and verifies JWTs with a shared HS256 secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl JwtService {
    /// Create a new service from the shared secret and token lifetimes.
    #[must_use]
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        access_ttl: chrono::Duration,
        refresh_ttl: chrono::Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue an access token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if encoding fails (wrong key
    /// material), which should not happen with an HS256 secret.
    pub fn issue_access(&self, user: &User) -> Result<String, HomeError> {
        self.issue(user, TokenKind::Access, self.access_ttl)
            .map(|(token, _)| token)
    }

    /// Issue a refresh token for `user`, returning its expiry so the
    /// caller can persist the token record.
    ///
    /// # Errors
    ///
    /// Same failure mode as [`issue_access`](Self::issue_access).
    pub fn issue_refresh(&self, user: &User) -> Result<(String, Timestamp), HomeError> {
        self.issue(user, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(
        &self,
        user: &User,
        kind: TokenKind,
        ttl: chrono::Duration,
    ) -> Result<(String, Timestamp), HomeError> {
        let now = techhome_domain::time::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            kind,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidToken)?;
        Ok((token, expires_at))
    }

    /// Verify a token of the expected kind and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] when the signature, issuer, or
    /// expiry check fails, or when the token is of the wrong kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, HomeError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.kind != expected {
            return Err(AuthError::InvalidToken.into());
        }
        Ok(claims)
    }
}
