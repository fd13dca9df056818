use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use super::secret::VerificationSecret;

/// Claim set produced by `TokenIssuer::mint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedClaims {
    pub iss: String,
    pub sub: String,
    pub exp: i64,
    pub nbf: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub claims: IssuedClaims,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("ttl of {0} seconds overflows the expiry timestamp")]
    TtlOverflow(u64),
}

/// Mints short-lived HS256 tokens. Used by tooling and tests, never on the
/// request path.
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &VerificationSecret, issuer: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            issuer: issuer.into(),
            ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mint a token valid from `now` for `ttl_seconds`, with a random jti.
    pub fn mint(&self, sub: &str, now: i64) -> Result<IssuedToken, IssueError> {
        self.mint_with_jti(sub, &Uuid::new_v4().to_string(), now)
    }

    pub fn mint_with_jti(&self, sub: &str, jti: &str, now: i64) -> Result<IssuedToken, IssueError> {
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(IssueError::TtlOverflow(self.ttl_seconds))?;

        let claims = IssuedClaims {
            iss: self.issuer.clone(),
            sub: sub.to_string(),
            exp,
            nbf: now,
            iat: now,
            jti: jti.to_string(),
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken { claims, token })
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, IssueError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            IssueError::from(e)
        })
    }
}
