//! HS256 token codec.
//!
//! Verifies the signature of a compact JWS and hands back the raw claim map.
//! Claim semantics (`exp`, `nbf`, `iss`, ...) are NOT interpreted here; that is
//! the job of `policy`.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use tracing::debug;

use super::secret::VerificationSecret;

/// Decoded token payload. Presence of the map does not imply validity.
pub type ClaimSet = Map<String, Value>;

/// Why a token could not be turned into a `ClaimSet`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("algorithm rejected (only HS256 is accepted)")]
    AlgorithmRejected,
    #[error("token payload is not a JSON object")]
    InvalidPayload,
    #[error("token verification failed: {0}")]
    Other(String),
}

impl From<jsonwebtoken::errors::Error> for DecodeFailure {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) => Self::Malformed,
            ErrorKind::InvalidSignature => Self::SignatureMismatch,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::AlgorithmRejected
            }
            ErrorKind::Json(_) | ErrorKind::Utf8(_) => Self::InvalidPayload,
            _ => Self::Other(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &VerificationSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Signature + structure only. Time and issuer checks belong to the policy.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn decode(&self, token: &str) -> Result<ClaimSet, DecodeFailure> {
        match jsonwebtoken::decode::<ClaimSet>(token, &self.decoding_key, &self.validation) {
            Ok(data) => {
                debug!(claims = data.claims.len(), "token signature verified");
                Ok(data.claims)
            }
            Err(e) => {
                debug!(error = %e, "token signature verification failed");
                Err(DecodeFailure::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const SECRET: &str = "codec-test-secret";

    fn sign(claims: &Value, secret: &str, alg: Algorithm) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("sign token")
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&VerificationSecret::new(SECRET))
    }

    #[test]
    fn decodes_claims_without_interpreting_them() {
        // Long expired and issued by a stranger: the codec must not care.
        let claims = json!({"iss": "someone-else", "exp": 1, "nbf": 5, "custom": [1, 2]});
        let token = sign(&claims, SECRET, Algorithm::HS256);

        let decoded = codec().decode(&token).expect("decode");
        assert_eq!(Value::Object(decoded), claims);
    }

    #[test]
    fn decodes_payload_missing_every_registered_claim() {
        let token = sign(&json!({"hello": "world"}), SECRET, Algorithm::HS256);
        let decoded = codec().decode(&token).expect("decode");
        assert_eq!(decoded.get("hello"), Some(&json!("world")));
    }

    #[test]
    fn rejects_token_signed_with_another_key() {
        let token = sign(&json!({"sub": "abc"}), "another-secret", Algorithm::HS256);
        assert_eq!(codec().decode(&token), Err(DecodeFailure::SignatureMismatch));
    }

    #[test]
    fn rejects_other_hmac_algorithms() {
        let token = sign(&json!({"sub": "abc"}), SECRET, Algorithm::HS512);
        assert_eq!(codec().decode(&token), Err(DecodeFailure::AlgorithmRejected));
    }

    #[test]
    fn rejects_tampered_payload() {
        let token = sign(&json!({"sub": "abc"}), SECRET, Algorithm::HS256);
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin"}"#);
        parts[1] = &forged;

        assert_eq!(
            codec().decode(&parts.join(".")),
            Err(DecodeFailure::SignatureMismatch)
        );
    }

    #[test]
    fn rejects_unsigned_none_algorithm() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"abc"}"#);
        let token = format!("{header}.{payload}.");

        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        for garbage in ["", "not-a-token", "a.b", "a.b.c", "...."] {
            assert!(codec().decode(garbage).is_err(), "accepted {garbage:?}");
        }
    }

    #[test]
    fn rejects_non_object_payload() {
        let token = sign(&json!([1, 2, 3]), SECRET, Algorithm::HS256);
        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn debug_output_hides_key() {
        let printed = format!("{:?}", codec());
        assert!(!printed.contains(SECRET));
    }
}
