use std::fmt;
use std::sync::Arc;

use super::codec::{ClaimSet, DecodeFailure, TokenCodec};
use super::observer::{AuthzObserver, TracingObserver};
use super::policy::{self, PolicyDescriptor, PolicyRejection};
use super::types::{
    AUTHORIZATION_HEADER, AuthorizationDecision, AuthorizedSubject, AuthorizerRequest,
};

/// Prefix tolerated in front of the token when a client sends the whole
/// header line as the header value (`Authorization: Authorization: <jwt>`).
const DOUBLED_HEADER_PREFIX: &str = "Authorization:";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationFailure {
    #[error("no token presented")]
    MissingToken,
    #[error(transparent)]
    Decode(#[from] DecodeFailure),
    #[error(transparent)]
    Policy(#[from] PolicyRejection),
}

/// Stateless request authorizer: token codec + claim policy.
///
/// Cheap to clone; every field is read-only after construction.
#[derive(Clone)]
pub struct Authorizer {
    codec: TokenCodec,
    policy: Arc<PolicyDescriptor>,
    observer: Arc<dyn AuthzObserver>,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("codec", &self.codec)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Authorizer {
    pub fn new(codec: TokenCodec, policy: PolicyDescriptor) -> Self {
        Self {
            codec,
            policy: Arc::new(policy),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn AuthzObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn policy(&self) -> &PolicyDescriptor {
        &self.policy
    }

    /// Gateway entry point. Never fails; every problem becomes a denial.
    pub fn authorize(&self, request: &AuthorizerRequest, now: i64) -> AuthorizationDecision {
        match self.evaluate(request.header(AUTHORIZATION_HEADER), now) {
            Ok(subject) => AuthorizationDecision::allow(subject),
            Err(_) => AuthorizationDecision::deny(),
        }
    }

    /// Same pipeline as `authorize`, keeping the failure class.
    pub fn evaluate(
        &self,
        header_value: Option<&str>,
        now: i64,
    ) -> Result<AuthorizedSubject, AuthorizationFailure> {
        let Some(token) = header_value.map(normalize_token) else {
            self.observer.token_missing();
            return Err(AuthorizationFailure::MissingToken);
        };

        let claims = self.codec.decode(token).inspect_err(|failure| {
            self.observer.decode_failed(failure);
        })?;
        self.observer.token_decoded();

        policy::check(&claims, now, &self.policy, self.observer.as_ref())?;

        let subject = subject_from(&claims)?;
        self.observer.authorized(&subject.sub, &subject.jti);
        Ok(subject)
    }
}

/// Strip a doubled `Authorization:` prefix plus following whitespace.
///
/// Only that exact literal triggers stripping; anything else is returned
/// untouched.
pub fn normalize_token(value: &str) -> &str {
    match value.strip_prefix(DOUBLED_HEADER_PREFIX) {
        Some(rest) => rest.trim_start(),
        None => value,
    }
}

// The policy has already checked both claims; this only moves them out.
fn subject_from(claims: &ClaimSet) -> Result<AuthorizedSubject, PolicyRejection> {
    let text = |name: &'static str| {
        claims
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or(PolicyRejection::InvalidClaimType(name))
    };

    Ok(AuthorizedSubject {
        sub: text("sub")?,
        jti: text("jti")?,
    })
}
