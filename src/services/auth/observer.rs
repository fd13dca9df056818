use tracing::{debug, info, warn};

use super::codec::DecodeFailure;
use super::policy::{PolicyCheck, PolicyRejection};

/// Diagnostic sink for authorization decisions.
///
/// Observers only watch. Nothing they do can change a verdict.
pub trait AuthzObserver: Send + Sync {
    fn token_missing(&self) {}
    fn token_decoded(&self) {}
    fn decode_failed(&self, _failure: &DecodeFailure) {}
    fn check_passed(&self, _check: PolicyCheck) {}
    fn check_failed(&self, _check: PolicyCheck, _rejection: &PolicyRejection) {}
    fn authorized(&self, _sub: &str, _jti: &str) {}
}

/// Default observer: one `tracing` event per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AuthzObserver for TracingObserver {
    fn token_missing(&self) {
        info!("no authorization header present");
    }

    fn token_decoded(&self) {
        debug!("token decoded");
    }

    fn decode_failed(&self, failure: &DecodeFailure) {
        warn!(reason = %failure, "token decode failed");
    }

    fn check_passed(&self, check: PolicyCheck) {
        debug!(%check, "claim check passed");
    }

    fn check_failed(&self, check: PolicyCheck, rejection: &PolicyRejection) {
        warn!(%check, reason = %rejection, "claim check failed");
    }

    fn authorized(&self, sub: &str, jti: &str) {
        info!(sub, jti, "request authorized");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AuthzObserver for NoopObserver {}
