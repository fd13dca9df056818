/*
 * Responsibility
 * - The "authorized context" type handlers see
 * - Filled by the access middleware, mirrors the gateway decision context
 */
use crate::services::auth::AuthorizedSubject;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub sub: String,
    pub jti: String,
}

impl From<AuthorizedSubject> for AuthCtx {
    fn from(subject: AuthorizedSubject) -> Self {
        Self {
            sub: subject.sub,
            jti: subject.jti,
        }
    }
}
