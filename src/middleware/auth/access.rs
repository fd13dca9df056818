//! Access check for protected routes -> AuthCtx in request extensions.
//!
//! Runs the same authorizer as `POST /api/v1/authorize`, but enforces the
//! verdict itself: rejection is a bare 401, success hands `{sub, jti}` to
//! the handler through `AuthCtxExtractor`.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::clock;
use crate::state::AppState;

/// Put the access check in front of every route of `router`.
///
/// ```ignore
/// let protected = Router::new().route("/echo-test", get(echo_test));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Non-UTF8 header values count as "no token".
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let subject = match state.authorizer.evaluate(header_value, clock::unix_now()) {
        Ok(subject) => subject,
        Err(err) => {
            tracing::warn!(error = %err, "request rejected by authorizer");
            return Err(AppError::Unauthorized);
        }
    };

    req.extensions_mut().insert(AuthCtx::from(subject));

    Ok(next.run(req).await)
}
