/*
 * Responsibility
 * - POST /authorize: gateway authorizer endpoint
 * - Always 200 + decision JSON; the front door enforces the verdict
 */
use axum::{Json, body::Bytes, extract::State};

use crate::services::auth::{AuthorizationDecision, AuthorizerRequest};
use crate::services::clock;
use crate::state::AppState;

pub async fn authorize(State(state): State<AppState>, body: Bytes) -> Json<AuthorizationDecision> {
    // Parsed by hand instead of `Json<_>` so a broken body still gets a decision.
    let request = serde_json::from_slice::<AuthorizerRequest>(&body).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "unparseable authorizer event, treating as no token");
        AuthorizerRequest::default()
    });

    Json(state.authorizer.authorize(&request, clock::unix_now()))
}
