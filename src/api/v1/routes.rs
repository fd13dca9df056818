/*
 * Responsibility
 * - v1 URL layout
 * - /authorize is open (it IS the check); /echo-test sits behind the access middleware
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{authorize::authorize, echo::echo_test};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/echo-test", get(echo_test));
    let protected = middleware::auth::access::apply(protected, state);

    Router::new()
        .route("/authorize", post(authorize))
        .merge(protected)
}
