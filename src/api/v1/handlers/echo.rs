/*
 * Responsibility
 * - GET /echo-test: sample protected route, echoes the authorized context
 */
use axum::Json;

use crate::api::v1::dto::echo::EchoResponse;
use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn echo_test(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<EchoResponse> {
    Json(EchoResponse {
        message: "ok",
        sub: ctx.sub,
        jti: ctx.jti,
    })
}
