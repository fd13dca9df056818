use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub message: &'static str,
    pub sub: String,
    pub jti: String,
}
