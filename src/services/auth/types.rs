use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Inbound event handed over by the front door.
///
/// Only `headers` is read. It is kept as a raw JSON value so that odd
/// shapes (non-object headers, non-string values) still deserialize and end
/// up as "no token" instead of an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizerRequest {
    #[serde(default)]
    pub headers: Option<Value>,
}

impl AuthorizerRequest {
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = headers
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self {
            headers: Some(Value::Object(map)),
        }
    }

    /// String value of a header.
    ///
    /// Exact key match first, then ASCII case-insensitive. Non-string values
    /// are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?.as_object()?;
        let value = match headers.get(name) {
            Some(v) => v,
            None => {
                headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))?
                    .1
            }
        };
        value.as_str()
    }
}

/// Downstream context attached to an authorized request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub sub: Option<String>,
    pub jti: Option<String>,
}

/// The only externally observable result of the authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDecision {
    pub is_authorized: bool,
    pub context: DecisionContext,
}

impl AuthorizationDecision {
    pub fn allow(subject: AuthorizedSubject) -> Self {
        Self {
            is_authorized: true,
            context: DecisionContext {
                sub: Some(subject.sub),
                jti: Some(subject.jti),
            },
        }
    }

    pub fn deny() -> Self {
        Self::default()
    }
}

/// Identity extracted from a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedSubject {
    pub sub: String,
    pub jti: String,
}
