//! Claim policy: decides whether an already-verified claim set is acceptable.
//!
//! Checks run in a fixed order and stop at the first failure:
//! required claims -> iss -> exp -> nbf -> sub length -> jti length.
//!
//! Time window is `nbf < now < exp`. Note the asymmetry: a token is expired
//! AT `exp`, and is also not yet valid AT `nbf`.

use std::fmt;

use serde_json::Value;

use super::codec::ClaimSet;
use super::observer::{AuthzObserver, TracingObserver};

pub const DEFAULT_MIN_CLAIM_LENGTH: usize = 3;

pub const REQUIRED_CLAIMS: [&str; 6] = ["iss", "sub", "exp", "nbf", "iat", "jti"];

/// Immutable claim policy, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDescriptor {
    expected_issuer: String,
    required_claims: Vec<String>,
    min_sub_length: usize,
    min_jti_length: usize,
}

impl PolicyDescriptor {
    /// Policy requiring the standard claim set with minimum lengths of 3.
    pub fn new(expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            required_claims: REQUIRED_CLAIMS.iter().map(|c| c.to_string()).collect(),
            min_sub_length: DEFAULT_MIN_CLAIM_LENGTH,
            min_jti_length: DEFAULT_MIN_CLAIM_LENGTH,
        }
    }

    pub fn with_required_claims<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_claims.clear();
        for claim in claims {
            let claim = claim.into();
            if !self.required_claims.contains(&claim) {
                self.required_claims.push(claim);
            }
        }
        self
    }

    pub fn with_min_sub_length(mut self, len: usize) -> Self {
        self.min_sub_length = len;
        self
    }

    pub fn with_min_jti_length(mut self, len: usize) -> Self {
        self.min_jti_length = len;
        self
    }

    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    pub fn required_claims(&self) -> &[String] {
        &self.required_claims
    }

    pub fn min_sub_length(&self) -> usize {
        self.min_sub_length
    }

    pub fn min_jti_length(&self) -> usize {
        self.min_jti_length
    }
}

/// Individual steps of the policy, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCheck {
    RequiredClaims,
    Issuer,
    Expiry,
    NotBefore,
    SubjectLength,
    TokenIdLength,
}

impl fmt::Display for PolicyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RequiredClaims => "required_claims",
            Self::Issuer => "iss",
            Self::Expiry => "exp",
            Self::NotBefore => "nbf",
            Self::SubjectLength => "sub",
            Self::TokenIdLength => "jti",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyRejection {
    #[error("required claim '{0}' not found")]
    MissingClaim(String),
    #[error("claim '{0}' has an unexpected type")]
    InvalidClaimType(&'static str),
    #[error("iss mismatch")]
    IssuerMismatch,
    #[error("expired (exp={exp}, now={now})")]
    Expired { exp: i64, now: i64 },
    #[error("not yet valid (nbf={nbf}, now={now})")]
    NotYetValid { nbf: i64, now: i64 },
    #[error("sub shorter than {min} characters")]
    SubjectTooShort { min: usize },
    #[error("jti shorter than {min} characters")]
    TokenIdTooShort { min: usize },
}

/// Accept/reject verdict, logging through `tracing`.
pub fn validate(claims: &ClaimSet, now: i64, policy: &PolicyDescriptor) -> bool {
    check(claims, now, policy, &TracingObserver).is_ok()
}

/// Run every check in order, reporting each outcome to `observer`.
pub fn check(
    claims: &ClaimSet,
    now: i64,
    policy: &PolicyDescriptor,
    observer: &dyn AuthzObserver,
) -> Result<(), PolicyRejection> {
    step(observer, PolicyCheck::RequiredClaims, || {
        match policy
            .required_claims()
            .iter()
            .find(|name| !claims.contains_key(name.as_str()))
        {
            Some(missing) => Err(PolicyRejection::MissingClaim(missing.clone())),
            None => Ok(()),
        }
    })?;

    step(observer, PolicyCheck::Issuer, || match claims.get("iss") {
        None => Err(PolicyRejection::MissingClaim("iss".to_string())),
        Some(Value::String(iss)) if iss == policy.expected_issuer() => Ok(()),
        Some(_) => Err(PolicyRejection::IssuerMismatch),
    })?;

    step(observer, PolicyCheck::Expiry, || {
        let exp = integer_claim(claims, "exp")?;
        if now >= exp {
            return Err(PolicyRejection::Expired { exp, now });
        }
        Ok(())
    })?;

    step(observer, PolicyCheck::NotBefore, || {
        let nbf = integer_claim(claims, "nbf")?;
        if nbf >= now {
            return Err(PolicyRejection::NotYetValid { nbf, now });
        }
        Ok(())
    })?;

    step(observer, PolicyCheck::SubjectLength, || {
        let min = policy.min_sub_length();
        match string_claim(claims, "sub")? {
            sub if sub.chars().count() < min => Err(PolicyRejection::SubjectTooShort { min }),
            _ => Ok(()),
        }
    })?;

    step(observer, PolicyCheck::TokenIdLength, || {
        let min = policy.min_jti_length();
        match string_claim(claims, "jti")? {
            jti if jti.chars().count() < min => Err(PolicyRejection::TokenIdTooShort { min }),
            _ => Ok(()),
        }
    })?;

    Ok(())
}

fn step(
    observer: &dyn AuthzObserver,
    check: PolicyCheck,
    run: impl FnOnce() -> Result<(), PolicyRejection>,
) -> Result<(), PolicyRejection> {
    match run() {
        Ok(()) => {
            observer.check_passed(check);
            Ok(())
        }
        Err(rejection) => {
            observer.check_failed(check, &rejection);
            Err(rejection)
        }
    }
}

/// Integer view of a timestamp claim.
///
/// Floats are truncated toward zero and decimal strings are parsed, so
/// `1700000000.9` and `"1700000000"` both read as `1700000000`.
fn integer_claim(claims: &ClaimSet, name: &'static str) -> Result<i64, PolicyRejection> {
    let value = claims
        .get(name)
        .ok_or_else(|| PolicyRejection::MissingClaim(name.to_string()))?;

    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or(PolicyRejection::InvalidClaimType(name))
}

fn string_claim<'a>(claims: &'a ClaimSet, name: &'static str) -> Result<&'a str, PolicyRejection> {
    match claims.get(name) {
        None => Err(PolicyRejection::MissingClaim(name.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(PolicyRejection::InvalidClaimType(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::observer::NoopObserver;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn policy() -> PolicyDescriptor {
        PolicyDescriptor::new("test-issuer")
    }

    fn claims(value: Value) -> ClaimSet {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn valid_claims() -> ClaimSet {
        claims(json!({
            "iss": "test-issuer",
            "sub": "3f94876234f876hb8",
            "exp": NOW + 60,
            "nbf": NOW - 1,
            "iat": NOW - 1,
            "jti": "2c1b2d6e-5f5a-4f0e-9d2b-0a4b4f1c9e11",
        }))
    }

    fn run(claims: &ClaimSet, now: i64) -> Result<(), PolicyRejection> {
        check(claims, now, &policy(), &NoopObserver)
    }

    #[test]
    fn accepts_valid_claims() {
        assert_eq!(run(&valid_claims(), NOW), Ok(()));
        assert!(validate(&valid_claims(), NOW, &policy()));
    }

    #[test]
    fn rejects_when_any_required_claim_is_missing() {
        for name in REQUIRED_CLAIMS {
            let mut c = valid_claims();
            c.remove(name);
            assert_eq!(
                run(&c, NOW),
                Err(PolicyRejection::MissingClaim(name.to_string())),
                "missing {name}"
            );
        }
    }

    #[test]
    fn null_valued_claim_counts_as_present_but_fails_later() {
        let mut c = valid_claims();
        c.insert("iat".into(), Value::Null);
        // iat is only checked for presence
        assert_eq!(run(&c, NOW), Ok(()));

        c.insert("sub".into(), Value::Null);
        assert_eq!(run(&c, NOW), Err(PolicyRejection::InvalidClaimType("sub")));
    }

    #[test]
    fn issuer_must_match_exactly() {
        for iss in ["Test-issuer", "test-issue", "test-issuerx", " test-issuer", ""] {
            let mut c = valid_claims();
            c.insert("iss".into(), json!(iss));
            assert_eq!(run(&c, NOW), Err(PolicyRejection::IssuerMismatch), "{iss:?}");
        }

        let mut c = valid_claims();
        c.insert("iss".into(), json!(42));
        assert_eq!(run(&c, NOW), Err(PolicyRejection::IssuerMismatch));
    }

    #[test]
    fn expiry_is_exclusive() {
        let mut c = valid_claims();
        c.insert("exp".into(), json!(NOW + 1));
        assert_eq!(run(&c, NOW), Ok(()));

        c.insert("exp".into(), json!(NOW));
        assert_eq!(
            run(&c, NOW),
            Err(PolicyRejection::Expired { exp: NOW, now: NOW })
        );

        c.insert("exp".into(), json!(NOW - 1));
        assert!(matches!(run(&c, NOW), Err(PolicyRejection::Expired { .. })));
    }

    #[test]
    fn not_before_rejects_at_the_boundary() {
        let mut c = valid_claims();
        c.insert("nbf".into(), json!(NOW));
        assert_eq!(
            run(&c, NOW),
            Err(PolicyRejection::NotYetValid { nbf: NOW, now: NOW })
        );

        c.insert("nbf".into(), json!(NOW + 10));
        assert!(matches!(run(&c, NOW), Err(PolicyRejection::NotYetValid { .. })));
    }

    #[test]
    fn window_is_open_on_both_ends() {
        let nbf = NOW;
        let exp = NOW + 5;
        let mut c = valid_claims();
        c.insert("nbf".into(), json!(nbf));
        c.insert("exp".into(), json!(exp));

        assert!(run(&c, nbf).is_err());
        for now in (nbf + 1)..exp {
            assert_eq!(run(&c, now), Ok(()), "now={now}");
        }
        assert!(run(&c, exp).is_err());
        assert!(run(&c, exp + 100).is_err());
    }

    #[test]
    fn timestamps_accept_floats_and_numeric_strings() {
        let mut c = valid_claims();
        c.insert("exp".into(), json!((NOW + 60) as f64 + 0.75));
        c.insert("nbf".into(), json!((NOW - 1).to_string()));
        assert_eq!(run(&c, NOW), Ok(()));

        c.insert("exp".into(), json!("soon"));
        assert_eq!(run(&c, NOW), Err(PolicyRejection::InvalidClaimType("exp")));

        let mut c = valid_claims();
        c.insert("nbf".into(), json!({"at": NOW}));
        assert_eq!(run(&c, NOW), Err(PolicyRejection::InvalidClaimType("nbf")));
    }

    #[test]
    fn sub_and_jti_length_boundary_is_three() {
        let mut c = valid_claims();
        c.insert("sub".into(), json!("abc"));
        c.insert("jti".into(), json!("xyz"));
        assert_eq!(run(&c, NOW), Ok(()));

        c.insert("sub".into(), json!("ab"));
        assert_eq!(
            run(&c, NOW),
            Err(PolicyRejection::SubjectTooShort { min: 3 })
        );

        c.insert("sub".into(), json!("abc"));
        c.insert("jti".into(), json!("xy"));
        assert_eq!(
            run(&c, NOW),
            Err(PolicyRejection::TokenIdTooShort { min: 3 })
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut c = valid_claims();
        // two characters, six bytes
        c.insert("sub".into(), json!("日本"));
        assert_eq!(
            run(&c, NOW),
            Err(PolicyRejection::SubjectTooShort { min: 3 })
        );
    }

    #[test]
    fn minimum_lengths_are_configurable() {
        let strict = policy().with_min_sub_length(10).with_min_jti_length(0);
        let mut c = valid_claims();
        c.insert("sub".into(), json!("short"));
        c.insert("jti".into(), json!(""));
        assert_eq!(
            check(&c, NOW, &strict, &NoopObserver),
            Err(PolicyRejection::SubjectTooShort { min: 10 })
        );

        c.insert("sub".into(), json!("long-enough-subject"));
        assert_eq!(check(&c, NOW, &strict, &NoopObserver), Ok(()));
    }

    #[test]
    fn required_claim_set_is_configurable() {
        let relaxed = policy().with_required_claims(["iss", "sub", "exp", "nbf", "jti", "jti"]);
        assert_eq!(relaxed.required_claims().len(), 5);

        let mut c = valid_claims();
        c.remove("iat");
        assert_eq!(check(&c, NOW, &relaxed, &NoopObserver), Ok(()));
        assert!(run(&c, NOW).is_err());
    }

    #[test]
    fn first_failing_check_wins() {
        // Wrong issuer AND expired AND short sub: issuer is reported.
        let mut c = valid_claims();
        c.insert("iss".into(), json!("other"));
        c.insert("exp".into(), json!(0));
        c.insert("sub".into(), json!("x"));
        assert_eq!(run(&c, NOW), Err(PolicyRejection::IssuerMismatch));
    }
}
