pub mod authorizer;
pub mod codec;
pub mod factory;
pub mod issuer;
pub mod observer;
pub mod policy;
pub mod secret;
pub mod types;

pub use authorizer::{AuthorizationFailure, Authorizer, normalize_token};
pub use codec::{ClaimSet, DecodeFailure, TokenCodec};
pub use factory::build_authorizer;
pub use issuer::{IssueError, IssuedClaims, IssuedToken, TokenIssuer};
pub use observer::{AuthzObserver, NoopObserver, TracingObserver};
pub use policy::{PolicyCheck, PolicyDescriptor, PolicyRejection};
pub use secret::VerificationSecret;
pub use types::{AuthorizationDecision, AuthorizedSubject, AuthorizerRequest, DecisionContext};
