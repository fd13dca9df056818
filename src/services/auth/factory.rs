/// Factory: build `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{Authorizer, TokenCodec};

pub fn build_authorizer(config: &Config) -> Arc<Authorizer> {
    let codec = TokenCodec::new(&config.verification_secret);
    Arc::new(Authorizer::new(codec, config.policy()))
}
