/*!
 * Authorized request context extractor
 *
 * Responsibility:
 * - hand the context set by the access middleware (AuthCtx) to handlers
 * - axum glue lives in core, the type lives in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
