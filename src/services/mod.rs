/*
 * Responsibility
 * - Token validation core (codec / claim policy / authorizer)
 * - Token minting used by tooling and tests
 * - Clock
 */
pub mod auth;
pub mod clock;
