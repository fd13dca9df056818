/*
 * Responsibility
 * - middleware public interface
 * - auth::access (token check on protected routes), http (cross-cutting layers)
 */
pub mod auth;
pub mod http;
