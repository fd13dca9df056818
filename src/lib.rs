//! Bearer-token authorizer for an API gateway front door.
//!
//! The decision core lives in [`services::auth`]: an HS256 codec, an ordered
//! claim policy and the request authorizer composing them. The remaining
//! modules host that core behind an axum service.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
