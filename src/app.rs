/*
 * Responsibility
 * - Config -> tracing -> Authorizer -> Router
 * - Apply middleware (request id / limits / trace)
 * - axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_authorizer;
use crate::state::AppState;

fn init_tracing(debug: bool) {
    // RUST_LOG wins if set; otherwise DEBUG decides between info and debug.
    // Ex:
    // RUST_LOG=info,apigw_authorizer=debug cargo run
    let fallback = if debug {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash immediately. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    // Configuration problems are fatal: refuse to start.
    let config = Config::from_env()?;
    init_tracing(config.debug);
    init_panic_hook(!config.app_env.is_production());

    let authorizer = build_authorizer(&config);
    let policy = authorizer.policy();
    tracing::info!(
        issuer = %policy.expected_issuer(),
        required_claims = ?policy.required_claims(),
        min_sub_length = policy.min_sub_length(),
        min_jti_length = policy.min_jti_length(),
        "starting authorizer in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = AppState::new(authorizer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router, middleware::http::HttpLimits::default())
}
