//! Main entry point for the conference backend.
//!
//! This file initializes the Axum web server, sets up database connections,
//! builds the guard collaborators once (token verifier, audit sink, auth rate
//! limiter) and registers all API routes and middleware.

mod api;
mod auth;
mod config;
mod content;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::audit::TracingAuditSink;
use crate::auth::middleware::{AuthState, rate_limit};
use crate::utils::jwt::JwtUtils;
use anyhow::Result;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    db.migrate().await?;

    let jwt_utils = Arc::new(JwtUtils::from_config(&config));
    let auth = AuthState::new(
        jwt_utils.clone(),
        Arc::new(TracingAuditSink),
        config.trust_forwarded_for,
    );
    // One limiter per process, shared by register and login
    let auth_rate_limit = rate_limit(
        config.auth_rate_limit_window(),
        config.auth_rate_limit_max_requests,
        config.trust_forwarded_for,
    );

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router(&auth, auth_rate_limit))
        .nest("/api", api::submission::routes::submission_router(&auth))
        .layer(Extension(jwt_utils))
        .layer(Extension(db.pool().clone()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting conference server on port {}", config.server_port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Conference Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to the conference API",
    ))
}
