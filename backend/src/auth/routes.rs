//! Defines the HTTP routes specifically for authentication.
//!
//! Registration and login share one rate limiter; `/me` requires a valid
//! token. These are designed to be nested into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::{AuthState, RateLimitGuard, authenticate, enforce_rate_limit};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router(auth: &AuthState, rate_limit: RateLimitGuard) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(from_fn_with_state(rate_limit, enforce_rate_limit))
        .route(
            "/me",
            get(me).layer(from_fn_with_state(auth.clone(), authenticate)),
        )
}
