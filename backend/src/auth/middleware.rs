//! Middleware for protecting authenticated routes and handling authorization.
//!
//! Each guard is an axum `from_fn_with_state` middleware. A guard either
//! calls `next` or writes the denial envelope itself, so a denial always
//! short-circuits the rest of the chain. Guards run in the order they are
//! layered on a route (the outermost layer first):
//!
//! ```text
//! authenticate -> require_role / require_participant_type / require_ownership_or_admin -> handler
//! ```

use crate::auth::audit::{AuditSink, SecurityViolation};
use crate::auth::models::{AccessPolicy, AuthenticatedIdentity, ParticipantType, UserRole};
use crate::auth::rate_limit::{InMemoryRateLimiter, RateLimitDecision, RateLimiter};
use crate::errors::{AuthError, TokenError};
use crate::utils::jwt::{TokenVerifier, extract_bearer_token};
use crate::utils::request_meta::{RequestMeta, client_ip};
use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{HeaderValue, header::AUTHORIZATION, header::RETRY_AFTER, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collaborators shared by every guard.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub audit: Arc<dyn AuditSink>,
    pub trust_forwarded_for: bool,
}

impl AuthState {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        audit: Arc<dyn AuditSink>,
        trust_forwarded_for: bool,
    ) -> Self {
        Self {
            verifier,
            audit,
            trust_forwarded_for,
        }
    }

    fn report(&self, request: &Request, reason: &str, extra: Value) {
        let meta = RequestMeta::from_request(request, self.trust_forwarded_for);
        let mut context = json!({
            "url": meta.url,
            "method": meta.method,
        });
        if let (Some(context), Value::Object(extra)) = (context.as_object_mut(), extra) {
            context.extend(extra);
        }

        self.audit.log_security_violation(&SecurityViolation {
            reason: reason.to_string(),
            client_ip: meta.client_ip,
            context,
            user_agent: meta.user_agent,
            request_id: meta.request_id,
        });
    }
}

fn verify_bearer(state: &AuthState, request: &Request) -> Result<AuthenticatedIdentity, TokenError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    match extract_bearer_token(header) {
        Some(token) => state.verifier.verify(token),
        None => Err(TokenError::Missing),
    }
}

/// Requires a valid bearer token and attaches the decoded identity.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match verify_bearer(&state, &request) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(TokenError::Missing) => {
            state.report(&request, "Missing access token", json!({}));
            AuthError::unauthorized("Access token is required").into_response()
        }
        Err(TokenError::Invalid(error)) => {
            tracing::debug!("Rejected bearer token: {}", error);
            state.report(&request, "Invalid access token", json!({ "error": error }));
            AuthError::InvalidToken.into_response()
        }
    }
}

/// Attaches an identity when a valid bearer token is present; never denies
/// and never audits.
pub async fn optional_authenticate(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(identity) = verify_bearer(&state, &request) {
        request.extensions_mut().insert(identity);
    }
    next.run(request).await
}

/// Role check configured with a fixed set of allowed roles.
#[derive(Clone)]
pub struct RoleGuard {
    state: AuthState,
    allowed: &'static [UserRole],
}

/// Builds a role guard for `allowed`, used with [`require_role`].
pub fn authorize(state: &AuthState, allowed: &'static [UserRole]) -> RoleGuard {
    RoleGuard {
        state: state.clone(),
        allowed,
    }
}

/// Builds a role guard for one of the named access policies.
pub fn authorize_policy(state: &AuthState, policy: AccessPolicy) -> RoleGuard {
    authorize(state, policy.allowed_roles())
}

fn join_names<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn require_role(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<AuthenticatedIdentity>().cloned() else {
        guard
            .state
            .report(&request, "Authorization without authentication", json!({}));
        return AuthError::unauthorized("Authentication required").into_response();
    };

    if guard.allowed.contains(&identity.role) {
        return next.run(request).await;
    }

    let required = join_names(guard.allowed);
    guard.state.report(
        &request,
        "Insufficient role",
        json!({
            "userRole": identity.role,
            "requiredRoles": guard.allowed,
            "userId": identity.user_id,
            "userEmail": identity.email,
        }),
    );
    AuthError::forbidden(format!("Access denied. Required roles: {}", required)).into_response()
}

/// Participant-type check configured with a fixed set of allowed types.
#[derive(Clone)]
pub struct ParticipantTypeGuard {
    state: AuthState,
    allowed: &'static [ParticipantType],
}

pub fn authorize_participant_type(
    state: &AuthState,
    allowed: &'static [ParticipantType],
) -> ParticipantTypeGuard {
    ParticipantTypeGuard {
        state: state.clone(),
        allowed,
    }
}

pub async fn require_participant_type(
    State(guard): State<ParticipantTypeGuard>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<AuthenticatedIdentity>().cloned() else {
        guard
            .state
            .report(&request, "Authorization without authentication", json!({}));
        return AuthError::unauthorized("Authentication required").into_response();
    };

    if guard.allowed.contains(&identity.participant_type) {
        return next.run(request).await;
    }

    let required = join_names(guard.allowed);
    guard.state.report(
        &request,
        "Insufficient participant type",
        json!({
            "userParticipantType": identity.participant_type,
            "requiredParticipantTypes": guard.allowed,
            "userId": identity.user_id,
            "userEmail": identity.email,
        }),
    );
    AuthError::forbidden(format!(
        "Access denied. Required participant types: {}",
        required
    ))
    .into_response()
}

/// Owner-or-elevated check on the route parameter `param`.
#[derive(Clone)]
pub struct OwnershipGuard {
    state: AuthState,
    param: &'static str,
}

pub fn require_ownership(state: &AuthState, param: &'static str) -> OwnershipGuard {
    OwnershipGuard {
        state: state.clone(),
        param,
    }
}

/// Lets admins and organizers through; everyone else only when their user
/// ID equals the route parameter the guard was configured with.
pub async fn require_ownership_or_admin(
    State(guard): State<OwnershipGuard>,
    request: Request,
    next: Next,
) -> Response {
    let Some(identity) = request.extensions().get::<AuthenticatedIdentity>().cloned() else {
        guard
            .state
            .report(&request, "Authorization without authentication", json!({}));
        return AuthError::unauthorized("Authentication required").into_response();
    };

    if identity.role.is_elevated() {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let params = route_params(&mut parts).await;
    let request = Request::from_parts(parts, body);

    let resource_owner = params.get(guard.param);
    if resource_owner.is_some_and(|owner| *owner == identity.user_id) {
        return next.run(request).await;
    }

    guard.state.report(
        &request,
        "Access to another user's resource",
        json!({
            "param": guard.param,
            "resourceOwner": resource_owner,
            "userId": identity.user_id,
            "userEmail": identity.email,
        }),
    );
    AuthError::forbidden("You can only access your own resources.").into_response()
}

async fn route_params(parts: &mut Parts) -> HashMap<String, String> {
    Path::<HashMap<String, String>>::from_request_parts(parts, &())
        .await
        .map(|Path(params)| params)
        .unwrap_or_default()
}

/// Per-client request ceiling backed by an injected [`RateLimiter`].
#[derive(Clone)]
pub struct RateLimitGuard {
    limiter: Arc<dyn RateLimiter>,
    trust_forwarded_for: bool,
}

impl RateLimitGuard {
    pub fn new(limiter: Arc<dyn RateLimiter>, trust_forwarded_for: bool) -> Self {
        Self {
            limiter,
            trust_forwarded_for,
        }
    }

    #[cfg(test)]
    pub fn limiter(&self) -> &Arc<dyn RateLimiter> {
        &self.limiter
    }
}

/// Builds a rate limit guard with its own in-memory buckets.
pub fn rate_limit(window: Duration, max_requests: u32, trust_forwarded_for: bool) -> RateLimitGuard {
    RateLimitGuard::new(
        Arc::new(InMemoryRateLimiter::new(window, max_requests)),
        trust_forwarded_for,
    )
}

pub async fn enforce_rate_limit(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, guard.trust_forwarded_for);

    match guard.limiter.check(&ip, Instant::now()) {
        RateLimitDecision::Allowed { remaining } => {
            tracing::trace!(client_ip = %ip, remaining, "Rate limit check passed");
            next.run(request).await
        }
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!(client_ip = %ip, uri = %request.uri(), "Rate limit exceeded");
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            let mut response = AuthError::TooManyRequests.into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
            response
        }
    }
}

/// Identity attached by `authenticate`; rejects with 401 when absent.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub AuthenticatedIdentity);

impl<S: Send + Sync> FromRequestParts<S> for CurrentIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))
    }
}

/// Identity attached by `optional_authenticate`, if any.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<AuthenticatedIdentity>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(
            parts.extensions.get::<AuthenticatedIdentity>().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::SUBMITTING_PARTICIPANT_TYPES;
    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::ConnectInfo,
        http::StatusCode,
        middleware::from_fn_with_state,
        routing::get,
    };
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct StaticVerifier;

    impl TokenVerifier for StaticVerifier {
        fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenError> {
            let (user_id, role, participant_type) = match token {
                "participant-token" => ("U1", UserRole::Participant, ParticipantType::Attendee),
                "presenter-token" => ("U1", UserRole::Presenter, ParticipantType::Presenter),
                "organizer-token" => ("U9", UserRole::Organizer, ParticipantType::Organizer),
                "admin-token" => ("U0", UserRole::Admin, ParticipantType::Guest),
                _ => return Err(TokenError::Invalid("InvalidSignature".to_string())),
            };
            Ok(AuthenticatedIdentity {
                user_id: user_id.to_string(),
                email: format!("{}@example.org", user_id.to_lowercase()),
                role,
                participant_type,
            })
        }
    }

    #[derive(Default)]
    struct RecordingAuditSink {
        events: Mutex<Vec<SecurityViolation>>,
    }

    impl RecordingAuditSink {
        fn events(&self) -> Vec<SecurityViolation> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AuditSink for RecordingAuditSink {
        fn log_security_violation(&self, violation: &SecurityViolation) {
            self.events.lock().unwrap().push(violation.clone());
        }
    }

    fn auth_state() -> (AuthState, Arc<RecordingAuditSink>) {
        let audit = Arc::new(RecordingAuditSink::default());
        let state = AuthState::new(Arc::new(StaticVerifier), audit.clone(), false);
        (state, audit)
    }

    async fn whoami(MaybeIdentity(identity): MaybeIdentity) -> String {
        identity
            .map(|identity| identity.user_id)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = axum::http::Request::builder()
            .uri(uri)
            .header("user-agent", "test-agent")
            .header("x-request-id", "req-1");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn envelope(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn authenticated_router(state: &AuthState) -> Router {
        Router::new().route(
            "/me",
            get(whoami).layer(from_fn_with_state(state.clone(), authenticate)),
        )
    }

    fn role_router(state: &AuthState, policy: AccessPolicy) -> Router {
        Router::new().route(
            "/admin",
            get(whoami)
                .layer(from_fn_with_state(
                    authorize_policy(state, policy),
                    require_role,
                ))
                .layer(from_fn_with_state(state.clone(), authenticate)),
        )
    }

    fn ownership_router(state: &AuthState, path: &str, param: &'static str) -> Router {
        Router::new().route(
            path,
            get(whoami)
                .layer(from_fn_with_state(
                    require_ownership(state, param),
                    require_ownership_or_admin,
                ))
                .layer(from_fn_with_state(state.clone(), authenticate)),
        )
    }

    fn request_from(ip: &str) -> Request<Body> {
        let mut request = request("/login", None);
        let addr: SocketAddr = format!("{}:40000", ip).parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    fn rate_limited_router(guard: RateLimitGuard) -> Router {
        Router::new().route(
            "/login",
            get(whoami).layer(from_fn_with_state(guard, enforce_rate_limit)),
        )
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let (state, audit) = auth_state();
        let router = authenticated_router(&state);

        let (status, body) = send(&router, request("/me", Some("participant-token"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "U1");
        assert!(audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized_and_audited() {
        let (state, audit) = auth_state();
        let router = authenticated_router(&state);

        let (status, body) = send(&router, request("/me", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json = envelope(&body);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
        assert_eq!(json["error"]["message"], "Access token is required");
        assert!(json["timestamp"].is_string());

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_agent, "test-agent");
        assert_eq!(events[0].request_id, "req-1");
        assert_eq!(events[0].context["url"], "/me");
        assert_eq!(events[0].context["method"], "GET");
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_counts_as_missing() {
        let (state, _audit) = auth_state();
        let router = authenticated_router(&state);
        let request = axum::http::Request::builder()
            .uri("/me")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&router, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(envelope(&body)["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected_with_reason() {
        let (state, audit) = auth_state();
        let router = authenticated_router(&state);

        let (status, body) = send(&router, request("/me", Some("forged"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json = envelope(&body);
        assert_eq!(json["error"]["code"], "INVALID_TOKEN");
        assert_eq!(json["error"]["message"], "Invalid or expired token");

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].context["error"], "InvalidSignature");
    }

    #[tokio::test]
    async fn test_role_mismatch_is_forbidden() {
        let (state, audit) = auth_state();
        let router = role_router(&state, AccessPolicy::OrganizerOrAdmin);

        let (status, body) = send(&router, request("/admin", Some("participant-token"))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let json = envelope(&body);
        assert_eq!(json["error"]["code"], "FORBIDDEN");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("organizer"));
        assert!(message.contains("admin"));

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].context["userRole"], "participant");
        assert_eq!(events[0].context["requiredRoles"], json!(["organizer", "admin"]));
        assert_eq!(events[0].context["userId"], "U1");
        assert_eq!(events[0].context["userEmail"], "u1@example.org");
    }

    #[tokio::test]
    async fn test_role_match_proceeds() {
        let (state, audit) = auth_state();
        let router = role_router(&state, AccessPolicy::OrganizerOrAdmin);

        let (status, body) = send(&router, request("/admin", Some("organizer-token"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "U9");
        assert!(audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_policies_do_not_inherit() {
        let (state, _audit) = auth_state();
        let router = role_router(&state, AccessPolicy::AdminOnly);

        let (status, _) = send(&router, request("/admin", Some("organizer-token"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&router, request("/admin", Some("admin-token"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_guard_without_identity_is_unauthorized() {
        let (state, _audit) = auth_state();
        let router = Router::new().route(
            "/admin",
            get(whoami).layer(from_fn_with_state(
                authorize_policy(&state, AccessPolicy::AdminOnly),
                require_role,
            )),
        );

        let (status, body) = send(&router, request("/admin", Some("admin-token"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(envelope(&body)["error"]["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_participant_type_guard() {
        let (state, audit) = auth_state();
        let router = Router::new().route(
            "/submit",
            get(whoami)
                .layer(from_fn_with_state(
                    authorize_participant_type(&state, SUBMITTING_PARTICIPANT_TYPES),
                    require_participant_type,
                ))
                .layer(from_fn_with_state(state.clone(), authenticate)),
        );

        let (status, _) = send(&router, request("/submit", Some("presenter-token"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, request("/submit", Some("participant-token"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let message = envelope(&body)["error"]["message"].as_str().unwrap().to_string();
        assert!(message.contains("presenter"));
        assert!(message.contains("keynote_speaker"));

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].context["userParticipantType"], "attendee");
    }

    #[tokio::test]
    async fn test_owner_can_access_own_resource() {
        let (state, _audit) = auth_state();
        let router = ownership_router(&state, "/users/{userId}/submissions", "userId");

        let (status, body) =
            send(&router, request("/users/U1/submissions", Some("participant-token"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "U1");
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (state, audit) = auth_state();
        let router = ownership_router(&state, "/users/{userId}/submissions", "userId");

        let (status, body) =
            send(&router, request("/users/U2/submissions", Some("participant-token"))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            envelope(&body)["error"]["message"],
            "You can only access your own resources."
        );
        assert_eq!(audit.events().len(), 1);
    }

    #[tokio::test]
    async fn test_elevated_roles_bypass_ownership() {
        let (state, _audit) = auth_state();
        let router = ownership_router(&state, "/users/{userId}/submissions", "userId");

        for token in ["organizer-token", "admin-token"] {
            let (status, _) = send(&router, request("/users/U2/submissions", Some(token))).await;
            assert_eq!(status, StatusCode::OK, "{} should bypass ownership", token);
        }
    }

    #[tokio::test]
    async fn test_ownership_param_name_is_configurable() {
        let (state, _audit) = auth_state();
        let router = ownership_router(&state, "/authors/{authorId}", "authorId");

        let (status, _) = send(&router, request("/authors/U1", Some("participant-token"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, request("/authors/U3", Some("participant-token"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_ownership_with_missing_param_is_forbidden() {
        let (state, _audit) = auth_state();
        let router = ownership_router(&state, "/users/{id}", "userId");

        let (status, _) = send(&router, request("/users/U1", Some("participant-token"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_optional_authentication_never_blocks() {
        let (state, audit) = auth_state();
        let router = Router::new().route(
            "/public",
            get(whoami).layer(from_fn_with_state(state.clone(), optional_authenticate)),
        );

        let (status, body) = send(&router, request("/public", None)).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));

        let (status, body) = send(&router, request("/public", Some("forged"))).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "anonymous"));

        let (status, body) = send(&router, request("/public", Some("presenter-token"))).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "U1"));

        assert!(audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_after_max_requests() {
        let router = rate_limited_router(rate_limit(Duration::from_secs(60), 3, false));

        for _ in 0..3 {
            let (status, _) = send(&router, request_from("192.0.2.1")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let response = router.clone().oneshot(request_from("192.0.2.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(RETRY_AFTER));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "TOO_MANY_REQUESTS");
        assert_eq!(
            json["error"]["message"],
            "Too many authentication attempts. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_rate_limit_window_resets() {
        let router = rate_limited_router(rate_limit(Duration::from_millis(100), 3, false));

        for _ in 0..3 {
            let (status, _) = send(&router, request_from("192.0.2.2")).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, _) = send(&router, request_from("192.0.2.2")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        tokio::time::sleep(Duration::from_millis(150)).await;

        let (status, _) = send(&router, request_from("192.0.2.2")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_tracks_ips_independently() {
        let router = rate_limited_router(rate_limit(Duration::from_secs(60), 2, false));

        let mut allowed = 0;
        for ip in ["198.51.100.1", "198.51.100.2", "198.51.100.1", "198.51.100.2"] {
            let (status, _) = send(&router, request_from(ip)).await;
            if status == StatusCode::OK {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 4);
    }

    #[tokio::test]
    async fn test_injected_limiter_can_be_reset() {
        let guard = rate_limit(Duration::from_secs(60), 1, false);
        let limiter = guard.limiter().clone();
        let router = rate_limited_router(guard);

        let (status, _) = send(&router, request_from("192.0.2.9")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, request_from("192.0.2.9")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        limiter.reset();
        let (status, _) = send(&router, request_from("192.0.2.9")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
