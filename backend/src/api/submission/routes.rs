//! Defines the HTTP routes for abstract submissions.
//!
//! Layers listed last run first, so every chain below starts with
//! authentication and narrows from there.

use super::handlers::{
    create_submission, delete_submission, get_submission, list_submissions,
    list_user_submissions, update_submission_status, validate_abstract,
};
use crate::auth::middleware::{
    AuthState, authenticate, authorize_participant_type, authorize_policy, optional_authenticate,
    require_ownership, require_ownership_or_admin, require_participant_type, require_role,
};
use crate::auth::models::{AccessPolicy, SUBMITTING_PARTICIPANT_TYPES};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

pub fn submission_router(auth: &AuthState) -> Router {
    Router::new()
        // Public, identity-aware
        .route(
            "/abstracts/validate",
            post(validate_abstract).layer(from_fn_with_state(auth.clone(), optional_authenticate)),
        )
        .route(
            "/submissions",
            post(create_submission)
                .layer(from_fn_with_state(
                    authorize_participant_type(auth, SUBMITTING_PARTICIPANT_TYPES),
                    require_participant_type,
                ))
                .layer(from_fn_with_state(
                    authorize_policy(auth, AccessPolicy::PresenterOrAbove),
                    require_role,
                ))
                .layer(from_fn_with_state(auth.clone(), authenticate))
                .merge(
                    get(list_submissions)
                        .layer(from_fn_with_state(
                            authorize_policy(auth, AccessPolicy::ReviewerOrAbove),
                            require_role,
                        ))
                        .layer(from_fn_with_state(auth.clone(), authenticate)),
                ),
        )
        .route(
            "/submissions/{id}",
            get(get_submission)
                .layer(from_fn_with_state(auth.clone(), optional_authenticate))
                .merge(
                    delete(delete_submission)
                        .layer(from_fn_with_state(
                            authorize_policy(auth, AccessPolicy::AdminOnly),
                            require_role,
                        ))
                        .layer(from_fn_with_state(auth.clone(), authenticate)),
                ),
        )
        .route(
            "/submissions/{id}/status",
            patch(update_submission_status)
                .layer(from_fn_with_state(
                    authorize_policy(auth, AccessPolicy::OrganizerOrAdmin),
                    require_role,
                ))
                .layer(from_fn_with_state(auth.clone(), authenticate)),
        )
        .route(
            "/users/{userId}/submissions",
            get(list_user_submissions)
                .layer(from_fn_with_state(
                    require_ownership(auth, "userId"),
                    require_ownership_or_admin,
                ))
                .layer(from_fn_with_state(auth.clone(), authenticate)),
        )
}
