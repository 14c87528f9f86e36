//! Data structures for authentication-related entities.
//!
//! This module defines the authenticated identity attached to a request, the
//! role and participant-type taxonomies, the fixed access policies used by
//! the convenience guards, and the request/response payloads of the auth
//! endpoints.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use validator::Validate;

/// Coarse access-control role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Participant,
    Presenter,
    Organizer,
    Reviewer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Participant => "participant",
            UserRole::Presenter => "presenter",
            UserRole::Organizer => "organizer",
            UserRole::Reviewer => "reviewer",
            UserRole::Admin => "admin",
        }
    }

    /// Roles that bypass ownership checks.
    pub fn is_elevated(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Organizer)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "participant" => Ok(UserRole::Participant),
            "presenter" => Ok(UserRole::Presenter),
            "organizer" => Ok(UserRole::Organizer),
            "reviewer" => Ok(UserRole::Reviewer),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid role: {}", input)),
        }
    }
}

/// Fine-grained conference attendee classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantType {
    KeynoteSpeaker,
    Presenter,
    PosterPresenter,
    Attendee,
    Student,
    Organizer,
    Reviewer,
    Volunteer,
    Sponsor,
    Guest,
}

impl ParticipantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::KeynoteSpeaker => "keynote_speaker",
            ParticipantType::Presenter => "presenter",
            ParticipantType::PosterPresenter => "poster_presenter",
            ParticipantType::Attendee => "attendee",
            ParticipantType::Student => "student",
            ParticipantType::Organizer => "organizer",
            ParticipantType::Reviewer => "reviewer",
            ParticipantType::Volunteer => "volunteer",
            ParticipantType::Sponsor => "sponsor",
            ParticipantType::Guest => "guest",
        }
    }
}

impl Display for ParticipantType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParticipantType {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "keynote_speaker" => Ok(ParticipantType::KeynoteSpeaker),
            "presenter" => Ok(ParticipantType::Presenter),
            "poster_presenter" => Ok(ParticipantType::PosterPresenter),
            "attendee" => Ok(ParticipantType::Attendee),
            "student" => Ok(ParticipantType::Student),
            "organizer" => Ok(ParticipantType::Organizer),
            "reviewer" => Ok(ParticipantType::Reviewer),
            "volunteer" => Ok(ParticipantType::Volunteer),
            "sponsor" => Ok(ParticipantType::Sponsor),
            "guest" => Ok(ParticipantType::Guest),
            _ => Err(format!("Invalid participant type: {}", input)),
        }
    }
}

/// Participant types allowed to submit abstracts.
pub const SUBMITTING_PARTICIPANT_TYPES: &[ParticipantType] = &[
    ParticipantType::KeynoteSpeaker,
    ParticipantType::Presenter,
    ParticipantType::PosterPresenter,
    ParticipantType::Organizer,
];

/// Identity derived from a verified token. Attached to the request once
/// authentication succeeds and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub participant_type: ParticipantType,
}

/// Named role sets for the convenience guards.
///
/// Each policy lists its roles explicitly; there is no inheritance between
/// policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    AdminOnly,
    OrganizerOrAdmin,
    ReviewerOrAbove,
    PresenterOrAbove,
}

impl AccessPolicy {
    pub const fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            AccessPolicy::AdminOnly => &[UserRole::Admin],
            AccessPolicy::OrganizerOrAdmin => &[UserRole::Organizer, UserRole::Admin],
            AccessPolicy::ReviewerOrAbove => {
                &[UserRole::Reviewer, UserRole::Organizer, UserRole::Admin]
            }
            AccessPolicy::PresenterOrAbove => {
                &[UserRole::Presenter, UserRole::Organizer, UserRole::Admin]
            }
        }
    }
}

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1-255 characters"
    ))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub participant_type: Option<ParticipantType>,
}

/// Response containing an access token and the identity it encodes
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub user: AuthenticatedIdentity,
}
