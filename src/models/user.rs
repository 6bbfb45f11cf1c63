// src/models/user.rs

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Capability tag checked by the access middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Viewer,
    Po,
    It,
    Comms,
    Hr,
    Cmas,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Viewer => "viewer",
            Role::Po => "po",
            Role::It => "it",
            Role::Comms => "comms",
            Role::Hr => "hr",
            Role::Cmas => "cmas",
        }
    }
}

/// Approval state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Approved,
    Pending,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Approved => "approved",
            Status::Pending => "pending",
        }
    }
}

/// Represents a document in the 'users' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub full_name: String,

    pub email: String,

    /// Argon2 password hash. Never serialized into a response; see `UserResponse`.
    pub password: String,

    pub role: Role,

    pub status: Status,

    pub terms_and_conditions: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        full_name: String,
        email: String,
        password_hash: String,
        role: Role,
        status: Status,
        terms_and_conditions: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            full_name,
            email,
            password: password_hash,
            role,
            status,
            terms_and_conditions,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a user, without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub status: Status,
    pub terms_and_conditions: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            status: user.status,
            terms_and_conditions: user.terms_and_conditions,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn must_accept_terms(accepted: &bool) -> Result<(), ValidationError> {
    if !*accepted {
        return Err(ValidationError::new("terms_not_accepted")
            .with_message("Terms and conditions must be accepted.".into()));
    }
    Ok(())
}

/// DTO for self-service registration.
/// Role and status are not accepted from the client.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 200, message = "Full name is required."))]
    pub full_name: String,
    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 128,
        message = "Password length must be between 1 and 128 characters."
    ))]
    pub password: String,
    #[validate(custom(function = must_accept_terms))]
    pub terms_and_conditions: bool,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// When set, the issued token carries no expiry.
    #[serde(rename = "rememberMe", default)]
    pub remember_me: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email must be a valid address."))]
    pub email: String,
}

/// Partial update of a user.
/// A field is applied when present in the payload, whatever its value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email(message = "Email must be a valid address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
    pub terms_and_conditions: Option<bool>,
}

impl UserPatch {
    /// True when this patch moves a pending account to approved.
    pub fn approves(&self, current: Status) -> bool {
        current == Status::Pending && self.status == Some(Status::Approved)
    }
}
