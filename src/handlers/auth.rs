// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    db::users::{UserChanges, UserFilter, UserStore},
    error::{AppError, AppJson},
    models::user::{
        ForgotPasswordRequest, LoginRequest, Role, SignupRequest, Status, User, UserResponse,
    },
    utils::{
        hash::{GENERATED_PASSWORD_LEN, generate_password, hash_password, verify_password},
        jwt::{SESSION_TOKEN_TTL, SIGNUP_TOKEN_TTL, sign_jwt},
    },
};

/// Registers a new user.
///
/// New accounts are always `viewer` / `pending`. The email check and the insert
/// are separate calls, so two concurrent signups with one email can both pass.
/// Returns 201 Created with the user (no password) and a 2-hour token.
pub async fn signup(
    State(users): State<Arc<dyn UserStore>>,
    State(config): State<Config>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if users
        .find_one(UserFilter::by_email(&payload.email))
        .await?
        .is_some()
    {
        tracing::info!("Email already in use: {}", payload.email);
        return Err(AppError::Conflict("Email is already in use".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = User::new(
        payload.full_name,
        payload.email,
        hashed_password,
        Role::Viewer,
        Status::Pending,
        payload.terms_and_conditions,
    );

    users.insert(&user).await?;
    tracing::info!("User {} created with ID: {}", user.email, user.id.to_hex());

    let token = sign_jwt(
        &user.id.to_hex(),
        user.role,
        user.status,
        Some(SIGNUP_TOKEN_TTL),
        config.jwt_secret.as_deref(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": UserResponse::from(user),
            "token": token,
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
///
/// With `rememberMe: true` the token has no expiry, otherwise it lasts 72 hours.
pub async fn login(
    State(users): State<Arc<dyn UserStore>>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = users
        .find_one(UserFilter::by_email(&payload.email))
        .await?
        .ok_or(AppError::AuthError("Email not found".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Incorrect password".to_string()));
    }

    let remember_me = payload.remember_me.unwrap_or(false);
    let lifetime = if remember_me {
        None
    } else {
        Some(SESSION_TOKEN_TTL)
    };

    let token = sign_jwt(
        &user.id.to_hex(),
        user.role,
        user.status,
        lifetime,
        config.jwt_secret.as_deref(),
    )?;

    tracing::info!("User {} logged in (remember me: {})", user.email, remember_me);

    Ok(Json(json!({
        "user": UserResponse::from(user),
        "token": token,
    })))
}

/// Tokens are stateless; the client is told to drop its copy.
pub async fn logout() -> impl IntoResponse {
    Json(json!({
        "message": "Logged out successfully",
        "clearToken": true,
    }))
}

/// Resets the password of an approved account.
///
/// The generated password is stored hashed and never sent back; the user has
/// to obtain it from an administrator.
pub async fn forgot_password(
    State(users): State<Arc<dyn UserStore>>,
    AppJson(payload): AppJson<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let not_found = || AppError::NotFound("Email not found or not approved".to_string());

    let user = users
        .find_one(UserFilter::by_email(&payload.email).with_status(Status::Approved))
        .await?
        .ok_or_else(not_found)?;

    let new_password = generate_password(GENERATED_PASSWORD_LEN);
    let changes = UserChanges {
        password_hash: Some(hash_password(&new_password)?),
        ..Default::default()
    };

    if !users.update(user.id, changes).await? {
        return Err(not_found());
    }

    tracing::info!("Password reset for user {}", user.id.to_hex());

    Ok(Json(json!({
        "message": "Password reset successful. Please contact the administrator to retrieve your new password."
    })))
}
