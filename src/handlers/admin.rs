// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::{AdminSeed, Config},
    db::users::{UserChanges, UserStore},
    error::{AppError, AppJson, parse_object_id},
    models::user::{Role, Status, User, UserPatch, UserResponse},
    utils::{
        hash::{GENERATED_PASSWORD_LEN, generate_password, hash_password},
        jwt::Claims,
    },
};

/// Inserts an approved administrator from the seed configuration.
/// Skips signup validation and the email uniqueness check.
pub async fn seed_admin(users: &dyn UserStore, seed: &AdminSeed) -> Result<User, AppError> {
    let admin = User::new(
        seed.full_name.clone(),
        seed.email.clone(),
        hash_password(&seed.password)?,
        Role::Administrator,
        Status::Approved,
        true,
    );

    users.insert(&admin).await?;
    tracing::info!("Admin user ({}) seeded successfully", admin.email);

    Ok(admin)
}

/// Seeds the administrator account.
///
/// Guarded by `Authorization: Bearer <JWT_SECRET>` rather than a user token.
pub async fn seed_admin_handler(
    State(users): State<Arc<dyn UserStore>>,
    State(config): State<Config>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let secret = config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| AppError::InternalServerError("JWT_SECRET is not configured".to_string()))?;

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented != Some(secret) {
        return Err(AppError::AuthError("Unauthorized".to_string()));
    }

    let seed = config.admin_seed.as_ref().ok_or_else(|| {
        AppError::InternalServerError(
            "one or more required admin seed environment variables are not set".to_string(),
        )
    })?;

    let admin = seed_admin(users.as_ref(), seed).await?;

    Ok(Json(json!({
        "message": "Admin user seeded successfully",
        "admin_id": admin.id.to_hex(),
        "email": admin.email,
        "role": admin.role,
        "status": admin.status,
    })))
}

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(
    State(users): State<Arc<dyn UserStore>>,
) -> Result<impl IntoResponse, AppError> {
    let all: Vec<UserResponse> = users
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(all))
}

/// Retrieves a single user by ID.
/// Admin only.
pub async fn get_user(
    State(users): State<Arc<dyn UserStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_object_id(&id, "user")?;

    let user = users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Applies a partial update to a user.
/// Admin only.
///
/// Approving a pending account also replaces its password with a generated
/// one, overriding any password in the payload.
pub async fn update_user(
    State(users): State<Arc<dyn UserStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UserPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_object_id(&id, "user")?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing = users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let approving = payload.approves(existing.status);

    let password_hash = if approving {
        Some(hash_password(&generate_password(GENERATED_PASSWORD_LEN))?)
    } else {
        payload.password.as_deref().map(hash_password).transpose()?
    };

    let changes = UserChanges {
        full_name: payload.full_name,
        email: payload.email,
        password_hash,
        role: payload.role,
        status: payload.status,
        terms_and_conditions: payload.terms_and_conditions,
    };

    if !users.update(id, changes).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if approving {
        tracing::info!("User {} approved by {}; password reset", id.to_hex(), claims.id);
    } else {
        tracing::info!("User {} updated by {}", id.to_hex(), claims.id);
    }

    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// Deletes a user by ID.
/// Admin only.
pub async fn delete_user(
    State(users): State<Arc<dyn UserStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_object_id(&id, "user")?;

    if !users.delete(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("User {} deleted by {}", id.to_hex(), claims.id);

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
