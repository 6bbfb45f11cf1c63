// src/utils/jwt.rs

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::user::{Role, Status},
};

/// Lifetime of the token returned by signup.
pub const SIGNUP_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Lifetime of a login token when "remember me" is off.
pub const SESSION_TOKEN_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID as a hex ObjectId.
    pub id: String,
    pub role: Role,
    pub status: Status,
    /// Expiration as Unix timestamp. Absent on "remember me" tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

fn now_secs() -> Result<u64, AppError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

fn require_secret(secret: Option<&str>) -> Result<&str, AppError> {
    secret.ok_or_else(|| AppError::InternalServerError("JWT_SECRET is not configured".to_string()))
}

/// Signs a new JWT for the user.
///
/// `lifetime` of `None` produces a token without an `exp` claim.
pub fn sign_jwt(
    id: &str,
    role: Role,
    status: Status,
    lifetime: Option<Duration>,
    secret: Option<&str>,
) -> Result<String, AppError> {
    let secret = require_secret(secret)?;

    let exp = match lifetime {
        Some(lifetime) => Some(now_secs()? + lifetime.as_secs()),
        None => None,
    };

    let claims = Claims {
        id: id.to_owned(),
        role,
        status,
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// `exp` is checked when present. Malformed, tampered and expired tokens all
/// map to the same `AuthError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Who may pass a route.
#[derive(Debug, Clone)]
pub enum AccessRule {
    /// No token needed.
    Public,
    /// Token role must be one of `roles` and its status must equal `status`.
    Require { roles: Vec<Role>, status: Status },
}

impl AccessRule {
    pub fn approved_admin() -> Self {
        AccessRule::Require {
            roles: vec![Role::Administrator],
            status: Status::Approved,
        }
    }

    pub fn permits(&self, claims: &Claims) -> bool {
        match self {
            AccessRule::Public => true,
            AccessRule::Require { roles, status } => {
                roles.contains(&claims.role) && claims.status == *status
            }
        }
    }
}

/// Middleware state: the rule for a group of routes and the verification secret.
#[derive(Debug, Clone)]
pub struct AccessGate {
    pub rule: AccessRule,
    pub jwt_secret: Option<String>,
}

impl AccessGate {
    pub fn new(rule: AccessRule, jwt_secret: Option<String>) -> Self {
        Self { rule, jwt_secret }
    }
}

/// Returns the raw token of a `Bearer` Authorization header.
/// `Ok(None)` means the header is missing altogether.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| Some(token.trim()))
        .ok_or_else(|| AppError::AuthError("Invalid token".to_string()))
}

/// Axum Middleware: role and status gate.
///
/// Public rules pass straight through. Otherwise the bearer token is verified
/// (401 on failure) and checked against the rule (403 on mismatch). Verified
/// `Claims` are injected into the request extensions.
pub async fn require_access(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if let AccessRule::Public = gate.rule {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers())?
        .ok_or_else(|| AppError::AuthError("No authorization header provided".to_string()))?;

    let secret = require_secret(gate.jwt_secret.as_deref())?;
    let claims = verify_jwt(token, secret)?;

    if !gate.rule.permits(&claims) {
        tracing::warn!(
            "Access denied for user {} (role={}, status={})",
            claims.id,
            claims.role.as_str(),
            claims.status.as_str()
        );
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    const SECRET: &str = "unit-test-secret";

    fn expired_token() -> String {
        let claims = Claims {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".into(),
            role: Role::Administrator,
            status: Status::Approved,
            exp: Some(now_secs().unwrap() - 10),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn session_tokens_expire_in_72_hours() {
        let before = now_secs().unwrap();
        let token = sign_jwt(
            "abc",
            Role::Viewer,
            Status::Approved,
            Some(SESSION_TOKEN_TTL),
            Some(SECRET),
        )
        .unwrap();
        let after = now_secs().unwrap();

        let exp = verify_jwt(&token, SECRET).unwrap().exp.unwrap();
        assert!(exp >= before + 72 * 3600 && exp <= after + 72 * 3600);
    }

    #[test]
    fn remember_me_tokens_have_no_expiry() {
        let token = sign_jwt("abc", Role::Viewer, Status::Approved, None, Some(SECRET)).unwrap();
        let claims = verify_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.exp, None);
        assert_eq!(claims.role, Role::Viewer);
        assert_eq!(claims.status, Status::Approved);
    }

    #[test]
    fn missing_secret_is_internal() {
        assert!(matches!(
            sign_jwt("abc", Role::Viewer, Status::Pending, None, None),
            Err(AppError::InternalServerError(_))
        ));
    }

    #[test]
    fn tampered_and_expired_tokens_fail_alike() {
        let token = sign_jwt("abc", Role::Viewer, Status::Approved, None, Some(SECRET)).unwrap();
        assert!(matches!(verify_jwt(&token, "other-secret"), Err(AppError::AuthError(_))));
        assert!(matches!(verify_jwt("garbage", SECRET), Err(AppError::AuthError(_))));
        assert!(matches!(verify_jwt(&expired_token(), SECRET), Err(AppError::AuthError(_))));
    }

    #[test]
    fn rule_requires_role_and_status() {
        let rule = AccessRule::approved_admin();
        let mut claims = Claims {
            id: "abc".into(),
            role: Role::Administrator,
            status: Status::Approved,
            exp: None,
        };
        assert!(rule.permits(&claims));

        claims.status = Status::Pending;
        assert!(!rule.permits(&claims));

        claims.status = Status::Approved;
        claims.role = Role::Viewer;
        assert!(!rule.permits(&claims));

        assert!(AccessRule::Public.permits(&claims));
    }

    async fn status_for(rule: AccessRule, auth: Option<String>) -> StatusCode {
        let app = Router::new().route("/", get(|| async { "ok" })).layer(
            middleware::from_fn_with_state(
                AccessGate::new(rule, Some(SECRET.to_string())),
                require_access,
            ),
        );

        let mut request = Request::builder().uri("/");
        if let Some(value) = auth {
            request = request.header(header::AUTHORIZATION, value);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn middleware_maps_failures_to_401_and_403() {
        let viewer = sign_jwt("abc", Role::Viewer, Status::Approved, None, Some(SECRET)).unwrap();
        let admin = sign_jwt("abc", Role::Administrator, Status::Approved, None, Some(SECRET)).unwrap();

        assert_eq!(status_for(AccessRule::approved_admin(), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(AccessRule::approved_admin(), Some(format!("Token {}", admin))).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(AccessRule::approved_admin(), Some(format!("Bearer {}", viewer))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(AccessRule::approved_admin(), Some(format!("Bearer {}", admin))).await,
            StatusCode::OK
        );
        assert_eq!(status_for(AccessRule::Public, None).await, StatusCode::OK);
    }
}
