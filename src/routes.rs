// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, articles, auth},
    state::AppState,
    utils::jwt::{AccessGate, AccessRule, require_access},
};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Assembles the main application router.
///
/// * Account routes are public; `/seed-admin` checks its own shared secret.
/// * User management and article routes require an approved administrator.
/// * Applies global middleware (Trace, CORS, body limit).
pub fn create_router(state: AppState) -> Router {
    let secret = state.config.jwt_secret.clone();
    let public = AccessGate::new(AccessRule::Public, secret.clone());
    let approved_admin = AccessGate::new(AccessRule::approved_admin(), secret);

    let account_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/seed-admin", post(admin::seed_admin_handler))
        .route_layer(middleware::from_fn_with_state(public, require_access));

    let user_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        );

    // Category reads stay admin-gated along with writes.
    let article_routes = Router::new()
        .route(
            "/article-category",
            post(articles::create_category).get(articles::list_categories),
        )
        .route(
            "/article-category/{id}",
            get(articles::get_category).delete(articles::delete_category),
        )
        .route("/article-content", post(articles::create_content));

    let protected_routes = user_routes
        .merge(article_routes)
        .route_layer(middleware::from_fn_with_state(approved_admin, require_access));

    Router::new()
        .route("/", get(|| async { "article-hub is running" }))
        .merge(account_routes)
        .merge(protected_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_origins))
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        )
        .with_state(state)
}
