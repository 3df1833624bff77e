//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with all /api/v1 routes. Handlers receive
//! a shared AppContext; the bearer-token extractors in auth_middleware
//! resolve the caller to a principal per request.

use crate::api;
use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use yamdb_common::mail::Mailer;

/// Shared application context passed to all handlers
///
/// **Note:** AppContext implements Clone, which gives us `FromRef<AppContext>`
/// for free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: Pool<Sqlite>,
    /// HS256 secret for access tokens, loaded once at startup
    pub signing_secret: String,
    pub token_ttl_hours: i64,
    /// Lower bound for Title.year (policy knob)
    pub min_title_year: i64,
    /// Outbound notification transport (fire-and-forget)
    pub mailer: Arc<dyn Mailer>,
}

/// Build the application router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(health))
        // Identity and credential issuing
        .route("/api/v1/auth/signup", post(api::auth::signup))
        .route("/api/v1/auth/token", post(api::auth::exchange_token))
        // User directory (admin) and own profile
        .route(
            "/api/v1/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route(
            "/api/v1/users/me",
            get(api::users::get_me).patch(api::users::patch_me),
        )
        .route(
            "/api/v1/users/:username",
            get(api::users::get_user)
                .patch(api::users::patch_user)
                .delete(api::users::delete_user),
        )
        // Categories and genres
        .route(
            "/api/v1/categories",
            get(api::taxonomy::list_categories).post(api::taxonomy::create_category),
        )
        .route("/api/v1/categories/:slug", delete(api::taxonomy::delete_category))
        .route(
            "/api/v1/genres",
            get(api::taxonomy::list_genres).post(api::taxonomy::create_genre),
        )
        .route("/api/v1/genres/:slug", delete(api::taxonomy::delete_genre))
        // Titles
        .route(
            "/api/v1/titles",
            get(api::titles::list_titles).post(api::titles::create_title),
        )
        .route(
            "/api/v1/titles/:title_id",
            get(api::titles::get_title)
                .patch(api::titles::patch_title)
                .delete(api::titles::delete_title),
        )
        // Reviews nested under titles
        .route(
            "/api/v1/titles/:title_id/reviews",
            get(api::reviews::list_reviews).post(api::reviews::create_review),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id",
            get(api::reviews::get_review)
                .patch(api::reviews::patch_review)
                .delete(api::reviews::delete_review),
        )
        // Comments nested under reviews
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments",
            get(api::comments::list_comments).post(api::comments::create_comment),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id",
            get(api::comments::get_comment)
                .patch(api::comments::patch_comment)
                .delete(api::comments::delete_comment),
        )
        // Attach application context
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}

/// GET /health - Health check endpoint
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "module": "yamdb-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

