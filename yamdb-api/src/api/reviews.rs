//! Review endpoints, nested under a title
//!
//! Anyone may read; any authenticated user may post one review per title;
//! only the author, a moderator or an admin may change or remove it. A
//! second review from the same author is a conflict even when the text or
//! score differ.

use crate::api::auth_middleware::CurrentUser;
use crate::api::pagination::{Page, PageQuery};
use crate::api::server::AppContext;
use crate::db::{reviews, titles};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use yamdb_common::db::models::Review;
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::permissions::{authorize, Action, Scope};
use yamdb_common::validate::check_score;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    text: String,
    score: i64,
}

#[derive(Debug, Deserialize)]
pub struct PatchReviewRequest {
    text: Option<String>,
    score: Option<i64>,
}

async fn require_title(ctx: &AppContext, title_id: i64) -> Result<()> {
    if titles::exists(&ctx.db_pool, title_id).await? {
        Ok(())
    } else {
        Err(Error::NotFound(format!(
            "Title {} does not exist",
            title_id
        )))
    }
}

async fn require_review(ctx: &AppContext, title_id: i64, review_id: i64) -> Result<Review> {
    require_title(ctx, title_id).await?;
    reviews::get(&ctx.db_pool, title_id, review_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Review {} does not exist", review_id)))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/titles/:title_id/reviews - List a title's reviews (anyone)
pub async fn list_reviews(
    State(ctx): State<AppContext>,
    Path(title_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Review>>> {
    require_title(&ctx, title_id).await?;

    let (limit, offset) = page.limit_offset();
    let (count, results) = reviews::list(&ctx.db_pool, title_id, limit, offset).await?;

    Ok(Json(Page { count, results }))
}

/// GET /api/v1/titles/:title_id/reviews/:review_id - Fetch one review (anyone)
pub async fn get_review(
    State(ctx): State<AppContext>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<Review>> {
    let review = require_review(&ctx, title_id, review_id).await?;
    Ok(Json(review))
}

/// POST /api/v1/titles/:title_id/reviews - Post a review (authenticated)
pub async fn create_review(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(title_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    let mut errors = FieldErrors::new();
    if req.text.is_empty() {
        errors.push("text", "This field may not be blank");
    }
    if let Err(message) = check_score(req.score) {
        errors.push("score", message);
    }
    errors.into_result()?;

    authorize(Some(&principal), Action::Create, Scope::UserContent { author: None })?;
    require_title(&ctx, title_id).await?;

    // The (title, author) uniqueness lives in the store; a concurrent
    // duplicate loses there and surfaces as Conflict
    let review_id =
        reviews::create(&ctx.db_pool, title_id, &principal.guid, &req.text, req.score).await?;
    info!(
        "User {} reviewed title {} (score {})",
        principal.username, title_id, req.score
    );

    let review = reviews::get(&ctx.db_pool, title_id, review_id)
        .await?
        .ok_or_else(|| Error::Internal("Review vanished after create".to_string()))?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// PATCH /api/v1/titles/:title_id/reviews/:review_id - Update text/score
/// (author, moderator or admin)
pub async fn patch_review(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<PatchReviewRequest>,
) -> Result<Json<Review>> {
    let mut errors = FieldErrors::new();
    if let Some(text) = &req.text {
        if text.is_empty() {
            errors.push("text", "This field may not be blank");
        }
    }
    if let Some(score) = req.score {
        if let Err(message) = check_score(score) {
            errors.push("score", message);
        }
    }
    errors.into_result()?;

    let review = require_review(&ctx, title_id, review_id).await?;
    authorize(
        Some(&principal),
        Action::Update,
        Scope::UserContent {
            author: Some(&review.author_guid),
        },
    )?;

    reviews::update(&ctx.db_pool, review_id, req.text.as_deref(), req.score).await?;

    let updated = reviews::get(&ctx.db_pool, title_id, review_id)
        .await?
        .ok_or_else(|| Error::Internal("Review vanished during update".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/titles/:title_id/reviews/:review_id - Remove a review
/// and its comments (author, moderator or admin)
pub async fn delete_review(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    let review = require_review(&ctx, title_id, review_id).await?;
    authorize(
        Some(&principal),
        Action::Delete,
        Scope::UserContent {
            author: Some(&review.author_guid),
        },
    )?;

    reviews::delete(&ctx.db_pool, title_id, review_id).await?;
    info!("User {} deleted review {}", principal.username, review_id);

    Ok(StatusCode::NO_CONTENT)
}
