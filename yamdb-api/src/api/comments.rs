//! Comment endpoints, nested under a review
//!
//! Same ownership rules as reviews, minus the uniqueness constraint: a
//! user may comment on the same review any number of times.

use crate::api::auth_middleware::CurrentUser;
use crate::api::pagination::{Page, PageQuery};
use crate::api::server::AppContext;
use crate::db::{comments, reviews, titles};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use yamdb_common::db::models::Comment;
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::permissions::{authorize, Action, Scope};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
pub struct PatchCommentRequest {
    text: Option<String>,
}

/// Resolve the (title, review) parent chain; any broken link is NotFound
async fn require_parents(ctx: &AppContext, title_id: i64, review_id: i64) -> Result<()> {
    if !titles::exists(&ctx.db_pool, title_id).await? {
        return Err(Error::NotFound(format!(
            "Title {} does not exist",
            title_id
        )));
    }
    if reviews::get(&ctx.db_pool, title_id, review_id).await?.is_none() {
        return Err(Error::NotFound(format!(
            "Review {} does not exist",
            review_id
        )));
    }
    Ok(())
}

async fn require_comment(
    ctx: &AppContext,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> Result<Comment> {
    require_parents(ctx, title_id, review_id).await?;
    comments::get(&ctx.db_pool, review_id, comment_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Comment {} does not exist", comment_id)))
}

/// GET .../reviews/:review_id/comments - List a review's comments (anyone)
pub async fn list_comments(
    State(ctx): State<AppContext>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Comment>>> {
    require_parents(&ctx, title_id, review_id).await?;

    let (limit, offset) = page.limit_offset();
    let (count, results) = comments::list(&ctx.db_pool, review_id, limit, offset).await?;

    Ok(Json(Page { count, results }))
}

/// GET .../comments/:comment_id - Fetch one comment (anyone)
pub async fn get_comment(
    State(ctx): State<AppContext>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<Json<Comment>> {
    let comment = require_comment(&ctx, title_id, review_id, comment_id).await?;
    Ok(Json(comment))
}

/// POST .../reviews/:review_id/comments - Post a comment (authenticated)
pub async fn create_comment(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let mut errors = FieldErrors::new();
    if req.text.is_empty() {
        errors.push("text", "This field may not be blank");
    }
    errors.into_result()?;

    authorize(Some(&principal), Action::Create, Scope::UserContent { author: None })?;
    require_parents(&ctx, title_id, review_id).await?;

    let comment_id =
        comments::create(&ctx.db_pool, review_id, &principal.guid, &req.text).await?;
    info!(
        "User {} commented on review {}",
        principal.username, review_id
    );

    let comment = comments::get(&ctx.db_pool, review_id, comment_id)
        .await?
        .ok_or_else(|| Error::Internal("Comment vanished after create".to_string()))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH .../comments/:comment_id - Update the text (author, moderator or admin)
pub async fn patch_comment(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(req): Json<PatchCommentRequest>,
) -> Result<Json<Comment>> {
    let mut errors = FieldErrors::new();
    if let Some(text) = &req.text {
        if text.is_empty() {
            errors.push("text", "This field may not be blank");
        }
    }
    errors.into_result()?;

    let comment = require_comment(&ctx, title_id, review_id, comment_id).await?;
    authorize(
        Some(&principal),
        Action::Update,
        Scope::UserContent {
            author: Some(&comment.author_guid),
        },
    )?;

    if let Some(text) = &req.text {
        comments::update(&ctx.db_pool, comment_id, text).await?;
    }

    let updated = comments::get(&ctx.db_pool, review_id, comment_id)
        .await?
        .ok_or_else(|| Error::Internal("Comment vanished during update".to_string()))?;

    Ok(Json(updated))
}

/// DELETE .../comments/:comment_id - Remove a comment (author, moderator or admin)
pub async fn delete_comment(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode> {
    let comment = require_comment(&ctx, title_id, review_id, comment_id).await?;
    authorize(
        Some(&principal),
        Action::Delete,
        Scope::UserContent {
            author: Some(&comment.author_guid),
        },
    )?;

    comments::delete(&ctx.db_pool, review_id, comment_id).await?;
    info!("User {} deleted comment {}", principal.username, comment_id);

    Ok(StatusCode::NO_CONTENT)
}
