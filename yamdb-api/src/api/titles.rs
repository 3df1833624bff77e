//! Title endpoints
//!
//! World-readable, admin-writable. Every read serializes the derived
//! rating; creation requires at least one genre and a year no later than
//! the current one.

use crate::api::auth_middleware::CurrentUser;
use crate::api::pagination::{Page, PageQuery};
use crate::api::server::AppContext;
use crate::db::titles::{self, TitleFilter, TitlePatch};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use yamdb_common::db::models::Title;
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::permissions::{authorize, Action, Scope};
use yamdb_common::validate::{check_name, check_year};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TitleListQuery {
    category: Option<String>,
    genre: Option<String>,
    name: Option<String>,
    year: Option<i64>,
    page: Option<u32>,
    page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    name: String,
    year: i64,
    description: Option<String>,
    /// Genre slugs; at least one required
    genre: Vec<String>,
    /// Category slug
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchTitleRequest {
    name: Option<String>,
    year: Option<i64>,
    description: Option<String>,
    genre: Option<Vec<String>>,
    category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/titles - List titles with combinable filters:
/// category slug, genre slug, name substring (case-insensitive), exact year
pub async fn list_titles(
    State(ctx): State<AppContext>,
    Query(query): Query<TitleListQuery>,
) -> Result<Json<Page<Title>>> {
    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let filter = TitleFilter {
        category: query.category,
        genre: query.genre,
        name: query.name,
        year: query.year,
    };
    let (limit, offset) = page.limit_offset();
    let (count, results) = titles::list(&ctx.db_pool, &filter, limit, offset).await?;

    Ok(Json(Page { count, results }))
}

/// GET /api/v1/titles/:title_id - Fetch one title with its derived rating
pub async fn get_title(
    State(ctx): State<AppContext>,
    Path(title_id): Path<i64>,
) -> Result<Json<Title>> {
    let title = titles::get(&ctx.db_pool, title_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Title {} does not exist", title_id)))?;

    Ok(Json(title))
}

/// POST /api/v1/titles - Create a title (admin only)
pub async fn create_title(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<CreateTitleRequest>,
) -> Result<(StatusCode, Json<Title>)> {
    let mut errors = FieldErrors::new();
    if let Err(message) = check_name(&req.name) {
        errors.push("name", message);
    }
    if let Err(message) = check_year(req.year, ctx.min_title_year) {
        errors.push("year", message);
    }
    if req.genre.is_empty() {
        errors.push("genre", "At least one genre is required");
    }
    errors.into_result()?;

    authorize(Some(&principal), Action::Create, Scope::PublicCatalog)?;

    let category_id = match &req.category {
        Some(slug) => Some(titles::resolve_category(&ctx.db_pool, slug).await?),
        None => None,
    };
    let genre_ids = titles::resolve_genres(&ctx.db_pool, &req.genre).await?;

    let title_id = titles::create(
        &ctx.db_pool,
        &req.name,
        req.year,
        req.description.as_deref(),
        category_id,
        &genre_ids,
    )
    .await?;
    info!("Created title {} ('{}')", title_id, req.name);

    let title = titles::get(&ctx.db_pool, title_id)
        .await?
        .ok_or_else(|| Error::Internal("Title vanished after create".to_string()))?;

    Ok((StatusCode::CREATED, Json(title)))
}

/// PATCH /api/v1/titles/:title_id - Partially update a title (admin only)
pub async fn patch_title(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(title_id): Path<i64>,
    Json(req): Json<PatchTitleRequest>,
) -> Result<Json<Title>> {
    let mut errors = FieldErrors::new();
    if let Some(name) = &req.name {
        if let Err(message) = check_name(name) {
            errors.push("name", message);
        }
    }
    if let Some(year) = req.year {
        if let Err(message) = check_year(year, ctx.min_title_year) {
            errors.push("year", message);
        }
    }
    if let Some(genre) = &req.genre {
        if genre.is_empty() {
            errors.push("genre", "At least one genre is required");
        }
    }
    errors.into_result()?;

    authorize(Some(&principal), Action::Update, Scope::PublicCatalog)?;

    if !titles::exists(&ctx.db_pool, title_id).await? {
        return Err(Error::NotFound(format!(
            "Title {} does not exist",
            title_id
        )));
    }

    let category_id = match &req.category {
        Some(slug) => Some(titles::resolve_category(&ctx.db_pool, slug).await?),
        None => None,
    };
    let genre_ids = match &req.genre {
        Some(slugs) => Some(titles::resolve_genres(&ctx.db_pool, slugs).await?),
        None => None,
    };

    let patch = TitlePatch {
        name: req.name,
        year: req.year,
        description: req.description,
        category_id,
        genre_ids,
    };
    titles::update(&ctx.db_pool, title_id, &patch).await?;

    let title = titles::get(&ctx.db_pool, title_id)
        .await?
        .ok_or_else(|| Error::Internal("Title vanished during update".to_string()))?;

    Ok(Json(title))
}

/// DELETE /api/v1/titles/:title_id - Delete a title and, by cascade, its
/// reviews and their comments (admin only)
pub async fn delete_title(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(title_id): Path<i64>,
) -> Result<StatusCode> {
    authorize(Some(&principal), Action::Delete, Scope::PublicCatalog)?;

    if !titles::delete(&ctx.db_pool, title_id).await? {
        return Err(Error::NotFound(format!(
            "Title {} does not exist",
            title_id
        )));
    }
    info!("Deleted title {}", title_id);

    Ok(StatusCode::NO_CONTENT)
}
