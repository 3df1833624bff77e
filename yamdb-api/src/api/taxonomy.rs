//! Category and Genre endpoints
//!
//! World-readable reference data, created and deleted only by admins.
//! No update endpoint: the original API treats these as replace-or-delete
//! tags.

use crate::api::auth_middleware::CurrentUser;
use crate::api::pagination::{Page, PageQuery};
use crate::api::server::AppContext;
use crate::db::taxonomy::{self, TermKind};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use yamdb_common::db::models::Term;
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::permissions::{authorize, Action, Scope};
use yamdb_common::validate::{check_name, check_slug};

#[derive(Debug, Deserialize)]
pub struct TermListQuery {
    search: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl TermListQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTermRequest {
    name: String,
    slug: String,
}

async fn list_terms(
    ctx: &AppContext,
    kind: TermKind,
    query: TermListQuery,
) -> Result<Json<Page<Term>>> {
    let (limit, offset) = query.page().limit_offset();
    let (count, results) =
        taxonomy::list(&ctx.db_pool, kind, query.search.as_deref(), limit, offset).await?;
    Ok(Json(Page { count, results }))
}

async fn create_term(
    ctx: &AppContext,
    principal: &yamdb_common::db::models::User,
    kind: TermKind,
    req: CreateTermRequest,
) -> Result<(StatusCode, Json<Term>)> {
    let mut errors = FieldErrors::new();
    if let Err(message) = check_name(&req.name) {
        errors.push("name", message);
    }
    if let Err(message) = check_slug(&req.slug) {
        errors.push("slug", message);
    }
    errors.into_result()?;

    authorize(Some(principal), Action::Create, Scope::PublicCatalog)?;

    let term = taxonomy::create(&ctx.db_pool, kind, &req.name, &req.slug).await?;
    info!("Created {} '{}'", kind.label(), term.slug);

    Ok((StatusCode::CREATED, Json(term)))
}

async fn delete_term(
    ctx: &AppContext,
    principal: &yamdb_common::db::models::User,
    kind: TermKind,
    slug: String,
) -> Result<StatusCode> {
    authorize(Some(principal), Action::Delete, Scope::PublicCatalog)?;

    if !taxonomy::delete_by_slug(&ctx.db_pool, kind, &slug).await? {
        return Err(Error::NotFound(format!(
            "{} with slug '{}' does not exist",
            kind.label(),
            slug
        )));
    }
    info!("Deleted {} '{}'", kind.label(), slug);

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/v1/categories - List categories (anyone; ?search= matches name)
pub async fn list_categories(
    State(ctx): State<AppContext>,
    Query(query): Query<TermListQuery>,
) -> Result<Json<Page<Term>>> {
    list_terms(&ctx, TermKind::Category, query).await
}

/// POST /api/v1/categories - Create a category (admin only)
pub async fn create_category(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<CreateTermRequest>,
) -> Result<(StatusCode, Json<Term>)> {
    create_term(&ctx, &principal, TermKind::Category, req).await
}

/// DELETE /api/v1/categories/:slug - Delete a category (admin only);
/// titles referencing it keep existing with their category cleared
pub async fn delete_category(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    delete_term(&ctx, &principal, TermKind::Category, slug).await
}

// ============================================================================
// Genres
// ============================================================================

/// GET /api/v1/genres - List genres (anyone; ?search= matches name)
pub async fn list_genres(
    State(ctx): State<AppContext>,
    Query(query): Query<TermListQuery>,
) -> Result<Json<Page<Term>>> {
    list_terms(&ctx, TermKind::Genre, query).await
}

/// POST /api/v1/genres - Create a genre (admin only)
pub async fn create_genre(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<CreateTermRequest>,
) -> Result<(StatusCode, Json<Term>)> {
    create_term(&ctx, &principal, TermKind::Genre, req).await
}

/// DELETE /api/v1/genres/:slug - Delete a genre (admin only); titles
/// referencing it are detached, not deleted
pub async fn delete_genre(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(slug): Path<String>,
) -> Result<StatusCode> {
    delete_term(&ctx, &principal, TermKind::Genre, slug).await
}
