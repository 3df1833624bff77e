//! User directory endpoints (admin) and the caller's own profile
//!
//! The directory - including reads - is admin territory. `/users/me` is
//! reachable by any authenticated principal, but the role field is frozen
//! there: a submitted role is ignored, not an error.

use crate::api::auth_middleware::CurrentUser;
use crate::api::pagination::{Page, PageQuery};
use crate::api::server::AppContext;
use crate::db;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use yamdb_common::db::models::{Role, User};
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::permissions::{authorize, Action, Scope};
use yamdb_common::validate::{check_email, check_person_name, check_username};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    search: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl UserListQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchUserRequest {
    username: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    bio: Option<String>,
    role: Option<String>,
}

impl PatchUserRequest {
    /// Field checks shared by the admin PATCH and /users/me PATCH
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if let Some(username) = &self.username {
            if let Err(message) = check_username(username) {
                errors.push("username", message);
            }
        }
        if let Some(email) = &self.email {
            if let Err(message) = check_email(email) {
                errors.push("email", message);
            }
        }
        if let Some(name) = &self.first_name {
            if let Err(message) = check_person_name(name) {
                errors.push("first_name", message);
            }
        }
        if let Some(name) = &self.last_name {
            if let Err(message) = check_person_name(name) {
                errors.push("last_name", message);
            }
        }
        if let Some(role) = &self.role {
            if Role::parse(role).is_none() {
                errors.push("role", "Role must be one of: user, moderator, admin");
            }
        }
        errors.into_result()
    }

    fn into_patch(self, allow_role: bool) -> db::users::UserPatch {
        db::users::UserPatch {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: if allow_role {
                self.role.as_deref().and_then(Role::parse)
            } else {
                None
            },
        }
    }
}

// ============================================================================
// Admin Directory Handlers
// ============================================================================

/// GET /api/v1/users - List users (admin only; ?search= matches username)
pub async fn list_users(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Page<User>>> {
    authorize(Some(&principal), Action::Read, Scope::UserDirectory)?;

    let (limit, offset) = query.page().limit_offset();
    let (count, results) =
        db::users::list(&ctx.db_pool, query.search.as_deref(), limit, offset).await?;

    Ok(Json(Page { count, results }))
}

/// POST /api/v1/users - Create a user with an explicit role (admin only)
pub async fn create_user(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let mut errors = FieldErrors::new();
    if let Err(message) = check_username(&req.username) {
        errors.push("username", message);
    }
    if let Err(message) = check_email(&req.email) {
        errors.push("email", message);
    }
    if let Some(name) = &req.first_name {
        if let Err(message) = check_person_name(name) {
            errors.push("first_name", message);
        }
    }
    if let Some(name) = &req.last_name {
        if let Err(message) = check_person_name(name) {
            errors.push("last_name", message);
        }
    }
    let role = match &req.role {
        None => Role::User,
        Some(value) => match Role::parse(value) {
            Some(role) => role,
            None => {
                errors.push("role", "Role must be one of: user, moderator, admin");
                Role::User
            }
        },
    };
    errors.into_result()?;

    authorize(Some(&principal), Action::Create, Scope::UserDirectory)?;

    let user = User {
        guid: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        bio: req.bio,
        role,
        is_staff: false,
        is_superuser: false,
    };
    db::users::insert(&ctx.db_pool, &user).await?;
    info!("Admin {} created user {}", principal.username, user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/:username - Fetch a user (admin only)
pub async fn get_user(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<User>> {
    authorize(Some(&principal), Action::Read, Scope::UserDirectory)?;

    let user = db::users::get_by_username(&ctx.db_pool, &username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User '{}' does not exist", username)))?;

    Ok(Json(user))
}

/// PATCH /api/v1/users/:username - Partially update a user (admin only)
pub async fn patch_user(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(username): Path<String>,
    Json(req): Json<PatchUserRequest>,
) -> Result<Json<User>> {
    req.validate()?;
    authorize(Some(&principal), Action::Update, Scope::UserDirectory)?;

    let user = db::users::get_by_username(&ctx.db_pool, &username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User '{}' does not exist", username)))?;

    db::users::update(&ctx.db_pool, &user.guid, &req.into_patch(true)).await?;

    let updated = db::users::get_by_guid(&ctx.db_pool, &user.guid)
        .await?
        .ok_or_else(|| Error::Internal("User vanished during update".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/v1/users/:username - Remove a user (admin only)
pub async fn delete_user(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    authorize(Some(&principal), Action::Delete, Scope::UserDirectory)?;

    if !db::users::delete(&ctx.db_pool, &username).await? {
        return Err(Error::NotFound(format!(
            "User '{}' does not exist",
            username
        )));
    }
    info!("Admin {} deleted user {}", principal.username, username);

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Own Profile Handlers
// ============================================================================

/// GET /api/v1/users/me - The caller's own profile
pub async fn get_me(CurrentUser(principal): CurrentUser) -> Json<User> {
    Json(principal)
}

/// PATCH /api/v1/users/me - Update own profile; the role field is frozen
pub async fn patch_me(
    State(ctx): State<AppContext>,
    CurrentUser(principal): CurrentUser,
    Json(req): Json<PatchUserRequest>,
) -> Result<Json<User>> {
    // A submitted role is dropped before validation: frozen, not an error
    let req = PatchUserRequest { role: None, ..req };
    req.validate()?;

    db::users::update(&ctx.db_pool, &principal.guid, &req.into_patch(false)).await?;

    let updated = db::users::get_by_guid(&ctx.db_pool, &principal.guid)
        .await?
        .ok_or_else(|| Error::Internal("User vanished during update".to_string()))?;

    Ok(Json(updated))
}
