//! Identity and credential issuing endpoints
//!
//! Sign-up validates and registers (or re-recognizes) a user and sends a
//! confirmation code out-of-band; the token endpoint exchanges a verified
//! code for a bearer access token.

use crate::api::server::AppContext;
use crate::db;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use yamdb_common::db::models::{Role, User};
use yamdb_common::error::{Error, FieldErrors, Result};
use yamdb_common::mail::send_confirmation_code;
use yamdb_common::token::{generate_confirmation_code, issue_access_token};
use yamdb_common::validate::{check_email, check_username};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    username: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    username: String,
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    username: Option<String>,
    confirmation_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/signup - Register (or re-recognize) a user and issue
/// a confirmation code
///
/// Re-requesting with an exact existing (username, email) pair is
/// idempotent and re-issues a fresh code; a pair where only one side
/// matches an existing user is a conflict.
pub async fn signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<SignUpResponse>> {
    let mut errors = FieldErrors::new();
    match &req.username {
        Some(username) => {
            if let Err(message) = check_username(username) {
                errors.push("username", message);
            }
        }
        None => errors.push("username", "This field is required"),
    }
    match &req.email {
        Some(email) => {
            if let Err(message) = check_email(email) {
                errors.push("email", message);
            }
        }
        None => errors.push("email", "This field is required"),
    }
    errors.into_result()?;

    let username = req.username.unwrap_or_default();
    let email = req.email.unwrap_or_default();

    let by_username = db::users::get_by_username(&ctx.db_pool, &username).await?;
    let by_email = db::users::get_by_email(&ctx.db_pool, &email).await?;

    let user = match (by_username, by_email) {
        (Some(u), Some(e)) if u.guid == e.guid => u,
        (None, None) => {
            let user = User {
                guid: Uuid::new_v4().to_string(),
                username: username.clone(),
                email: email.clone(),
                first_name: None,
                last_name: None,
                bio: None,
                role: Role::User,
                is_staff: false,
                is_superuser: false,
            };
            // Racing duplicate sign-ups resolve at the store's UNIQUE
            // constraints; the loser sees the same Conflict as a
            // mismatched pair.
            db::users::insert(&ctx.db_pool, &user).await?;
            info!("Registered new user: {}", user.username);
            user
        }
        _ => {
            return Err(Error::Conflict(
                "A user with this username or email already exists".to_string(),
            ))
        }
    };

    // One live code per user: re-requesting overwrites the previous one
    let code = generate_confirmation_code();
    db::users::set_confirmation_code(&ctx.db_pool, &user.guid, &code).await?;

    // Fire-and-forget: delivery failure is logged inside, never returned
    send_confirmation_code(ctx.mailer.as_ref(), &user.username, &user.email, &code);

    Ok(Json(SignUpResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token - Exchange a confirmation code for a bearer token
///
/// Unknown username is NotFound; a wrong or already-consumed code is a
/// single InvalidCredentials outcome that does not say which side failed.
pub async fn exchange_token(
    State(ctx): State<AppContext>,
    Json(req): Json<TokenRequest>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let mut errors = FieldErrors::new();
    if req.username.as_deref().unwrap_or("").is_empty() {
        errors.push("username", "This field is required");
    }
    if req.confirmation_code.as_deref().unwrap_or("").is_empty() {
        errors.push("confirmation_code", "This field is required");
    }
    errors.into_result()?;

    let username = req.username.unwrap_or_default();
    let supplied = req.confirmation_code.unwrap_or_default();

    let user = db::users::get_by_username(&ctx.db_pool, &username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User '{}' does not exist", username)))?;

    let stored = db::users::get_confirmation_code(&ctx.db_pool, &user.guid).await?;
    match stored {
        Some(code) if code == supplied => {}
        _ => return Err(Error::InvalidCredentials),
    }

    // Single use: consume the code before handing out the token
    db::users::clear_confirmation_code(&ctx.db_pool, &user.guid).await?;

    let token = issue_access_token(&ctx.signing_secret, &user.guid, ctx.token_ttl_hours)?;
    info!("Issued access token for user: {}", user.username);

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}
