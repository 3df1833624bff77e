//! Bearer-token extractors
//!
//! Resolves the Authorization header to a principal before a handler
//! runs. Uses the custom extractor pattern rather than a middleware
//! layer so each route states whether it requires authentication.

use crate::api::server::AppContext;
use crate::db;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use yamdb_common::db::models::User;
use yamdb_common::error::Error;
use yamdb_common::token::decode_access_token;

/// Extractor for routes that require an authenticated principal.
/// Missing, malformed, expired or orphaned tokens reject with 401.
pub struct CurrentUser(pub User);

async fn user_from_parts(parts: &Parts, ctx: &AppContext) -> Result<Option<User>, Error> {
    let header = match parts.headers.get(axum::http::header::AUTHORIZATION) {
        Some(value) => value,
        None => return Ok(None),
    };

    let header = header
        .to_str()
        .map_err(|_| Error::Unauthorized("Malformed Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("Expected a bearer token".to_string()))?;

    let guid = decode_access_token(&ctx.signing_secret, token)?;

    let user = db::users::get_by_guid(&ctx.db_pool, &guid)
        .await?
        .ok_or_else(|| Error::Unauthorized("User for this token no longer exists".to_string()))?;

    Ok(Some(user))
}

#[async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        match user_from_parts(parts, ctx).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(Error::Unauthorized("Authentication required".to_string())),
        }
    }
}
