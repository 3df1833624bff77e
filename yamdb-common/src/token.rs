//! Access tokens and confirmation codes
//!
//! Bearer access tokens are HS256 JWTs carrying the user guid. The signing
//! secret lives in the `settings` table and is generated on first use.
//! Confirmation codes follow the persisted-code policy: a random numeric
//! code stored on the user row, overwritten on re-request and cleared once
//! exchanged, so exactly one code is live per user at a time.

use crate::error::{Error, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Confirmation code length in decimal digits
pub const CONFIRMATION_CODE_DIGITS: u32 = 6;

/// Default access token lifetime in hours
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

const SECRET_SETTING_KEY: &str = "token_signing_secret";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User guid
    sub: String,
    /// Expiry, seconds since the Unix epoch
    exp: i64,
}

/// Issue a signed bearer token for a user
pub fn issue_access_token(secret: &str, user_guid: &str, ttl_hours: i64) -> Result<String> {
    let claims = Claims {
        sub: user_guid.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

/// Decode a bearer token back to the user guid it was issued for.
/// Any failure (bad signature, garbage, expired) is Unauthorized; the
/// caller learns nothing about which check failed.
pub fn decode_access_token(secret: &str, token: &str) -> Result<String> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| Error::Unauthorized("Invalid or expired token".to_string()))?;
    Ok(data.claims.sub)
}

/// Generate a fixed-length random numeric confirmation code
pub fn generate_confirmation_code() -> String {
    let max = 10u32.pow(CONFIRMATION_CODE_DIGITS);
    let code = rand::thread_rng().gen_range(0..max);
    format!("{:0width$}", code, width = CONFIRMATION_CODE_DIGITS as usize)
}

/// Load the token signing secret from the settings table, generating and
/// persisting one on first call.
pub async fn load_signing_secret(db: &SqlitePool) -> Result<String> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SECRET_SETTING_KEY)
            .fetch_optional(db)
            .await?;

    if let Some((secret,)) = existing {
        return Ok(secret);
    }

    let secret = generate_signing_secret();
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SECRET_SETTING_KEY)
        .bind(&secret)
        .execute(db)
        .await?;

    Ok(secret)
}

/// 64 hex characters of randomness
fn generate_signing_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let secret = "test-secret";
        let token = issue_access_token(secret, "guid-123", 1).unwrap();
        let guid = decode_access_token(secret, &token).unwrap();
        assert_eq!(guid, "guid-123");
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_access_token("secret-a", "guid-123", 1).unwrap();
        assert!(matches!(
            decode_access_token("secret-b", &token),
            Err(Error::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(decode_access_token("secret", "not.a.token").is_err());
        assert!(decode_access_token("secret", "").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let token = issue_access_token("secret", "guid-123", -1).unwrap();
        assert!(decode_access_token("secret", &token).is_err());
    }

    #[test]
    fn confirmation_code_is_fixed_length_numeric() {
        for _ in 0..100 {
            let code = generate_confirmation_code();
            assert_eq!(code.len(), CONFIRMATION_CODE_DIGITS as usize);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn signing_secret_is_hex() {
        let secret = generate_signing_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
