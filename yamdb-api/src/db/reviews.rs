//! Review repository queries
//!
//! The one-review-per-(title, author) invariant is the store's UNIQUE
//! constraint: a racing duplicate insert fails there, not in a
//! read-then-write check.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use yamdb_common::db::models::Review;
use yamdb_common::error::{Error, Result};

type ReviewRow = (i64, String, String, String, i64, DateTime<Utc>);

fn row_to_review(row: ReviewRow) -> Review {
    Review {
        id: row.0,
        text: row.1,
        author_username: row.2,
        author_guid: row.3,
        score: row.4,
        pub_date: row.5,
    }
}

const REVIEW_SELECT: &str = "
    SELECT r.id, r.text, u.username, r.author, r.score, r.pub_date
    FROM reviews r JOIN users u ON u.guid = r.author";

/// List a title's reviews, newest first
pub async fn list(
    pool: &SqlitePool,
    title_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Review>)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = ?")
        .bind(title_id)
        .fetch_one(pool)
        .await?;

    let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
        "{} WHERE r.title_id = ? ORDER BY r.pub_date DESC, r.id DESC LIMIT ? OFFSET ?",
        REVIEW_SELECT
    ))
    .bind(title_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((count, rows.into_iter().map(row_to_review).collect()))
}

/// Fetch a review scoped to its parent title; a review id that exists
/// under a different title is NotFound here
pub async fn get(pool: &SqlitePool, title_id: i64, review_id: i64) -> Result<Option<Review>> {
    let row: Option<ReviewRow> = sqlx::query_as(&format!(
        "{} WHERE r.title_id = ? AND r.id = ?",
        REVIEW_SELECT
    ))
    .bind(title_id)
    .bind(review_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_review))
}

pub async fn create(
    pool: &SqlitePool,
    title_id: i64,
    author_guid: &str,
    text: &str,
    score: i64,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO reviews (title_id, author, text, score, pub_date)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(title_id)
    .bind(author_guid)
    .bind(text)
    .bind(score)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Conflict("You have already reviewed this title".to_string())
        } else {
            Error::Database(e)
        }
    })?;

    Ok(id)
}

/// Update text and/or score. Author, title and pub_date never change.
pub async fn update(
    pool: &SqlitePool,
    review_id: i64,
    text: Option<&str>,
    score: Option<i64>,
) -> Result<()> {
    sqlx::query(
        "UPDATE reviews SET
            text = COALESCE(?, text),
            score = COALESCE(?, score)
         WHERE id = ?",
    )
    .bind(text)
    .bind(score)
    .bind(review_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a review (its comments cascade); false when absent
pub async fn delete(pool: &SqlitePool, title_id: i64, review_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND title_id = ?")
        .bind(review_id)
        .bind(title_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
