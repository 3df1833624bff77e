//! Comment repository queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use yamdb_common::db::models::Comment;
use yamdb_common::error::Result;

type CommentRow = (i64, String, String, String, DateTime<Utc>);

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.0,
        text: row.1,
        author_username: row.2,
        author_guid: row.3,
        pub_date: row.4,
    }
}

const COMMENT_SELECT: &str = "
    SELECT c.id, c.text, u.username, c.author, c.pub_date
    FROM comments c JOIN users u ON u.guid = c.author";

/// List a review's comments, newest first
pub async fn list(
    pool: &SqlitePool,
    review_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Comment>)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?")
        .bind(review_id)
        .fetch_one(pool)
        .await?;

    let rows: Vec<CommentRow> = sqlx::query_as(&format!(
        "{} WHERE c.review_id = ? ORDER BY c.pub_date DESC, c.id DESC LIMIT ? OFFSET ?",
        COMMENT_SELECT
    ))
    .bind(review_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((count, rows.into_iter().map(row_to_comment).collect()))
}

/// Fetch a comment scoped to its parent review
pub async fn get(pool: &SqlitePool, review_id: i64, comment_id: i64) -> Result<Option<Comment>> {
    let row: Option<CommentRow> = sqlx::query_as(&format!(
        "{} WHERE c.review_id = ? AND c.id = ?",
        COMMENT_SELECT
    ))
    .bind(review_id)
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_comment))
}

/// No uniqueness here: a user may comment on a review any number of times
pub async fn create(
    pool: &SqlitePool,
    review_id: i64,
    author_guid: &str,
    text: &str,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (review_id, author, text, pub_date)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(review_id)
    .bind(author_guid)
    .bind(text)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Update the text. Author, review and pub_date never change.
pub async fn update(pool: &SqlitePool, comment_id: i64, text: &str) -> Result<()> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a comment; false when absent
pub async fn delete(pool: &SqlitePool, review_id: i64, comment_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ? AND review_id = ?")
        .bind(comment_id)
        .bind(review_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
