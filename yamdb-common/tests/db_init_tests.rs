//! Integration tests for database initialization and store-level invariants
//!
//! The schema, not application code, carries the referential rules:
//! review uniqueness per (title, author), title -> review -> comment
//! cascade, category nullify and genre detach.

use sqlx::SqlitePool;
use std::path::PathBuf;
use yamdb_common::db::init::{init_database, init_memory_database};
use yamdb_common::error::Error;

async fn seed_user(pool: &SqlitePool, guid: &str) {
    sqlx::query("INSERT INTO users (guid, username, email) VALUES (?, ?, ?)")
        .bind(guid)
        .bind(format!("user-{}", guid))
        .bind(format!("{}@example.com", guid))
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_title(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO titles (name, year) VALUES (?, 2000) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_review(pool: &SqlitePool, title_id: i64, author: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO reviews (title_id, author, text, score, pub_date)
         VALUES (?, ?, 'text', 5, datetime('now')) RETURNING id",
    )
    .bind(title_id)
    .bind(author)
    .fetch_one(pool)
    .await
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let test_db = format!("/tmp/yamdb-test-db-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    // Ensure database doesn't exist
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    // Cleanup
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let test_db = format!("/tmp/yamdb-test-db-existing-{}.db", std::process::id());
    let db_path = PathBuf::from(&test_db);

    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Opening a second time must succeed (schema creation is idempotent)
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_review_uniqueness_enforced_by_store() {
    let pool = init_memory_database().await.unwrap();
    seed_user(&pool, "u1").await;
    let title_id = seed_title(&pool, "Dune").await;

    seed_review(&pool, title_id, "u1").await.unwrap();

    // Second review from same author on same title loses, whatever the text
    let second = seed_review(&pool, title_id, "u1").await;
    let err = second.unwrap_err();
    assert!(Error::is_unique_violation(&err), "expected unique violation, got {:?}", err);

    // Same author on a different title is fine
    let other_title = seed_title(&pool, "Solaris").await;
    seed_review(&pool, other_title, "u1").await.unwrap();
}

#[tokio::test]
async fn test_title_delete_cascades_to_reviews_and_comments() {
    let pool = init_memory_database().await.unwrap();
    seed_user(&pool, "u1").await;
    let title_id = seed_title(&pool, "Dune").await;
    let review_id = seed_review(&pool, title_id, "u1").await.unwrap();

    sqlx::query(
        "INSERT INTO comments (review_id, author, text, pub_date)
         VALUES (?, 'u1', 'agree', datetime('now'))",
    )
    .bind(review_id)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM titles WHERE id = ?")
        .bind(title_id)
        .execute(&pool)
        .await
        .unwrap();

    let reviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reviews, 0);
    assert_eq!(comments, 0);
}

#[tokio::test]
async fn test_category_delete_nullifies_title_reference() {
    let pool = init_memory_database().await.unwrap();

    let category_id: i64 =
        sqlx::query_scalar("INSERT INTO categories (name, slug) VALUES ('Books', 'books') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    let title_id: i64 = sqlx::query_scalar(
        "INSERT INTO titles (name, year, category_id) VALUES ('Dune', 1965, ?) RETURNING id",
    )
    .bind(category_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(category_id)
        .execute(&pool)
        .await
        .unwrap();

    // Title survives with its category cleared
    let remaining: Option<i64> =
        sqlx::query_scalar("SELECT category_id FROM titles WHERE id = ?")
            .bind(title_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, None);
}

#[tokio::test]
async fn test_genre_delete_detaches_from_titles() {
    let pool = init_memory_database().await.unwrap();

    let genre_id: i64 =
        sqlx::query_scalar("INSERT INTO genres (name, slug) VALUES ('Sci-Fi', 'sci-fi') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
    let title_id = seed_title(&pool, "Dune").await;

    sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
        .bind(title_id)
        .bind(genre_id)
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(genre_id)
        .execute(&pool)
        .await
        .unwrap();

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM title_genres")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);

    // The title itself is untouched
    let titles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM titles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(titles, 1);
}

#[tokio::test]
async fn test_duplicate_slug_rejected_by_store() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query("INSERT INTO categories (name, slug) VALUES ('Books', 'books')")
        .execute(&pool)
        .await
        .unwrap();

    let dup = sqlx::query("INSERT INTO categories (name, slug) VALUES ('Tomes', 'books')")
        .execute(&pool)
        .await;
    assert!(Error::is_unique_violation(&dup.unwrap_err()));
}
