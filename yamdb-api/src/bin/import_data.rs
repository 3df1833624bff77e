//! yamdb-import - Bulk-load seed data from CSV files
//!
//! Reads the delimited export files (category.csv, genre.csv, users.csv,
//! titles.csv, genre_title.csv, review.csv, comments.csv) from a data
//! folder and inserts the rows directly. CSV `author` columns are user
//! references and `category` columns are category references; users get
//! freshly minted guids while the other entities keep their CSV ids.
//! Seeding tool only - it bypasses the HTTP layer, not the schema
//! constraints.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use yamdb_common::db::init::init_database;

#[derive(Parser, Debug)]
#[command(name = "yamdb-import")]
#[command(about = "Bulk-load YaMDb seed data from CSV files")]
#[command(version)]
struct Args {
    /// Folder containing the .csv files
    #[arg(short, long)]
    csv_dir: PathBuf,

    /// Path to the SQLite database
    #[arg(short, long, env = "YAMDB_DATABASE")]
    database: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TermRecord {
    id: i64,
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: i64,
    username: String,
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
    id: i64,
    name: String,
    year: i64,
    #[serde(default)]
    category: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GenreTitleRecord {
    #[allow(dead_code)]
    id: i64,
    title_id: i64,
    genre_id: i64,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    id: i64,
    title_id: i64,
    text: String,
    author: i64,
    score: i64,
    pub_date: String,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    id: i64,
    review_id: i64,
    text: String,
    author: i64,
    pub_date: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "import_data=info,yamdb_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let pool = init_database(&args.database)
        .await
        .context("Failed to open database")?;

    import_terms(&pool, &args.csv_dir.join("category.csv"), "categories").await?;
    import_terms(&pool, &args.csv_dir.join("genre.csv"), "genres").await?;
    let user_guids = import_users(&pool, &args.csv_dir.join("users.csv")).await?;
    import_titles(&pool, &args.csv_dir.join("titles.csv")).await?;
    import_genre_links(&pool, &args.csv_dir.join("genre_title.csv")).await?;
    import_reviews(&pool, &args.csv_dir.join("review.csv"), &user_guids).await?;
    import_comments(&pool, &args.csv_dir.join("comments.csv"), &user_guids).await?;

    info!("Import complete");
    Ok(())
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Bad pub_date: {}", raw))
}

async fn import_terms(pool: &SqlitePool, path: &Path, table: &str) -> Result<()> {
    let mut count = 0usize;
    for record in open_reader(path)?.deserialize() {
        let record: TermRecord = record?;
        sqlx::query(&format!(
            "INSERT INTO {} (id, name, slug) VALUES (?, ?, ?)",
            table
        ))
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.slug)
        .execute(pool)
        .await?;
        count += 1;
    }
    info!("Loaded {} rows into {}", count, table);
    Ok(())
}

async fn import_users(pool: &SqlitePool, path: &Path) -> Result<HashMap<i64, String>> {
    let mut guids = HashMap::new();
    for record in open_reader(path)?.deserialize() {
        let record: UserRecord = record?;
        let guid = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO users (guid, username, email, first_name, last_name, bio, role)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&guid)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.bio)
        .bind(record.role.as_deref().unwrap_or("user"))
        .execute(pool)
        .await?;
        guids.insert(record.id, guid);
    }
    info!("Loaded {} rows into users", guids.len());
    Ok(guids)
}

async fn import_titles(pool: &SqlitePool, path: &Path) -> Result<()> {
    let mut count = 0usize;
    for record in open_reader(path)?.deserialize() {
        let record: TitleRecord = record?;
        sqlx::query("INSERT INTO titles (id, name, year, category_id) VALUES (?, ?, ?, ?)")
            .bind(record.id)
            .bind(&record.name)
            .bind(record.year)
            .bind(record.category)
            .execute(pool)
            .await?;
        count += 1;
    }
    info!("Loaded {} rows into titles", count);
    Ok(())
}

async fn import_genre_links(pool: &SqlitePool, path: &Path) -> Result<()> {
    let mut count = 0usize;
    for record in open_reader(path)?.deserialize() {
        let record: GenreTitleRecord = record?;
        sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
            .bind(record.title_id)
            .bind(record.genre_id)
            .execute(pool)
            .await?;
        count += 1;
    }
    info!("Loaded {} rows into title_genres", count);
    Ok(())
}

async fn import_reviews(
    pool: &SqlitePool,
    path: &Path,
    user_guids: &HashMap<i64, String>,
) -> Result<()> {
    let mut count = 0usize;
    for record in open_reader(path)?.deserialize() {
        let record: ReviewRecord = record?;
        let Some(author) = user_guids.get(&record.author) else {
            bail!("review {} references unknown user {}", record.id, record.author);
        };
        sqlx::query(
            "INSERT INTO reviews (id, title_id, author, text, score, pub_date)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.title_id)
        .bind(author)
        .bind(&record.text)
        .bind(record.score)
        .bind(parse_pub_date(&record.pub_date)?)
        .execute(pool)
        .await?;
        count += 1;
    }
    info!("Loaded {} rows into reviews", count);
    Ok(())
}

async fn import_comments(
    pool: &SqlitePool,
    path: &Path,
    user_guids: &HashMap<i64, String>,
) -> Result<()> {
    let mut count = 0usize;
    for record in open_reader(path)?.deserialize() {
        let record: CommentRecord = record?;
        let Some(author) = user_guids.get(&record.author) else {
            bail!("comment {} references unknown user {}", record.id, record.author);
        };
        sqlx::query(
            "INSERT INTO comments (id, review_id, author, text, pub_date)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(record.review_id)
        .bind(author)
        .bind(&record.text)
        .bind(parse_pub_date(&record.pub_date)?)
        .execute(pool)
        .await?;
        count += 1;
    }
    info!("Loaded {} rows into comments", count);
    Ok(())
}
