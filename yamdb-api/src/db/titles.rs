//! Title repository queries
//!
//! The displayed rating is computed inside the read queries as the
//! average review score; nothing rating-shaped is ever written back.

use crate::db::taxonomy::{self, TermKind};
use sqlx::{Sqlite, SqlitePool, Transaction};
use yamdb_common::db::models::{Term, Title};
use yamdb_common::error::{Error, Result};
use yamdb_common::rating::round_rating;

/// Optional list filters, all combinable
#[derive(Debug, Default, Clone)]
pub struct TitleFilter {
    /// Category slug, exact
    pub category: Option<String>,
    /// Genre slug, exact
    pub genre: Option<String>,
    /// Name substring, case-insensitive
    pub name: Option<String>,
    /// Release year, exact
    pub year: Option<i64>,
}

type TitleRow = (i64, String, i64, Option<String>, Option<i64>, Option<f64>);

const FILTER_WHERE: &str = "
    (?1 IS NULL OR EXISTS (
        SELECT 1 FROM categories c WHERE c.id = t.category_id AND c.slug = ?1))
    AND (?2 IS NULL OR EXISTS (
        SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id
        WHERE tg.title_id = t.id AND g.slug = ?2))
    AND (?3 IS NULL OR t.name LIKE '%' || ?3 || '%')
    AND (?4 IS NULL OR t.year = ?4)";

pub async fn list(
    pool: &SqlitePool,
    filter: &TitleFilter,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Title>)> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM titles t WHERE {}",
        FILTER_WHERE
    ))
    .bind(&filter.category)
    .bind(&filter.genre)
    .bind(&filter.name)
    .bind(filter.year)
    .fetch_one(pool)
    .await?;

    let rows: Vec<TitleRow> = sqlx::query_as(&format!(
        "SELECT t.id, t.name, t.year, t.description, t.category_id,
                (SELECT AVG(score) FROM reviews r WHERE r.title_id = t.id) AS rating
         FROM titles t
         WHERE {}
         ORDER BY t.id LIMIT ?5 OFFSET ?6",
        FILTER_WHERE
    ))
    .bind(&filter.category)
    .bind(&filter.genre)
    .bind(&filter.name)
    .bind(filter.year)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let mut titles = Vec::with_capacity(rows.len());
    for row in rows {
        titles.push(assemble(pool, row).await?);
    }
    Ok((count, titles))
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Title>> {
    let row: Option<TitleRow> = sqlx::query_as(
        "SELECT t.id, t.name, t.year, t.description, t.category_id,
                (SELECT AVG(score) FROM reviews r WHERE r.title_id = t.id) AS rating
         FROM titles t WHERE t.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(assemble(pool, row).await?)),
        None => Ok(None),
    }
}

pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM titles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Attach category and genre objects to a bare row
async fn assemble(pool: &SqlitePool, row: TitleRow) -> Result<Title> {
    let (id, name, year, description, category_id, rating) = row;

    let category = match category_id {
        Some(cid) => {
            let found: Option<(i64, String, String)> =
                sqlx::query_as("SELECT id, name, slug FROM categories WHERE id = ?")
                    .bind(cid)
                    .fetch_optional(pool)
                    .await?;
            found.map(|(id, name, slug)| Term { id, name, slug })
        }
        None => None,
    };

    let genre_rows: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT g.id, g.name, g.slug FROM genres g
         JOIN title_genres tg ON tg.genre_id = g.id
         WHERE tg.title_id = ?
         ORDER BY g.name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Title {
        id,
        name,
        year,
        rating: round_rating(rating),
        description,
        genre: genre_rows
            .into_iter()
            .map(|(id, name, slug)| Term { id, name, slug })
            .collect(),
        category,
    })
}

/// Create a title with its genre set, atomically
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    year: i64,
    description: Option<&str>,
    category_id: Option<i64>,
    genre_ids: &[i64],
) -> Result<i64> {
    let mut tx: Transaction<'_, Sqlite> = pool.begin().await?;

    let title_id: i64 = sqlx::query_scalar(
        "INSERT INTO titles (name, year, description, category_id)
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(year)
    .bind(description)
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(title_id)
}

/// Partial update; a provided genre set replaces the existing links
#[derive(Debug, Default)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub genre_ids: Option<Vec<i64>>,
}

pub async fn update(pool: &SqlitePool, id: i64, patch: &TitlePatch) -> Result<()> {
    let mut tx: Transaction<'_, Sqlite> = pool.begin().await?;

    sqlx::query(
        "UPDATE titles SET
            name = COALESCE(?, name),
            year = COALESCE(?, year),
            description = COALESCE(?, description),
            category_id = COALESCE(?, category_id)
         WHERE id = ?",
    )
    .bind(&patch.name)
    .bind(patch.year)
    .bind(&patch.description)
    .bind(patch.category_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(genre_ids) = &patch.genre_ids {
        sqlx::query("DELETE FROM title_genres WHERE title_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for genre_id in genre_ids {
            sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
                .bind(id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Delete a title; its reviews and their comments go with it (store
/// cascade). False when no such title existed.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM titles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Resolve a category slug to its id; unknown slug is a field error
pub async fn resolve_category(pool: &SqlitePool, slug: &str) -> Result<i64> {
    match taxonomy::get_by_slug(pool, TermKind::Category, slug).await? {
        Some(term) => Ok(term.id),
        None => Err(Error::validation(
            "category",
            format!("Category with slug '{}' does not exist", slug),
        )),
    }
}

/// Resolve genre slugs to ids; any unknown slug is a field error
pub async fn resolve_genres(pool: &SqlitePool, slugs: &[String]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        match taxonomy::get_by_slug(pool, TermKind::Genre, slug).await? {
            Some(term) => ids.push(term.id),
            None => {
                return Err(Error::validation(
                    "genre",
                    format!("Genre with slug '{}' does not exist", slug),
                ))
            }
        }
    }
    Ok(ids)
}
