//! Category and Genre repository queries
//!
//! Both entities are named slugged tags with an identical shape, so the
//! queries are shared and parameterized by kind.

use sqlx::SqlitePool;
use yamdb_common::db::models::Term;
use yamdb_common::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Genre,
}

impl TermKind {
    fn table(&self) -> &'static str {
        match self {
            TermKind::Category => "categories",
            TermKind::Genre => "genres",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TermKind::Category => "category",
            TermKind::Genre => "genre",
        }
    }
}

/// List terms ordered by name with optional substring search
pub async fn list(
    pool: &SqlitePool,
    kind: TermKind,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<Term>)> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%')",
        kind.table()
    ))
    .bind(search)
    .fetch_one(pool)
    .await?;

    let rows: Vec<(i64, String, String)> = sqlx::query_as(&format!(
        "SELECT id, name, slug FROM {}
         WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%')
         ORDER BY name LIMIT ?2 OFFSET ?3",
        kind.table()
    ))
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let terms = rows
        .into_iter()
        .map(|(id, name, slug)| Term { id, name, slug })
        .collect();
    Ok((count, terms))
}

/// Create a term; a duplicate slug is a Conflict from the store
pub async fn create(pool: &SqlitePool, kind: TermKind, name: &str, slug: &str) -> Result<Term> {
    let id: i64 = sqlx::query_scalar(&format!(
        "INSERT INTO {} (name, slug) VALUES (?, ?) RETURNING id",
        kind.table()
    ))
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Conflict(format!("A {} with this slug already exists", kind.label()))
        } else {
            Error::Database(e)
        }
    })?;

    Ok(Term {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
    })
}

pub async fn get_by_slug(pool: &SqlitePool, kind: TermKind, slug: &str) -> Result<Option<Term>> {
    let row: Option<(i64, String, String)> = sqlx::query_as(&format!(
        "SELECT id, name, slug FROM {} WHERE slug = ?",
        kind.table()
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, name, slug)| Term { id, name, slug }))
}

/// Delete by slug; false when no such term existed. Deleting a category
/// nullifies referencing titles, deleting a genre detaches it - both via
/// the store's FK actions.
pub async fn delete_by_slug(pool: &SqlitePool, kind: TermKind, slug: &str) -> Result<bool> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE slug = ?", kind.table()))
        .bind(slug)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
