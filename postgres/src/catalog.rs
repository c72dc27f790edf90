//! Catalog storage: categories, genres and titles.

use crate::db_err;
use critique_core::ids::{CategoryId, GenreId, TitleId};
use critique_core::model::{Category, Genre, SlugRef, Title};
use critique_core::repo::{CatalogRepository, NewSlugEntry, NewTitle, Page, TitleFilter, TitlePatch};
use critique_core::{DomainError, Result};
use sqlx::PgPool;
use std::collections::HashMap;

#[derive(sqlx::FromRow)]
struct SlugRow {
    id: i64,
    name: String,
    slug: String,
}

impl SlugRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId(self.id),
            slug_ref: SlugRef {
                name: self.name,
                slug: self.slug,
            },
        }
    }

    fn into_genre(self) -> Genre {
        Genre {
            id: GenreId(self.id),
            slug_ref: SlugRef {
                name: self.name,
                slug: self.slug,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    description: Option<String>,
    rating: Option<f64>,
    category_id: Option<i64>,
    category_name: Option<String>,
    category_slug: Option<String>,
}

impl TitleRow {
    fn into_title(self, genres: Vec<Genre>) -> Title {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category {
                id: CategoryId(id),
                slug_ref: SlugRef { name, slug },
            }),
            _ => None,
        };
        Title {
            id: TitleId(self.id),
            name: self.name,
            year: self.year,
            description: self.description,
            category,
            genres,
            rating: self.rating,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TitleGenreRow {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

const TITLE_SELECT: &str = r"
    SELECT t.id, t.name, t.year, t.description, t.rating,
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
";

/// PostgreSQL catalog repository.
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load genre tags for a set of titles in one query.
    async fn genres_for(&self, title_ids: &[i64]) -> Result<HashMap<i64, Vec<Genre>>> {
        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name
            ",
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to load genres: {e}")))?;

        let mut by_title: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            by_title.entry(row.title_id).or_default().push(Genre {
                id: GenreId(row.id),
                slug_ref: SlugRef {
                    name: row.name,
                    slug: row.slug,
                },
            });
        }
        Ok(by_title)
    }
}

/// Resolve a category slug to its id inside a transaction.
async fn category_id_by_slug(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    slug: &str,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to resolve category: {e}")))?
        .ok_or_else(|| {
            DomainError::validation("category", format!("unknown category slug {slug}"))
        })
}

/// Replace a title's genre tags inside a transaction.
async fn set_title_genres(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    title_id: i64,
    genres: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
        .bind(title_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to clear genres: {e}")))?;

    for slug in genres {
        let genre_id = sqlx::query_scalar::<_, i64>("SELECT id FROM genres WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| DomainError::Database(format!("failed to resolve genre: {e}")))?
            .ok_or_else(|| {
                DomainError::validation("genre", format!("unknown genre slug {slug}"))
            })?;
        sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES ($1, $2)")
            .bind(title_id)
            .bind(genre_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::Database(format!("failed to tag genre: {e}")))?;
    }
    Ok(())
}

impl CatalogRepository for PgCatalogRepository {
    async fn list_categories(&self, search: Option<&str>, page: Page) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, SlugRow>(
            r"
            SELECT id, name, slug FROM categories
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(search)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to list categories: {e}")))?;
        Ok(rows.into_iter().map(SlugRow::into_category).collect())
    }

    async fn create_category(&self, entry: &NewSlugEntry) -> Result<Category> {
        let row = sqlx::query_as::<_, SlugRow>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(&entry.name)
        .bind(&entry.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err(
            "failed to create category",
            "category name or slug already exists",
        ))?;
        Ok(row.into_category())
    }

    async fn get_category(&self, slug: &str) -> Result<Category> {
        sqlx::query_as::<_, SlugRow>("SELECT id, name, slug FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to get category: {e}")))?
            .map(SlugRow::into_category)
            .ok_or(DomainError::not_found("category"))
    }

    async fn delete_category(&self, slug: &str) -> Result<()> {
        // ON DELETE SET NULL keeps the titles, uncategorized.
        let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete category: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("category"));
        }
        Ok(())
    }

    async fn list_genres(&self, search: Option<&str>, page: Page) -> Result<Vec<Genre>> {
        let rows = sqlx::query_as::<_, SlugRow>(
            r"
            SELECT id, name, slug FROM genres
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(search)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Database(format!("failed to list genres: {e}")))?;
        Ok(rows.into_iter().map(SlugRow::into_genre).collect())
    }

    async fn create_genre(&self, entry: &NewSlugEntry) -> Result<Genre> {
        let row = sqlx::query_as::<_, SlugRow>(
            "INSERT INTO genres (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(&entry.name)
        .bind(&entry.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err(
            "failed to create genre",
            "genre name or slug already exists",
        ))?;
        Ok(row.into_genre())
    }

    async fn get_genre(&self, slug: &str) -> Result<Genre> {
        sqlx::query_as::<_, SlugRow>("SELECT id, name, slug FROM genres WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to get genre: {e}")))?
            .map(SlugRow::into_genre)
            .ok_or(DomainError::not_found("genre"))
    }

    async fn delete_genre(&self, slug: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete genre: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("genre"));
        }
        Ok(())
    }

    async fn create_title(&self, new: &NewTitle) -> Result<Title> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        let category_id = match &new.category {
            Some(slug) => Some(category_id_by_slug(&mut tx, slug).await?),
            None => None,
        };

        let title_id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&new.name)
        .bind(new.year)
        .bind(&new.description)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to create title: {e}")))?;

        set_title_genres(&mut tx, title_id, &new.genres).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))?;

        self.get_title(TitleId(title_id)).await
    }

    async fn get_title(&self, id: TitleId) -> Result<Title> {
        let sql = format!("{TITLE_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to get title: {e}")))?
            .ok_or(DomainError::not_found("title"))?;

        let mut genres = self.genres_for(&[row.id]).await?;
        let tags = genres.remove(&row.id).unwrap_or_default();
        Ok(row.into_title(tags))
    }

    async fn list_titles(&self, filter: &TitleFilter, page: Page) -> Result<Vec<Title>> {
        let sql = format!(
            r"
            {TITLE_SELECT}
            WHERE ($1::text IS NULL OR c.slug = $1)
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM title_genres tg
                    JOIN genres g ON g.id = tg.genre_id
                    WHERE tg.title_id = t.id AND g.slug = $2))
              AND ($3::integer IS NULL OR t.year = $3)
              AND ($4::text IS NULL OR t.name ILIKE '%' || $4 || '%')
            ORDER BY t.id
            LIMIT $5 OFFSET $6
            "
        );
        let rows = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(filter.year)
            .bind(&filter.name)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to list titles: {e}")))?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut genres = self.genres_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let tags = genres.remove(&row.id).unwrap_or_default();
                row.into_title(tags)
            })
            .collect())
    }

    async fn update_title(&self, id: TitleId, patch: &TitlePatch) -> Result<Title> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Database(format!("failed to begin transaction: {e}")))?;

        let category_id = match &patch.category {
            Some(slug) => Some(category_id_by_slug(&mut tx, slug).await?),
            None => None,
        };

        let result = sqlx::query(
            r"
            UPDATE titles
            SET name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = COALESCE($5, category_id)
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(&patch.name)
        .bind(patch.year)
        .bind(&patch.description)
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::Database(format!("failed to update title: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("title"));
        }

        if let Some(genres) = &patch.genres {
            set_title_genres(&mut tx, id.0, genres).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Database(format!("failed to commit: {e}")))?;

        self.get_title(id).await
    }

    async fn delete_title(&self, id: TitleId) -> Result<()> {
        // Reviews and their comments go with the title via FK cascade.
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("failed to delete title: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("title"));
        }
        Ok(())
    }
}
