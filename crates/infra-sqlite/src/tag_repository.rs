// SQLite TagRepository Implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use tagsvc_core::domain::{NewTag, PageRequest, Tag, TagFilter, TagId, TagState};
use tagsvc_core::error::{AppError, Result};
use tagsvc_core::port::TagRepository;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    // UNIQUE constraint failed
                    "2067" | "1555" => AppError::Conflict(format!(
                        "Unique constraint violation: {}",
                        db_err.message()
                    )),
                    // CHECK constraint failed
                    "275" => AppError::Validation(format!(
                        "Check constraint violation: {}",
                        db_err.message()
                    )),
                    // SQLITE_BUSY - database is locked
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    // SQLITE_FULL - database or disk is full
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteTagRepository {
    pool: SqlitePool,
}

impl SqliteTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>> {
        let row = sqlx::query_as::<_, TagRow>("SELECT * FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TagRow::into_tag).transpose()
    }

    async fn list(&self, filter: &TagFilter, page: PageRequest) -> Result<Vec<Tag>> {
        let state = filter.state.map(|s| s.as_u32() as i64);
        let rows: Vec<TagRow> = sqlx::query_as(
            r#"
            SELECT * FROM tags
            WHERE (? IS NULL OR name = ?)
              AND (? IS NULL OR state = ?)
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&filter.name)
        .bind(&filter.name)
        .bind(state)
        .bind(state)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TagRow::into_tag).collect()
    }

    async fn count(&self, filter: &TagFilter) -> Result<i64> {
        let state = filter.state.map(|s| s.as_u32() as i64);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tags
            WHERE (? IS NULL OR name = ?)
              AND (? IS NULL OR state = ?)
            "#,
        )
        .bind(&filter.name)
        .bind(&filter.name)
        .bind(state)
        .bind(state)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn insert(&self, tag: &NewTag, now: i64) -> Result<Tag> {
        let result = sqlx::query(
            "INSERT INTO tags (name, state, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&tag.name)
        .bind(tag.state.as_u32() as i64)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict(format!("tag '{}' already exists", tag.name)),
            other => other,
        })?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: tag.name.clone(),
            state: tag.state,
            created_at: now,
            updated_at: now,
        })
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    state: i64,
    created_at: i64,
    updated_at: i64,
}

impl TagRow {
    fn into_tag(self) -> Result<Tag> {
        let state = u32::try_from(self.state)
            .ok()
            .and_then(|s| TagState::from_u32(s).ok())
            .ok_or_else(|| {
                AppError::Database(format!("tag {} has invalid state {}", self.id, self.state))
            })?;

        Ok(Tag {
            id: self.id,
            name: self.name,
            state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
